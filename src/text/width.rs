//! Display-width measurement for characters, grapheme clusters and strings.
//!
//! The buffer's width method is fixed at construction (see [`WidthMethod`]):
//! `Wcwidth` consults only the legacy per-codepoint East Asian Width table;
//! `Unicode` additionally widens known emoji ranges and multi-codepoint
//! emoji sequences (ZWJ joins, VS16, skin tones, flags, keycaps) to width 2.
//! Both methods segment text into the same grapheme clusters — only the
//! resulting numeric width can differ.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthChar;

use super::ansi_strip::strip_ansi;

/// Which table decides a grapheme's display width.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WidthMethod {
    /// Legacy `wcwidth`-style lookup: one width per leading codepoint.
    Wcwidth,
    /// Full Unicode-aware measurement, including emoji sequence widening.
    #[default]
    Unicode,
}

/// Display width of a single codepoint, ignoring sequence context.
#[inline]
pub fn char_width(method: WidthMethod, c: char) -> usize {
    match method {
        WidthMethod::Wcwidth => c.width().unwrap_or(0),
        WidthMethod::Unicode => match c as u32 {
            0x2600..=0x27BF => 2,
            0x1F300..=0x1F5FF => 2,
            0x1F600..=0x1F64F => 2,
            0x1F680..=0x1F6FF => 2,
            0x1F900..=0x1F9FF => 2,
            0x1FA70..=0x1FAFF => 2,
            _ => c.width().unwrap_or(0),
        },
    }
}

/// Display width of a grapheme cluster in terminal cells.
///
/// Handles multi-codepoint clusters: `é` (e + combining acute) → 1,
/// `👨‍👩‍👧‍👦` (ZWJ family) → 2, `🇺🇸` (regional indicator pair) → 2,
/// `👍🏽` (emoji + skin tone) → 2.
pub fn grapheme_width(method: WidthMethod, grapheme: &str) -> usize {
    let mut chars = grapheme.chars();
    let first = match chars.next() {
        Some(c) => c,
        None => return 0,
    };

    if grapheme.len() == first.len_utf8() {
        return char_width(method, first);
    }

    if method == WidthMethod::Unicode {
        let first_cp = first as u32;
        if (0x1F1E6..=0x1F1FF).contains(&first_cp) {
            return 2; // regional indicator pair (flag)
        }
        for c in grapheme.chars().skip(1) {
            match c as u32 {
                0x200D => return 2,            // ZWJ sequence
                0xFE0F => return 2,            // VS16 emoji presentation
                0x1F3FB..=0x1F3FF => return 2, // Fitzpatrick skin tone
                0x20E3 => return 2,            // combining enclosing keycap
                _ => {}
            }
        }
    }

    // Base character + combining marks: base width only.
    first.width().unwrap_or(0)
}

/// Display width of a string, after stripping ANSI escape sequences.
pub fn string_width(method: WidthMethod, s: &str) -> usize {
    if s.is_empty() {
        return 0;
    }

    if s.is_ascii() && !s.as_bytes().contains(&0x1B) {
        return s.bytes().filter(|&b| b >= 0x20).count();
    }

    let stripped = strip_ansi(s);
    stripped.graphemes(true).map(|g| grapheme_width(method, g)).sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_width_cjk() {
        assert_eq!(char_width(WidthMethod::Unicode, '你'), 2);
        assert_eq!(char_width(WidthMethod::Wcwidth, '你'), 2);
    }

    #[test]
    fn char_width_combining_is_zero() {
        assert_eq!(char_width(WidthMethod::Unicode, '\u{0301}'), 0);
    }

    #[test]
    fn grapheme_combining_marks() {
        assert_eq!(grapheme_width(WidthMethod::Unicode, "e\u{0301}"), 1);
    }

    #[test]
    fn grapheme_zwj_family_is_two_in_unicode_mode() {
        assert_eq!(
            grapheme_width(WidthMethod::Unicode, "👨\u{200D}👩\u{200D}👧\u{200D}👦"),
            2
        );
    }

    #[test]
    fn grapheme_flag() {
        assert_eq!(grapheme_width(WidthMethod::Unicode, "🇺🇸"), 2);
    }

    #[test]
    fn grapheme_keycap_sequence() {
        assert_eq!(grapheme_width(WidthMethod::Unicode, "1\u{FE0F}\u{20E3}"), 2);
    }

    #[test]
    fn string_width_mixed() {
        assert_eq!(string_width(WidthMethod::Unicode, "hi你好😀"), 8);
    }

    #[test]
    fn string_width_ansi_stripped() {
        assert_eq!(string_width(WidthMethod::Unicode, "\x1b[31mred\x1b[0m"), 3);
    }

    #[test]
    fn both_methods_agree_on_grapheme_boundaries() {
        // Neither method should split the combining-mark grapheme; only the
        // *numeric width* of plain emoji may legitimately differ.
        let s = "cafe\u{0301}";
        let unicode_graphemes: Vec<&str> = s.graphemes(true).collect();
        assert_eq!(unicode_graphemes.len(), 4);
    }
}
