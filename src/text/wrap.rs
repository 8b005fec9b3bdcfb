//! Text wrapping: character-break and word-break modes.
//!
//! Word-break segments on Unicode word boundaries (UAX #29), which cover
//! the break-candidate set (space, tab, common punctuation, the listed
//! Unicode space/joiner characters) for the vast majority of text. A
//! segment that would overflow the line is pushed as-is — including any
//! trailing whitespace already accumulated — so the break lands exactly at
//! the boundary the next word would have crossed.

use unicode_segmentation::UnicodeSegmentation;

use super::width::{grapheme_width, WidthMethod};

/// How a [`TextView`](crate::text::TextView) wraps its logical lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WrapMode {
    #[default]
    None,
    Char,
    Word,
}

pub const DEFAULT_TAB_WIDTH: usize = 4;

/// Width of a grapheme at `current_col`, expanding a literal tab to the
/// next multiple of `tab_width`.
fn column_width(method: WidthMethod, grapheme: &str, current_col: usize, tab_width: usize) -> usize {
    if grapheme == "\t" {
        let tab_width = tab_width.max(1);
        let rem = current_col % tab_width;
        return tab_width - rem;
    }
    grapheme_width(method, grapheme)
}

fn is_whitespace(s: &str) -> bool {
    s.chars().all(|c| c.is_whitespace())
}

/// One wrapped line together with the `[start, end)` char range (relative
/// to the start of the logical line) it was produced from. Word-wrap may
/// drop a boundary whitespace segment, in which case the gap between two
/// consecutive spans' `end`/`start` covers the dropped characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WrappedSpan {
    pub text: String,
    pub char_start: usize,
    pub char_end: usize,
}

/// Wrap a single logical line (no embedded `\n`) by grapheme boundary,
/// tracking char offsets relative to the line's start.
pub fn wrap_line_char(method: WidthMethod, line: &str, max_width: usize, tab_width: usize) -> Vec<WrappedSpan> {
    if line.is_empty() {
        return vec![WrappedSpan { text: String::new(), char_start: 0, char_end: 0 }];
    }
    if max_width == 0 {
        return vec![WrappedSpan { text: line.to_string(), char_start: 0, char_end: line.chars().count() }];
    }

    let mut spans = Vec::new();
    let mut current = String::new();
    let mut current_width = 0usize;
    let mut current_start = 0usize;
    let mut char_idx = 0usize;

    for grapheme in line.graphemes(true) {
        let gw = column_width(method, grapheme, current_width, tab_width);
        if current_width + gw > max_width && !current.is_empty() {
            spans.push(WrappedSpan {
                text: std::mem::take(&mut current),
                char_start: current_start,
                char_end: char_idx,
            });
            current_width = 0;
            current_start = char_idx;
        }
        current.push_str(grapheme);
        current_width += gw;
        char_idx += grapheme.chars().count();
    }

    spans.push(WrappedSpan { text: current, char_start: current_start, char_end: char_idx });
    spans
}

/// Wrap a single logical line by word boundary, tracking char offsets
/// relative to the line's start. Falls back to char-break for a single
/// word wider than `max_width`.
pub fn wrap_line_word(method: WidthMethod, line: &str, max_width: usize, tab_width: usize) -> Vec<WrappedSpan> {
    if line.is_empty() {
        return vec![WrappedSpan { text: String::new(), char_start: 0, char_end: 0 }];
    }
    if max_width == 0 {
        return vec![WrappedSpan { text: line.to_string(), char_start: 0, char_end: line.chars().count() }];
    }

    let mut spans = Vec::new();
    let mut current = String::new();
    let mut current_width = 0usize;
    let mut current_start = 0usize;
    let mut char_idx = 0usize;

    for segment in line.split_word_bounds() {
        let seg_chars = segment.chars().count();
        let seg_width = segment_width(method, segment, current_width, tab_width);

        if current_width + seg_width > max_width {
            if current_width > 0 {
                spans.push(WrappedSpan {
                    text: std::mem::take(&mut current),
                    char_start: current_start,
                    char_end: char_idx,
                });
                current_width = 0;
                current_start = char_idx;
            }

            if seg_width > max_width {
                for grapheme in segment.graphemes(true) {
                    let gw = column_width(method, grapheme, current_width, tab_width);
                    if current_width + gw > max_width && !current.is_empty() {
                        spans.push(WrappedSpan {
                            text: std::mem::take(&mut current),
                            char_start: current_start,
                            char_end: char_idx,
                        });
                        current_width = 0;
                        current_start = char_idx;
                    }
                    current.push_str(grapheme);
                    current_width += gw;
                    char_idx += grapheme.chars().count();
                }
                continue;
            }

            if is_whitespace(segment) {
                char_idx += seg_chars; // dropped: absorbed into the gap before the next span
                current_start = char_idx;
                continue;
            }
        }

        current.push_str(segment);
        current_width += seg_width;
        char_idx += seg_chars;
    }

    spans.push(WrappedSpan { text: current, char_start: current_start, char_end: char_idx });
    spans
}

fn segment_width(method: WidthMethod, segment: &str, start_col: usize, tab_width: usize) -> usize {
    let mut col = start_col;
    let mut total = 0usize;
    for g in segment.graphemes(true) {
        let w = column_width(method, g, col, tab_width);
        total += w;
        col += w;
    }
    total
}

/// Wrap by breaking at any grapheme boundary. Each explicit `\n` starts a
/// new line. Returns an empty `Vec` for empty input.
pub fn wrap_text(method: WidthMethod, text: &str, max_width: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![];
    }
    text.split('\n')
        .flat_map(|line| wrap_line_char(method, line, max_width, DEFAULT_TAB_WIDTH))
        .map(|span| span.text)
        .collect()
}

/// Wrap by breaking at word boundaries. Falls back to char-break for a
/// single word wider than `max_width`. Returns an empty `Vec` for empty
/// input.
pub fn wrap_text_word(method: WidthMethod, text: &str, max_width: usize) -> Vec<String> {
    if text.is_empty() {
        return vec![];
    }
    text.split('\n')
        .flat_map(|line| wrap_line_word(method, line, max_width, DEFAULT_TAB_WIDTH))
        .map(|span| span.text)
        .collect()
}

/// Count virtual lines `text` would occupy at `max_width`, without
/// allocating the wrapped content. Uses char-break rules, matching
/// [`wrap_text`].
pub fn measure_text_height(method: WidthMethod, text: &str, max_width: usize) -> usize {
    if text.is_empty() {
        return 0;
    }
    text.split('\n')
        .map(|line| wrap_line_char(method, line, max_width, DEFAULT_TAB_WIDTH).len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn char_wrap_breaks_mid_word() {
        assert_eq!(wrap_text(WidthMethod::Unicode, "abcdef", 4), vec!["abcd", "ef"]);
    }

    #[test]
    fn char_wrap_cjk() {
        assert_eq!(wrap_text(WidthMethod::Unicode, "你好世界", 5), vec!["你好", "世界"]);
    }

    #[test]
    fn char_wrap_never_splits_combining_mark() {
        // S4: "é" (e + combining acute) + "xy", width 1, char mode.
        let lines = wrap_text(WidthMethod::Unicode, "e\u{0301}xy", 1);
        assert_eq!(lines, vec!["e\u{0301}", "x", "y"]);
    }

    #[test]
    fn word_wrap_keeps_trailing_space_at_break() {
        // S3: width 7 -> ["hello ", "world"] (trailing space kept).
        let lines = wrap_text_word(WidthMethod::Unicode, "hello world", 7);
        assert_eq!(lines, vec!["hello ", "world"]);
    }

    #[test]
    fn word_wrap_tighter_width_drops_the_space() {
        // S3: width 5 -> ["hello", "world"].
        let lines = wrap_text_word(WidthMethod::Unicode, "hello world", 5);
        assert_eq!(lines, vec!["hello", "world"]);
    }

    #[test]
    fn word_wrap_long_word_force_breaks() {
        let lines = wrap_text_word(WidthMethod::Unicode, "abcdefghij", 5);
        assert_eq!(lines, vec!["abcde", "fghij"]);
    }

    #[test]
    fn measure_height_matches_char_wrap() {
        assert_eq!(measure_text_height(WidthMethod::Unicode, "abcdef", 4), 2);
        assert_eq!(measure_text_height(WidthMethod::Unicode, "a\nb\nc", 10), 3);
    }

    #[test]
    fn no_wrap_width_is_identity() {
        let lines = wrap_text(WidthMethod::Unicode, "hello", 0);
        assert_eq!(lines, vec!["hello"]);
    }

    #[test]
    fn tab_expands_to_next_stop() {
        // "a\tb" with tab_width 4: 'a' at col0 (w1), tab at col1 expands to col4 (w3), 'b' at col4.
        let spans = wrap_line_char(WidthMethod::Unicode, "a\tb", 80, 4);
        assert_eq!(spans[0].text, "a\tb");
    }

    #[test]
    fn word_wrap_spans_cover_dropped_whitespace() {
        let spans = wrap_line_word(WidthMethod::Unicode, "hello world", 5);
        assert_eq!(spans[0].char_start, 0);
        assert_eq!(spans[0].char_end, 5); // "hello"
        assert_eq!(spans[1].char_start, 6); // "world", space at index 5 dropped
        assert_eq!(spans[1].char_end, 11);
    }
}
