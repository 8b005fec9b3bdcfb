//! Grapheme-safe text truncation with a configurable suffix.

use unicode_segmentation::UnicodeSegmentation;

use super::width::{grapheme_width, string_width, WidthMethod};

/// Truncate `text` to fit within `max_width` cells, appending `suffix` when
/// truncation actually occurs. Never breaks inside a grapheme cluster.
pub fn truncate_text(method: WidthMethod, text: &str, max_width: usize, suffix: &str) -> String {
    if max_width == 0 {
        return String::new();
    }

    if string_width(method, text) <= max_width {
        return text.to_string();
    }

    let suffix_width = string_width(method, suffix);
    if suffix_width >= max_width {
        return truncate_exact(method, suffix, max_width);
    }

    let target_width = max_width - suffix_width;
    let mut result = String::with_capacity(text.len());
    let mut current_width = 0usize;

    for grapheme in text.graphemes(true) {
        let gw = grapheme_width(method, grapheme);
        if current_width + gw > target_width {
            break;
        }
        result.push_str(grapheme);
        current_width += gw;
    }

    result.push_str(suffix);
    result
}

fn truncate_exact(method: WidthMethod, text: &str, max_width: usize) -> String {
    let mut result = String::new();
    let mut current_width = 0usize;

    for grapheme in text.graphemes(true) {
        let gw = grapheme_width(method, grapheme);
        if current_width + gw > max_width {
            break;
        }
        result.push_str(grapheme);
        current_width += gw;
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fits_unchanged() {
        assert_eq!(truncate_text(WidthMethod::Unicode, "hello", 10, "…"), "hello");
    }

    #[test]
    fn ellipsis_truncation() {
        assert_eq!(truncate_text(WidthMethod::Unicode, "hello world", 6, "…"), "hello…");
    }

    #[test]
    fn cjk_boundary() {
        assert_eq!(truncate_text(WidthMethod::Unicode, "你好世界", 4, "…"), "你…");
    }

    #[test]
    fn suffix_wider_than_max() {
        assert_eq!(truncate_text(WidthMethod::Unicode, "hello", 2, "..."), "..");
    }

    #[test]
    fn preserves_grapheme_cluster() {
        let text = "cafe\u{0301}xyz";
        let result = truncate_text(WidthMethod::Unicode, text, 5, "…");
        assert_eq!(string_width(WidthMethod::Unicode, &result), 5);
        assert!(result.ends_with('…'));
    }
}
