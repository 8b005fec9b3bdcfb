//! Logical text content: chunks, highlights, defaults. Visual concerns
//! (wrap, viewport, selection) live in [`TextView`](super::TextView).

use std::path::Path;

use crate::cell::Attr;
use crate::color::Color;
use crate::error::{Error, Result};

use super::chunk::{Chunk, Highlight, HighlightRange, HighlightRef};

#[derive(Default)]
pub struct TextBuffer {
    chunks: Vec<Chunk>,
    highlights: Vec<Highlight>,
    next_highlight_id: u64,
    line_starts: Vec<usize>,
    default_fg: Option<Color>,
    default_bg: Option<Color>,
    default_attr: Option<Attr>,
    version: u64,
}

impl TextBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bumped on any change that could affect a [`TextView`](super::TextView)'s
    /// cached virtual-line layout: content, chunking, or highlights.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn set_text(&mut self, text: impl Into<String>) {
        self.set_chunks(vec![Chunk::new(text)]);
    }

    pub fn set_chunks(&mut self, chunks: Vec<Chunk>) {
        self.chunks = chunks;
        self.highlights.clear();
        self.recompute_line_starts();
        self.version += 1;
    }

    pub fn load_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let bytes = std::fs::read(path)?;
        let text = String::from_utf8(bytes).map_err(|e| {
            let offset = e.utf8_error().valid_up_to();
            Error::encoding(offset, "load_file: invalid UTF-8")
        })?;
        self.set_text(text);
        Ok(())
    }

    pub fn set_default_fg(&mut self, fg: Color) {
        self.default_fg = Some(fg);
    }

    pub fn set_default_bg(&mut self, bg: Color) {
        self.default_bg = Some(bg);
    }

    pub fn set_default_attr(&mut self, attr: Attr) {
        self.default_attr = Some(attr);
    }

    pub fn default_fg(&self) -> Color {
        self.default_fg.unwrap_or(Color::TERMINAL_DEFAULT)
    }

    pub fn default_bg(&self) -> Color {
        self.default_bg.unwrap_or(Color::TERMINAL_DEFAULT)
    }

    pub fn default_attr(&self) -> Attr {
        self.default_attr.unwrap_or(Attr::NONE)
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn line_starts(&self) -> &[usize] {
        &self.line_starts
    }

    pub fn add_highlight_by_chars(
        &mut self,
        start: usize,
        end: usize,
        fg: Option<Color>,
        bg: Option<Color>,
        attr: Option<Attr>,
        priority: u32,
    ) -> HighlightRef {
        self.push_highlight(HighlightRange::Chars { start, end }, fg, bg, attr, priority)
    }

    pub fn add_highlight_by_line_col(
        &mut self,
        line: usize,
        col_start: usize,
        col_end: usize,
        fg: Option<Color>,
        bg: Option<Color>,
        attr: Option<Attr>,
        priority: u32,
    ) -> HighlightRef {
        self.push_highlight(
            HighlightRange::LineCols { line, col_start, col_end },
            fg,
            bg,
            attr,
            priority,
        )
    }

    fn push_highlight(
        &mut self,
        range: HighlightRange,
        fg: Option<Color>,
        bg: Option<Color>,
        attr: Option<Attr>,
        priority: u32,
    ) -> HighlightRef {
        let id = HighlightRef(self.next_highlight_id);
        self.next_highlight_id += 1;
        self.highlights.push(Highlight { id, range, fg, bg, attr, priority });
        self.version += 1;
        id
    }

    pub fn remove_highlight(&mut self, id: HighlightRef) {
        self.highlights.retain(|h| h.id != id);
        self.version += 1;
    }

    pub fn clear_highlights_for_line(&mut self, line: usize) {
        self.highlights.retain(|h| !matches!(h.range, HighlightRange::LineCols { line: l, .. } if l == line));
        self.version += 1;
    }

    pub fn clear_highlights(&mut self) {
        self.highlights.clear();
        self.version += 1;
    }

    /// Highlights in ascending priority order, ties broken by insertion
    /// order (stable sort preserves insertion order already).
    pub fn highlights_sorted(&self) -> Vec<&Highlight> {
        let mut sorted: Vec<&Highlight> = self.highlights.iter().collect();
        sorted.sort_by_key(|h| h.priority);
        sorted
    }

    pub fn get_plain_text(&self) -> String {
        self.chunks.iter().map(|c| c.text.as_str()).collect()
    }

    /// `line_starts` is in code-point units (spec §3's line model), not
    /// byte offsets — every consumer (`TextView`'s virtual-line slicing,
    /// `get_logical_line_info`) indexes the plain text with
    /// `chars().skip(n)`, so this must count characters, not bytes.
    fn recompute_line_starts(&mut self) {
        let text = self.get_plain_text();
        let mut starts = vec![0usize];
        for (i, c) in text.chars().enumerate() {
            if c == '\n' {
                starts.push(i + 1);
            }
        }
        self.line_starts = starts;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_text_resets_highlights() {
        let mut buf = TextBuffer::new();
        buf.set_text("hello");
        let r = buf.add_highlight_by_chars(0, 1, None, None, None, 0);
        buf.set_text("world");
        assert!(buf.highlights_sorted().is_empty());
        buf.remove_highlight(r); // no-op, already cleared
    }

    #[test]
    fn line_starts_track_newlines() {
        let mut buf = TextBuffer::new();
        buf.set_text("ab\ncd\ne");
        assert_eq!(buf.line_starts(), &[0, 3, 6]);
    }

    #[test]
    fn line_starts_are_codepoint_indices_not_byte_offsets() {
        let mut buf = TextBuffer::new();
        // 'é' is 2 bytes in UTF-8 but one code point; the line starting
        // after it must be indexed at code-point offset 2, not byte offset 3.
        buf.set_text("é\nx");
        assert_eq!(buf.line_starts(), &[0, 2]);
        let plain: Vec<char> = buf.get_plain_text().chars().collect();
        assert_eq!(plain[buf.line_starts()[1]], 'x');
    }

    #[test]
    fn highlight_priority_ordering() {
        let mut buf = TextBuffer::new();
        buf.set_text("abcdef");
        buf.add_highlight_by_chars(0, 3, None, None, None, 5);
        buf.add_highlight_by_chars(0, 3, None, None, None, 1);
        let sorted = buf.highlights_sorted();
        assert_eq!(sorted[0].priority, 1);
        assert_eq!(sorted[1].priority, 5);
    }

    #[test]
    fn plain_text_concatenates_chunks() {
        let mut buf = TextBuffer::new();
        buf.set_chunks(vec![Chunk::new("foo"), Chunk::new("bar")]);
        assert_eq!(buf.get_plain_text(), "foobar");
    }
}
