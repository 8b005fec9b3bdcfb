//! Visual layout over a [`TextBuffer`](super::TextBuffer): wrap mode and
//! width, viewport, selection, and the `draw` primitive onto a cell buffer.

use crate::cell::{Attr, Cell};
use crate::cell_buffer::CellBuffer;
use crate::color::Color;

use super::buffer::TextBuffer;
use super::chunk::HighlightRange;
use super::width::{string_width, WidthMethod};
use super::wrap::{wrap_line_char, wrap_line_word, WrapMode, WrappedSpan, DEFAULT_TAB_WIDTH};

struct VirtualLine {
    logical_line: usize,
    char_start: usize,
    char_end: usize,
    text: String,
    width: usize,
}

#[derive(Debug, Clone, Copy)]
struct Selection {
    start: usize,
    end: usize,
    fg: Option<Color>,
    bg: Option<Color>,
}

pub struct TextView {
    width_method: WidthMethod,
    wrap_mode: WrapMode,
    wrap_width: u16,
    tab_width: usize,
    viewport_w: u16,
    viewport_h: u16,
    scroll_top: usize,
    selection: Option<Selection>,

    cached_version: Option<u64>,
    cached_wrap_key: (WrapMode, u16),
    virtual_lines: Vec<VirtualLine>,
}

impl Default for TextView {
    fn default() -> Self {
        Self {
            width_method: WidthMethod::Unicode,
            wrap_mode: WrapMode::None,
            wrap_width: 0,
            tab_width: DEFAULT_TAB_WIDTH,
            viewport_w: 0,
            viewport_h: 0,
            scroll_top: 0,
            selection: None,
            cached_version: None,
            cached_wrap_key: (WrapMode::None, 0),
            virtual_lines: Vec::new(),
        }
    }
}

impl TextView {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_width_method(mut self, method: WidthMethod) -> Self {
        self.width_method = method;
        self
    }

    pub fn set_wrap_width(&mut self, cols: u16) {
        self.wrap_width = cols;
    }

    pub fn set_wrap_mode(&mut self, mode: WrapMode) {
        self.wrap_mode = mode;
    }

    pub fn set_tab_width(&mut self, tab_width: usize) {
        self.tab_width = tab_width.max(1);
    }

    pub fn set_viewport_size(&mut self, w: u16, h: u16) {
        self.viewport_w = w;
        self.viewport_h = h;
    }

    pub fn set_scroll_top(&mut self, row: usize) {
        self.scroll_top = row;
    }

    pub fn set_selection(&mut self, start: usize, end: usize, fg: Option<Color>, bg: Option<Color>) {
        let (start, end) = if start <= end { (start, end) } else { (end, start) };
        self.selection = Some(Selection { start, end, fg, bg });
    }

    pub fn reset_selection(&mut self) {
        self.selection = None;
    }

    /// Selection expressed in view-space coordinates (anchor/focus as
    /// `(col, row)` against the *virtual* line grid); clamped to the
    /// view's logical bounds.
    pub fn set_local_selection(
        &mut self,
        buffer: &TextBuffer,
        anchor_x: usize,
        anchor_y: usize,
        focus_x: usize,
        focus_y: usize,
        fg: Option<Color>,
        bg: Option<Color>,
    ) {
        self.recompute(buffer);
        let to_char = |x: usize, y: usize| -> usize {
            let y = y.min(self.virtual_lines.len().saturating_sub(1));
            match self.virtual_lines.get(y) {
                Some(line) => (line.char_start + x).min(line.char_end),
                None => 0,
            }
        };
        let start = to_char(anchor_x, anchor_y);
        let end = to_char(focus_x, focus_y);
        self.set_selection(start, end, fg, bg);
    }

    pub fn get_selected_text(&mut self, buffer: &TextBuffer) -> String {
        self.recompute(buffer);
        match self.selection {
            Some(sel) => {
                let text = buffer.get_plain_text();
                let (start, end) = (sel.start.min(text.chars().count()), sel.end.min(text.chars().count()));
                text.chars().skip(start).take(end - start).collect()
            }
            None => String::new(),
        }
    }

    pub fn get_plain_text(&self, buffer: &TextBuffer) -> String {
        buffer.get_plain_text()
    }

    /// `(line_starts, line_widths, max_width)` for virtual (wrapped) lines.
    pub fn get_line_info(&mut self, buffer: &TextBuffer) -> (Vec<usize>, Vec<usize>, usize) {
        self.recompute(buffer);
        let starts = self.virtual_lines.iter().map(|l| l.char_start).collect();
        let widths: Vec<usize> = self.virtual_lines.iter().map(|l| l.width).collect();
        let max_width = widths.iter().copied().max().unwrap_or(0);
        (starts, widths, max_width)
    }

    /// `(line_starts, line_widths, max_width)` for logical (unwrapped) lines.
    pub fn get_logical_line_info(&self, buffer: &TextBuffer) -> (Vec<usize>, Vec<usize>, usize) {
        let text = buffer.get_plain_text();
        let starts = buffer.line_starts().to_vec();
        let mut widths = Vec::with_capacity(starts.len());
        for w in starts.windows(2) {
            let line: String = text.chars().skip(w[0]).take(w[1] - w[0]).collect();
            widths.push(string_width(self.width_method, line.trim_end_matches('\n')));
        }
        if let Some(&last_start) = starts.last() {
            let line: String = text.chars().skip(last_start).collect();
            widths.push(string_width(self.width_method, &line));
        }
        let max_width = widths.iter().copied().max().unwrap_or(0);
        (starts, widths, max_width)
    }

    pub fn virtual_line_count(&mut self, buffer: &TextBuffer) -> usize {
        self.recompute(buffer);
        self.virtual_lines.len()
    }

    fn recompute(&mut self, buffer: &TextBuffer) {
        let key = (self.wrap_mode, self.wrap_width);
        if self.cached_version == Some(buffer.version()) && self.cached_wrap_key == key {
            return;
        }

        let text = buffer.get_plain_text();
        let line_starts = buffer.line_starts();
        let mut virtual_lines = Vec::new();
        let mut logical_idx = 0usize;
        let mut iter = line_starts.iter().peekable();
        while let Some(&start) = iter.next() {
            let end = iter.peek().copied().copied().unwrap_or(usize::MAX);
            let raw_line: String = if end == usize::MAX {
                text.chars().skip(start).collect()
            } else {
                text.chars().skip(start).take(end - start).collect()
            };
            let line = raw_line.strip_suffix('\n').unwrap_or(&raw_line);

            let spans: Vec<WrappedSpan> = match self.wrap_mode {
                WrapMode::None => vec![WrappedSpan {
                    text: line.to_string(),
                    char_start: 0,
                    char_end: line.chars().count(),
                }],
                WrapMode::Char => wrap_line_char(self.width_method, line, self.wrap_width as usize, self.tab_width),
                WrapMode::Word => wrap_line_word(self.width_method, line, self.wrap_width as usize, self.tab_width),
            };

            for span in spans {
                let width = string_width(self.width_method, &span.text);
                virtual_lines.push(VirtualLine {
                    logical_line: logical_idx,
                    char_start: start + span.char_start,
                    char_end: start + span.char_end,
                    text: span.text,
                    width,
                });
            }

            logical_idx += 1;
        }

        self.virtual_lines = virtual_lines;
        self.cached_version = Some(buffer.version());
        self.cached_wrap_key = key;
    }

    /// Render the visible slice of virtual lines into `dst` at `(x, y)`,
    /// applying per-chunk style, then highlights in ascending priority,
    /// then the active selection.
    pub fn draw(&mut self, buffer: &TextBuffer, dst: &mut CellBuffer, x: u16, y: u16) {
        self.recompute(buffer);

        let visible_rows = if self.viewport_h == 0 { self.virtual_lines.len() } else { self.viewport_h as usize };
        let highlights = buffer.highlights_sorted();
        let total_chars = buffer.get_plain_text().chars().count();

        for (row, vline) in self.virtual_lines.iter().skip(self.scroll_top).take(visible_rows).enumerate() {
            let mut col: u16 = 0;
            for (char_offset, ch) in vline.text.chars().enumerate() {
                let abs_char = vline.char_start + char_offset;
                if self.viewport_w != 0 && col >= self.viewport_w {
                    break;
                }

                let mut fg = buffer.default_fg();
                let mut bg = buffer.default_bg();
                let mut attr = buffer.default_attr();

                for h in &highlights {
                    if highlight_contains(h.range, vline.logical_line, abs_char) {
                        if let Some(c) = h.fg {
                            fg = c;
                        }
                        if let Some(c) = h.bg {
                            bg = c;
                        }
                        if let Some(a) = h.attr {
                            attr = a;
                        }
                    }
                }

                if let Some(sel) = self.selection {
                    if abs_char < total_chars && abs_char >= sel.start && abs_char < sel.end {
                        if let Some(c) = sel.fg {
                            fg = c;
                        }
                        if let Some(c) = sel.bg {
                            bg = c;
                        }
                    }
                }

                let cw = super::width::char_width(self.width_method, ch);
                dst.set_cell(x + col, y + row as u16, Cell::new(ch as u32, fg, bg, attr));
                if cw == 2 {
                    dst.set_cell(x + col + 1, y + row as u16, Cell::new(Cell::CONTINUATION_CHAR, fg, bg, Attr::NONE));
                    col += 2;
                } else {
                    col += cw.max(1) as u16;
                }
            }
        }
    }
}

fn highlight_contains(range: HighlightRange, logical_line: usize, abs_char: usize) -> bool {
    match range {
        HighlightRange::Chars { start, end } => abs_char >= start && abs_char < end,
        HighlightRange::LineCols { line, col_start, col_end } => {
            line == logical_line && abs_char >= col_start && abs_char < col_end
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::Chunk;

    #[test]
    fn none_mode_is_one_virtual_line_per_logical_line() {
        let mut buf = TextBuffer::new();
        buf.set_text("ab\ncd");
        let mut view = TextView::new();
        assert_eq!(view.virtual_line_count(&buf), 2);
    }

    #[test]
    fn word_wrap_produces_expected_virtual_lines() {
        let mut buf = TextBuffer::new();
        buf.set_text("hello world");
        let mut view = TextView::new();
        view.set_wrap_mode(WrapMode::Word);
        view.set_wrap_width(7);
        let (starts, widths, max_width) = view.get_line_info(&buf);
        assert_eq!(starts, vec![0, 6]);
        assert_eq!(widths, vec![6, 5]);
        assert_eq!(max_width, 6);
    }

    #[test]
    fn selection_clamped_to_text_length() {
        let mut buf = TextBuffer::new();
        buf.set_text("hello");
        let mut view = TextView::new();
        view.set_selection(0, 100, None, None);
        assert_eq!(view.get_selected_text(&buf), "hello");
    }

    #[test]
    fn logical_line_info_ignores_wrap() {
        let mut buf = TextBuffer::new();
        buf.set_chunks(vec![Chunk::new("ab\ncd\n")]);
        let view = TextView::new();
        let (starts, widths, _) = view.get_logical_line_info(&buf);
        assert_eq!(starts, vec![0, 3, 6]);
        assert_eq!(widths, vec![2, 2, 0]);
    }
}
