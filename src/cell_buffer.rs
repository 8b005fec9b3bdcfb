//! The cell buffer: a fixed-size grid of cells, the only legal surface for
//! placing characters onto a terminal-shaped canvas. Everything else in
//! this crate (text views, the frame pipeline's composite step, renderer
//! chrome) draws through the primitives here.
//!
//! Storage is four parallel arrays (`char`, `fg`, `bg`, `attr`) indexed
//! row-major, matching the layout a foreign caller would memory-map.

use unicode_normalization::UnicodeNormalization;
use unicode_segmentation::UnicodeSegmentation;

use crate::cell::{Attr, Cell};
use crate::color::Color;
use crate::error::{Error, Result};
use crate::geometry::Rect;
use crate::text::{grapheme_width, WidthMethod};

const MAX_SCISSOR_DEPTH: usize = 32;

/// A named border glyph set, or an explicit 11-glyph table.
///
/// Explicit order: `[tl, tr, bl, br, h, v, t, b, l, r, x]` — the four
/// corners, the two edges, and the three- and four-way junctions used when
/// boxes are tiled against each other.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BorderStyle {
    Single,
    Double,
    Rounded,
    Heavy,
    Custom([char; 11]),
}

impl BorderStyle {
    const fn glyphs(self) -> [char; 11] {
        match self {
            BorderStyle::Single => ['┌', '┐', '└', '┘', '─', '│', '┬', '┴', '├', '┤', '┼'],
            BorderStyle::Double => ['╔', '╗', '╚', '╝', '═', '║', '╦', '╩', '╠', '╣', '╬'],
            BorderStyle::Rounded => ['╭', '╮', '╰', '╯', '─', '│', '┬', '┴', '├', '┤', '┼'],
            BorderStyle::Heavy => ['┏', '┓', '┗', '┛', '━', '┃', '┳', '┻', '┣', '┫', '╋'],
            BorderStyle::Custom(glyphs) => glyphs,
        }
    }

    fn tl(self) -> char {
        self.glyphs()[0]
    }
    fn tr(self) -> char {
        self.glyphs()[1]
    }
    fn bl(self) -> char {
        self.glyphs()[2]
    }
    fn br(self) -> char {
        self.glyphs()[3]
    }
    fn h(self) -> char {
        self.glyphs()[4]
    }
    fn v(self) -> char {
        self.glyphs()[5]
    }
}

bitflags::bitflags! {
    /// Which sides of a box are drawn.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BoxSides: u8 {
        const TOP    = 1 << 0;
        const RIGHT  = 1 << 1;
        const BOTTOM = 1 << 2;
        const LEFT   = 1 << 3;
        const ALL = Self::TOP.bits() | Self::RIGHT.bits() | Self::BOTTOM.bits() | Self::LEFT.bits();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TitleAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Options for [`CellBuffer::draw_box`].
pub struct BoxOptions<'a> {
    pub style: BorderStyle,
    pub sides: BoxSides,
    pub fill: bool,
    pub bg: Color,
    pub border_fg: Color,
    pub title: Option<&'a str>,
    pub title_align: TitleAlign,
}

impl<'a> Default for BoxOptions<'a> {
    fn default() -> Self {
        Self {
            style: BorderStyle::Single,
            sides: BoxSides::ALL,
            fill: false,
            bg: Color::TERMINAL_DEFAULT,
            border_fg: Color::TERMINAL_DEFAULT,
            title: None,
            title_align: TitleAlign::Left,
        }
    }
}

/// A codepoint-index selection range applied during [`CellBuffer::draw_text`],
/// overriding colors for cells whose source codepoint index falls inside it.
pub struct TextSelection {
    pub start: usize,
    pub end: usize,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
}

/// Raw-record format consumed by [`CellBuffer::draw_packed_buffer`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PackedFormat {
    Rgba,
    Bgra,
}

pub struct CellBuffer {
    id: String,
    width: u16,
    height: u16,
    char: Vec<u32>,
    fg: Vec<Color>,
    bg: Vec<Color>,
    attr: Vec<Attr>,
    respect_alpha: bool,
    scissors: Vec<Rect>,
    width_method: WidthMethod,
}

impl CellBuffer {
    pub fn new(id: impl Into<String>, width: u16, height: u16) -> Self {
        let len = width as usize * height as usize;
        Self {
            id: id.into(),
            width,
            height,
            char: vec![b' ' as u32; len],
            fg: vec![Color::TERMINAL_DEFAULT; len],
            bg: vec![Color::TERMINAL_DEFAULT; len],
            attr: vec![Attr::NONE; len],
            respect_alpha: true,
            scissors: Vec::new(),
            width_method: WidthMethod::Unicode,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    #[inline]
    pub fn width(&self) -> u16 {
        self.width
    }

    #[inline]
    pub fn height(&self) -> u16 {
        self.height
    }

    #[inline]
    pub fn bounds(&self) -> Rect {
        Rect::new(0, 0, self.width, self.height)
    }

    pub fn respect_alpha(&self) -> bool {
        self.respect_alpha
    }

    pub fn set_respect_alpha(&mut self, respect_alpha: bool) {
        self.respect_alpha = respect_alpha;
    }

    pub fn width_method(&self) -> WidthMethod {
        self.width_method
    }

    pub fn set_width_method(&mut self, method: WidthMethod) {
        self.width_method = method;
    }

    #[inline]
    fn index(&self, x: u16, y: u16) -> usize {
        y as usize * self.width as usize + x as usize
    }

    #[inline]
    pub fn in_bounds(&self, x: u16, y: u16) -> bool {
        x < self.width && y < self.height
    }

    /// Intersection of every pushed scissor rect with the buffer's own
    /// bounds. `None` means the clip has collapsed to nothing.
    pub fn active_clip(&self) -> Option<Rect> {
        let mut clip = self.bounds();
        for scissor in &self.scissors {
            clip = clip.intersect(scissor)?;
        }
        Some(clip)
    }

    fn clipped(&self, x: u16, y: u16) -> bool {
        if !self.in_bounds(x, y) {
            return true;
        }
        match self.active_clip() {
            Some(clip) => !clip.contains(x, y),
            None => true,
        }
    }

    pub fn push_scissor(&mut self, x: u16, y: u16, width: u16, height: u16) {
        if self.scissors.len() >= MAX_SCISSOR_DEPTH {
            tracing::warn!(buffer = %self.id, "scissor stack depth exceeded, ignoring push");
            return;
        }
        self.scissors.push(Rect::new(x, y, width, height));
    }

    pub fn pop_scissor(&mut self) {
        self.scissors.pop();
    }

    pub fn clear_scissors(&mut self) {
        self.scissors.clear();
    }

    pub fn get(&self, x: u16, y: u16) -> Option<Cell> {
        if !self.in_bounds(x, y) {
            return None;
        }
        let idx = self.index(x, y);
        Some(Cell { char: self.char[idx], fg: self.fg[idx], bg: self.bg[idx], attrs: self.attr[idx] })
    }

    pub fn cells(&self) -> impl Iterator<Item = Cell> + '_ {
        (0..self.char.len()).map(move |i| Cell { char: self.char[i], fg: self.fg[i], bg: self.bg[i], attrs: self.attr[i] })
    }

    /// Sets every cell to `(space, default_fg, bg, NONE)`.
    pub fn clear(&mut self, bg: Color) {
        self.char.fill(b' ' as u32);
        self.fg.fill(Color::TERMINAL_DEFAULT);
        self.bg.fill(bg);
        self.attr.fill(Attr::NONE);
    }

    pub fn resize(&mut self, width: u16, height: u16, bg: Color) -> Result<()> {
        let new_len = width as usize * height as usize;
        let mut char = vec![b' ' as u32; new_len];
        let mut fg = vec![Color::TERMINAL_DEFAULT; new_len];
        let mut bg_arr = vec![bg; new_len];
        let mut attr = vec![Attr::NONE; new_len];

        let copy_w = self.width.min(width);
        let copy_h = self.height.min(height);
        for y in 0..copy_h {
            for x in 0..copy_w {
                let old_idx = y as usize * self.width as usize + x as usize;
                let new_idx = y as usize * width as usize + x as usize;
                char[new_idx] = self.char[old_idx];
                fg[new_idx] = self.fg[old_idx];
                bg_arr[new_idx] = self.bg[old_idx];
                attr[new_idx] = self.attr[old_idx];
            }
        }

        self.width = width;
        self.height = height;
        self.char = char;
        self.fg = fg;
        self.bg = bg_arr;
        self.attr = attr;
        Ok(())
    }

    /// Overwrite; no blending. Ignored if `(x, y)` is outside the active clip.
    pub fn set_cell(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if self.clipped(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        self.char[idx] = cell.char;
        self.fg[idx] = cell.fg;
        self.bg[idx] = cell.bg;
        self.attr[idx] = cell.attrs;
        true
    }

    /// Composite `cell` with the existing cell at `(x, y)`.
    pub fn set_cell_blended(&mut self, x: u16, y: u16, cell: Cell) -> bool {
        if self.clipped(x, y) {
            return false;
        }
        let idx = self.index(x, y);
        let dst = Cell { char: self.char[idx], fg: self.fg[idx], bg: self.bg[idx], attrs: self.attr[idx] };

        let blended_bg = Color::blend(cell.bg, dst.bg);
        let blended_fg = Color::blend(cell.fg, dst.fg);

        let is_space = cell.char == b' ' as u32;
        let dst_is_space = dst.char == b' ' as u32 || dst.is_continuation();
        let keep_dst_char = is_space && !dst_is_space && cell.bg.a < 1.0;

        self.char[idx] = if keep_dst_char { dst.char } else { cell.char };
        self.fg[idx] = blended_fg;
        self.bg[idx] = blended_bg;
        self.attr[idx] = cell.attrs;
        true
    }

    /// When `bg.alpha < 1`, blends with the destination background and
    /// keeps the existing char and fg; otherwise resets the rect to
    /// `(space, default_fg, bg, NONE)`.
    pub fn fill_rect(&mut self, x: u16, y: u16, width: u16, height: u16, bg: Color) {
        let Some(clip) = self.active_clip() else { return };
        let x2 = x.saturating_add(width).min(self.width).min(clip.x + clip.width);
        let y2 = y.saturating_add(height).min(self.height).min(clip.y + clip.height);
        let x1 = x.max(clip.x);
        let y1 = y.max(clip.y);
        if x2 <= x1 || y2 <= y1 {
            return;
        }

        let opaque = bg.a >= 1.0 || bg.is_terminal_default();
        for row in y1..y2 {
            for col in x1..x2 {
                let idx = self.index(col, row);
                if opaque {
                    self.char[idx] = b' ' as u32;
                    self.fg[idx] = Color::TERMINAL_DEFAULT;
                    self.bg[idx] = bg;
                    self.attr[idx] = Attr::NONE;
                } else {
                    self.bg[idx] = Color::blend(bg, self.bg[idx]);
                }
            }
        }
    }

    /// Iterate grapheme clusters, placing each at consecutive columns per
    /// its display width. Returns the number of columns consumed.
    pub fn draw_text(
        &mut self,
        text: &str,
        x: u16,
        y: u16,
        fg: Color,
        bg: Option<Color>,
        attr: Attr,
        selection: Option<&TextSelection>,
    ) -> u16 {
        let bg = bg.unwrap_or(Color::TRANSPARENT);
        let mut col = x;
        let mut codepoint_idx = 0usize;
        let mut last_col: Option<u16> = None;

        for grapheme in text.graphemes(true) {
            let n_codepoints = grapheme.chars().count();
            let width = grapheme_width(self.width_method, grapheme);

            if width == 0 {
                // Standalone combining mark (its base lived in a prior
                // draw_text call): fold onto the previous cell via NFC
                // when a precomposed form exists, else drop it.
                if let Some(prev_col) = last_col {
                    self.merge_combining_mark(prev_col, y, grapheme);
                }
                codepoint_idx += n_codepoints;
                continue;
            }

            let (cell_fg, cell_bg) = selection
                .filter(|sel| codepoint_idx >= sel.start && codepoint_idx < sel.end)
                .map(|sel| (sel.fg.unwrap_or(fg), sel.bg.unwrap_or(bg)))
                .unwrap_or((fg, bg));

            let base_char = grapheme.chars().next().unwrap_or(' ') as u32;

            if width == 2 {
                // Drawn as a whole or not at all: never half-draw a wide cluster.
                if self.clipped(col, y) || self.clipped(col + 1, y) {
                    break;
                }
                self.set_cell_blended(col, y, Cell::new(base_char, cell_fg, cell_bg, attr));
                self.set_cell_blended(col + 1, y, Cell::new(Cell::CONTINUATION_CHAR, cell_fg, cell_bg, attr));
                last_col = Some(col);
                col += 2;
            } else {
                if self.clipped(col, y) {
                    break;
                }
                self.set_cell_blended(col, y, Cell::new(base_char, cell_fg, cell_bg, attr));
                last_col = Some(col);
                col += 1;
            }

            codepoint_idx += n_codepoints;
        }

        col.saturating_sub(x)
    }

    fn merge_combining_mark(&mut self, x: u16, y: u16, mark: &str) {
        let Some(cell) = self.get(x, y) else { return };
        if cell.is_continuation() {
            return;
        }
        let Some(base) = char::from_u32(cell.char) else { return };
        let mut composed = String::with_capacity(base.len_utf8() + mark.len());
        composed.push(base);
        composed.push_str(mark);
        let mut nfc = composed.nfc();
        if let (Some(single), None) = (nfc.next(), nfc.next()) {
            let idx = self.index(x, y);
            self.char[idx] = single as u32;
        }
    }

    /// Draws an axis-aligned box. The title, if any, is space-padded and
    /// inlined into the top border; it is ellipsis-truncated only when it
    /// cannot fit with at least one border glyph remaining on each side.
    pub fn draw_box(&mut self, x: u16, y: u16, width: u16, height: u16, opts: &BoxOptions) {
        if width < 2 || height < 2 {
            return;
        }

        if opts.fill {
            self.fill_rect(x, y, width, height, opts.bg);
        }

        let x2 = x + width - 1;
        let y2 = y + height - 1;
        let style = opts.style;
        let border = Cell::new(0, opts.border_fg, opts.bg, Attr::NONE);

        if opts.sides.contains(BoxSides::TOP) {
            self.set_cell_blended(x, y, border.with_char(style.tl() as u32));
            self.set_cell_blended(x2, y, border.with_char(style.tr() as u32));
            for col in (x + 1)..x2 {
                self.set_cell_blended(col, y, border.with_char(style.h() as u32));
            }
        }
        if opts.sides.contains(BoxSides::BOTTOM) {
            self.set_cell_blended(x, y2, border.with_char(style.bl() as u32));
            self.set_cell_blended(x2, y2, border.with_char(style.br() as u32));
            for col in (x + 1)..x2 {
                self.set_cell_blended(col, y2, border.with_char(style.h() as u32));
            }
        }
        if opts.sides.contains(BoxSides::LEFT) {
            for row in (y + 1)..y2 {
                self.set_cell_blended(x, row, border.with_char(style.v() as u32));
            }
        }
        if opts.sides.contains(BoxSides::RIGHT) {
            for row in (y + 1)..y2 {
                self.set_cell_blended(x2, row, border.with_char(style.v() as u32));
            }
        }

        if let Some(title) = opts.title {
            if opts.sides.contains(BoxSides::TOP) {
                self.draw_title(x, y, x2, title, opts);
            }
        }
    }

    fn draw_title(&mut self, x: u16, y: u16, x2: u16, title: &str, opts: &BoxOptions) {
        let inner_width = x2.saturating_sub(x).saturating_sub(1); // columns strictly between corners
        if inner_width < 3 {
            return; // no room for even " X "
        }

        let padded = format!(" {} ", title);
        let padded_width = grapheme_width(self.width_method, &padded).max(padded.chars().count());
        let max_title_width = inner_width as usize;

        let display = if padded_width > max_title_width {
            let budget = max_title_width.saturating_sub(3); // leave room for " …" padding
            let truncated = crate::text::truncate_text(self.width_method, title, budget, "…");
            format!(" {} ", truncated)
        } else {
            padded
        };

        let display_width = display.chars().count().min(max_title_width);
        let offset = match opts.title_align {
            TitleAlign::Left => 0,
            TitleAlign::Center => (max_title_width.saturating_sub(display_width)) / 2,
            TitleAlign::Right => max_title_width.saturating_sub(display_width),
        };

        self.draw_text(
            &display,
            x + 1 + offset as u16,
            y,
            opts.border_fg,
            Some(opts.bg),
            Attr::NONE,
            None,
        );
    }

    /// Copies a sub-rectangle of `src` into `self` at `(dst_x, dst_y)`. A
    /// straight-copy fast path is taken when `src.respect_alpha()` is
    /// false; otherwise cells are blended (fully transparent cells skipped).
    pub fn draw_frame_buffer(
        &mut self,
        dst_x: u16,
        dst_y: u16,
        src: &CellBuffer,
        src_x: u16,
        src_y: u16,
        src_w: u16,
        src_h: u16,
    ) {
        let src_w = src_w.min(src.width.saturating_sub(src_x));
        let src_h = src_h.min(src.height.saturating_sub(src_y));

        for row in 0..src_h {
            for col in 0..src_w {
                let Some(cell) = src.get(src_x + col, src_y + row) else { continue };
                let (dx, dy) = (dst_x + col, dst_y + row);

                if !src.respect_alpha {
                    self.set_cell(dx, dy, cell);
                    continue;
                }

                if cell.bg.a <= 0.0 && cell.fg.a <= 0.0 {
                    continue;
                }
                self.set_cell_blended(dx, dy, cell);
            }
        }
    }

    /// Reduces a 2x2-pixel block per cell into a half-block glyph
    /// (`▀`/`▄`/`█`/` `), splitting foreground/background between the top
    /// and bottom pixel pair.
    pub fn draw_super_sample_buffer(&mut self, x: u16, y: u16, pixels: &[u8], fmt: PackedFormat, stride: usize) {
        let px_w = stride / 4;
        let px_h = pixels.len() / stride.max(1);
        let cell_w = (px_w / 2) as u16;
        let cell_h = (px_h / 2) as u16;

        let read_pixel = |px: usize, py: usize| -> Color {
            let offset = py * stride + px * 4;
            if offset + 4 > pixels.len() {
                return Color::TRANSPARENT;
            }
            let (r, g, b, a) = match fmt {
                PackedFormat::Rgba => (pixels[offset], pixels[offset + 1], pixels[offset + 2], pixels[offset + 3]),
                PackedFormat::Bgra => (pixels[offset + 2], pixels[offset + 1], pixels[offset], pixels[offset + 3]),
            };
            Color::rgba(r, g, b, a)
        };

        for cy in 0..cell_h {
            for cx in 0..cell_w {
                let top = read_pixel(cx as usize * 2, cy as usize * 2);
                let bottom = read_pixel(cx as usize * 2, cy as usize * 2 + 1);

                let (ch, fg, bg) = match (top.a > 0.0, bottom.a > 0.0) {
                    (true, true) => ('▀', top, bottom),
                    (true, false) => ('▀', top, Color::TRANSPARENT),
                    (false, true) => ('▄', bottom, Color::TRANSPARENT),
                    (false, false) => (' ', Color::TRANSPARENT, Color::TRANSPARENT),
                };

                self.set_cell_blended(x + cx, y + cy, Cell::new(ch as u32, fg, bg, Attr::NONE));
            }
        }
    }

    /// Consumes a compact external record format: each cell is
    /// `(codepoint: u32, fg_rgba8: [u8;4], bg_rgba8: [u8;4], attr: u8, padding: [u8;3])`,
    /// 16 bytes per cell (record stride per spec §6), widened to floats on copy.
    pub fn draw_packed_buffer(&mut self, data: &[u8], x: u16, y: u16, term_w: u16, term_h: u16) -> Result<()> {
        const RECORD_LEN: usize = 16;
        let expected = term_w as usize * term_h as usize * RECORD_LEN;
        if data.len() < expected {
            return Err(Error::contract(format!(
                "draw_packed_buffer: expected at least {expected} bytes, got {}",
                data.len()
            )));
        }

        for row in 0..term_h {
            for col in 0..term_w {
                let offset = (row as usize * term_w as usize + col as usize) * RECORD_LEN;
                let record = &data[offset..offset + RECORD_LEN];
                let cp = u32::from_le_bytes([record[0], record[1], record[2], record[3]]);
                let fg = Color::rgba(record[4], record[5], record[6], record[7]);
                let bg = Color::rgba(record[8], record[9], record[10], record[11]);
                let attr = Attr::from_bits_truncate(record[12]);
                self.set_cell(x + col, y + row, Cell::new(cp, fg, bg, attr));
            }
        }
        Ok(())
    }

    /// Serialize the live grid as UTF-8 text, optionally inserting a line
    /// break at each row end. Used for test capture and accessibility readout.
    pub fn write_resolved_chars(&self, out: &mut String, add_line_breaks: bool) {
        for y in 0..self.height {
            for x in 0..self.width {
                let idx = self.index(x, y);
                let cp = self.char[idx];
                if cp == Cell::CONTINUATION_CHAR {
                    continue;
                }
                if let Some(c) = char::from_u32(cp) {
                    out.push(c);
                }
            }
            if add_line_breaks {
                out.push('\n');
            }
        }
    }
}

impl Cell {
    fn with_char(self, char: u32) -> Self {
        Self { char, ..self }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_cell_respects_scissor() {
        let mut buf = CellBuffer::new("test", 10, 10);
        buf.push_scissor(2, 2, 3, 3);
        assert!(!buf.set_cell(0, 0, Cell::new('x' as u32, Color::WHITE, Color::BLACK, Attr::NONE)));
        assert!(buf.set_cell(2, 2, Cell::new('x' as u32, Color::WHITE, Color::BLACK, Attr::NONE)));
    }

    #[test]
    fn draw_text_wide_char_writes_continuation() {
        let mut buf = CellBuffer::new("test", 10, 2);
        buf.draw_text("中", 0, 0, Color::WHITE, None, Attr::NONE, None);
        assert_eq!(buf.get(0, 0).unwrap().char, '中' as u32);
        assert!(buf.get(1, 0).unwrap().is_continuation());
    }

    #[test]
    fn draw_text_wide_char_skipped_when_it_would_split_at_clip() {
        let mut buf = CellBuffer::new("test", 10, 2);
        buf.push_scissor(0, 0, 1, 1); // only column 0 available
        buf.draw_text("中", 0, 0, Color::WHITE, None, Attr::NONE, None);
        assert_eq!(buf.get(0, 0).unwrap().char, b' ' as u32); // never half-drawn
    }

    #[test]
    fn fill_rect_opaque_resets_char() {
        let mut buf = CellBuffer::new("test", 10, 10);
        buf.draw_text("X", 5, 5, Color::WHITE, None, Attr::NONE, None);
        buf.fill_rect(5, 5, 1, 1, Color::BLUE);
        let cell = buf.get(5, 5).unwrap();
        assert_eq!(cell.char, b' ' as u32);
        assert_eq!(cell.bg, Color::BLUE);
    }

    #[test]
    fn set_cell_blended_preserves_char_under_translucent_space() {
        let mut buf = CellBuffer::new("test", 10, 10);
        buf.set_cell(0, 0, Cell::new('A' as u32, Color::WHITE, Color::BLACK, Attr::NONE));
        buf.set_cell_blended(0, 0, Cell::new(b' ' as u32, Color::WHITE, Color::rgba(255, 0, 0, 128), Attr::NONE));
        assert_eq!(buf.get(0, 0).unwrap().char, 'A' as u32);
    }

    #[test]
    fn box_draws_corners_and_edges() {
        let mut buf = CellBuffer::new("test", 5, 3);
        buf.draw_box(0, 0, 5, 3, &BoxOptions { style: BorderStyle::Single, ..Default::default() });
        assert_eq!(buf.get(0, 0).unwrap().char, '┌' as u32);
        assert_eq!(buf.get(4, 0).unwrap().char, '┐' as u32);
        assert_eq!(buf.get(0, 2).unwrap().char, '└' as u32);
        assert_eq!(buf.get(4, 2).unwrap().char, '┘' as u32);
    }

    #[test]
    fn write_resolved_chars_skips_continuations() {
        let mut buf = CellBuffer::new("test", 3, 1);
        buf.draw_text("a中", 0, 0, Color::WHITE, None, Attr::NONE, None);
        let mut out = String::new();
        buf.write_resolved_chars(&mut out, false);
        assert_eq!(out, "a中");
    }

    #[test]
    fn packed_buffer_round_trip() {
        let mut data = Vec::new();
        data.extend_from_slice(&('Z' as u32).to_le_bytes());
        data.extend_from_slice(&[255, 0, 0, 255]);
        data.extend_from_slice(&[0, 0, 0, 255]);
        data.push(Attr::BOLD.bits());
        data.extend_from_slice(&[0, 0, 0]); // padding

        let mut buf = CellBuffer::new("test", 1, 1);
        buf.draw_packed_buffer(&data, 0, 0, 1, 1).unwrap();
        let cell = buf.get(0, 0).unwrap();
        assert_eq!(cell.char, 'Z' as u32);
        assert_eq!(cell.attrs, Attr::BOLD);
    }
}
