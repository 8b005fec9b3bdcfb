//! The atomic unit of terminal rendering.

use crate::color::Color;

bitflags::bitflags! {
    /// Text attributes as a bitfield.
    ///
    /// Combine with bitwise OR: `Attr::BOLD | Attr::ITALIC`.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Attr: u8 {
        const NONE          = 0;
        const BOLD          = 1 << 0;
        const DIM           = 1 << 1;
        const ITALIC        = 1 << 2;
        const UNDERLINE     = 1 << 3;
        const BLINK         = 1 << 4;
        const INVERSE       = 1 << 5;
        const HIDDEN        = 1 << 6;
        const STRIKETHROUGH = 1 << 7;
    }
}

/// A single terminal cell: codepoint, colors, and attributes.
///
/// A codepoint of `0` marks a continuation column of a wide (2-cell)
/// grapheme; it carries no glyph of its own and is skipped at emit time.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Cell {
    pub char: u32,
    pub fg: Color,
    pub bg: Color,
    pub attrs: Attr,
}

impl Cell {
    pub const CONTINUATION_CHAR: u32 = 0;

    pub fn new(char: u32, fg: Color, bg: Color, attrs: Attr) -> Self {
        Self { char, fg, bg, attrs }
    }

    #[inline]
    pub fn is_continuation(&self) -> bool {
        self.char == Self::CONTINUATION_CHAR
    }
}

impl Default for Cell {
    fn default() -> Self {
        Self {
            char: b' ' as u32,
            fg: Color::TERMINAL_DEFAULT,
            bg: Color::TERMINAL_DEFAULT,
            attrs: Attr::NONE,
        }
    }
}
