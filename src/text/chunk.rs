//! Styled runs of text ([`Chunk`]) and the highlight overlay ([`Highlight`]).

use crate::cell::Attr;
use crate::color::Color;

/// A run of text carrying its own style. Any field left `None` falls back
/// to the owning [`TextBuffer`](super::TextBuffer)'s default.
#[derive(Debug, Clone)]
pub struct Chunk {
    pub text: String,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub attr: Option<Attr>,
}

impl Chunk {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into(), fg: None, bg: None, attr: None }
    }

    pub fn with_style(text: impl Into<String>, fg: Option<Color>, bg: Option<Color>, attr: Option<Attr>) -> Self {
        Self { text: text.into(), fg, bg, attr }
    }
}

/// Handle returned by a highlight-adding call, used to remove it later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HighlightRef(pub(crate) u64);

/// A style overlay applied over a character or line/column range, in
/// ascending priority order (higher priority wins; ties go to the later
/// insertion).
#[derive(Debug, Clone)]
pub struct Highlight {
    pub id: HighlightRef,
    pub range: HighlightRange,
    pub fg: Option<Color>,
    pub bg: Option<Color>,
    pub attr: Option<Attr>,
    pub priority: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HighlightRange {
    Chars { start: usize, end: usize },
    LineCols { line: usize, col_start: usize, col_end: usize },
}
