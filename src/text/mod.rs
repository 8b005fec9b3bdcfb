//! Text measurement and the logical/visual text buffer split: [`chunk`]
//! holds styled runs, [`buffer`] holds logical content, [`view`] holds
//! wrap/viewport/selection state and the `draw` primitive onto a cell
//! buffer.

mod ansi_strip;
mod buffer;
mod chunk;
mod truncate;
mod view;
mod width;
mod wrap;

pub use ansi_strip::strip_ansi;
pub use buffer::TextBuffer;
pub use chunk::{Chunk, Highlight, HighlightRef};
pub use truncate::truncate_text;
pub use view::TextView;
pub use width::{char_width, grapheme_width, string_width, WidthMethod};
pub use wrap::{measure_text_height, wrap_text, wrap_text_word, WrapMode};
