//! A native terminal-rendering core: cell buffers, text layout, a frame
//! pipeline that diffs and emits minimal ANSI, an input decoder, and the
//! renderer that ties them to a real (or in-memory, for tests) terminal.
//!
//! # Architecture
//!
//! ```text
//! Scene (arena of Renderables)
//!        │ composite()
//!        ▼
//!   CellBuffer "next"  ──diff──►  CellBuffer "current"
//!        │                              ▲
//!        │ encode (ansi)                │ swap after flush
//!        ▼                              │
//!   OutputSink ───────────────────────────
//!        ▲
//!        │ bytes
//!  stdin ─► InputDecoder ─► DecodedEvent ─► hit grid / focus dispatch
//! ```
//!
//! There is no global/static state: a [`core::Core`] is constructed once
//! by the host application and handed to a [`renderer::Renderer`], which
//! owns the frame pipeline, the scene, and the input decoder. Tests build
//! an in-process `Core` over a [`core::MockSink`] instead of a real tty.

pub mod cell;
pub mod cell_buffer;
pub mod color;
pub mod core;
pub mod error;
pub mod frame_pipeline;
pub mod geometry;
pub mod hit_grid;
pub mod input;
pub mod renderer;
pub mod scene;
pub mod text;

pub use cell::{Attr, Cell};
pub use cell_buffer::{BorderStyle, BoxSides, CellBuffer};
pub use color::Color;
pub use core::Core;
pub use error::{Error, Result};
pub use geometry::Rect;
pub use hit_grid::HitGrid;
pub use input::{DecodedEvent, Decoder, KeyEvent, MouseEvent, TerminalCapabilities};
pub use renderer::{Dispatch, Renderer, RendererConfig};
pub use scene::{NodeId, Scene};
