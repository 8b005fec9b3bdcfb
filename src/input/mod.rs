//! Input decoding (§4.4): raw terminal bytes in, structured
//! [`events::DecodedEvent`]s out.
//!
//! ```text
//! stdin bytes → Decoder → DecodedEvent::{Key, Mouse, Paste, ...}
//!                              │
//!                  dispatch against the scene's hit grid
//! ```

pub mod capabilities;
pub mod decoder;
pub mod events;

pub use capabilities::{probe as probe_capabilities, TerminalCapabilities, UnicodeCapability};
pub use decoder::Decoder;
pub use events::{
    DecodedEvent, KeyEvent, KeyState, MouseButton, MouseEvent, MouseEventType, Modifiers,
};
