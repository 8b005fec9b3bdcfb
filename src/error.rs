//! Error taxonomy for the rendering core.
//!
//! Every fallible boundary in this crate returns one of these five kinds. The
//! pipeline and renderer treat most of them as recoverable (logged and
//! contained); only `Io` at emit time aborts the in-flight frame.

use std::fmt;

/// The crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Terminal I/O failure (read/write/stat/ioctl).
    #[error("terminal io error: {0}")]
    Io(#[from] std::io::Error),

    /// Allocation failure during a resize or a large draw.
    #[error("capacity error: failed to allocate {requested} cells for '{context}'")]
    Capacity { requested: usize, context: String },

    /// Invalid UTF-8 supplied to a text API.
    #[error("encoding error at byte offset {offset}: {detail}")]
    Encoding { offset: usize, detail: String },

    /// A malformed input byte sequence was seen by the decoder.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// Caller violated a documented precondition.
    #[error("contract violation: {0}")]
    Contract(String),
}

impl Error {
    pub fn capacity(requested: usize, context: impl Into<String>) -> Self {
        Error::Capacity { requested, context: context.into() }
    }

    pub fn encoding(offset: usize, detail: impl Into<String>) -> Self {
        Error::Encoding { offset, detail: detail.into() }
    }

    pub fn protocol(detail: impl fmt::Display) -> Self {
        Error::Protocol(detail.to_string())
    }

    pub fn contract(detail: impl fmt::Display) -> Self {
        Error::Contract(detail.to_string())
    }
}
