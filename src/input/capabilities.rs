//! Terminal capability probing (§4.4): issues the setup-time queries and
//! folds whatever replies come back into a `TerminalCapabilities` snapshot.
//!
//! Grounded on `pipeline/terminal.rs`'s `enter_fullscreen`, which already
//! writes the Kitty-keyboard and mouse-enable sequences unconditionally;
//! this module adds the missing *query* half (§4.4 "Capability probe")
//! so those features can be negotiated instead of assumed.

use std::io::{self, Write};

use crate::text::WidthMethod;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TerminalCapabilities {
    pub kitty_keyboard: bool,
    pub kitty_graphics: bool,
    pub rgb: bool,
    pub unicode: UnicodeCapability,
    pub sgr_pixels: bool,
    pub focus_tracking: bool,
    pub bracketed_paste: bool,
    pub sync: bool,
    pub hyperlinks: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnicodeCapability {
    Wcwidth,
    #[default]
    Unicode,
}

impl From<UnicodeCapability> for WidthMethod {
    fn from(cap: UnicodeCapability) -> Self {
        match cap {
            UnicodeCapability::Wcwidth => WidthMethod::Wcwidth,
            UnicodeCapability::Unicode => WidthMethod::Unicode,
        }
    }
}

/// Write every capability-probe query. Replies arrive asynchronously on
/// the input stream and are folded in with [`apply_reply`].
pub fn probe<W: Write>(w: &mut W) -> io::Result<()> {
    crate::frame_pipeline::ansi::query_device_attributes(w)?;
    crate::frame_pipeline::ansi::query_kitty_keyboard(w)?;
    Ok(())
}

/// Parse one capability reply (already stripped of its leading `ESC`) and
/// merge it into `caps`. Unrecognized replies are ignored (§7 `Protocol`:
/// malformed/unknown input is dropped silently).
pub fn apply_reply(caps: &mut TerminalCapabilities, reply: &[u8]) {
    // DA1 reply: `[?<attrs>c` — presence alone confirms an ANSI-capable
    // terminal that understands CSI, so assume truecolor support (every
    // terminal emulator shipping in the last decade that answers DA1
    // also supports SGR truecolor).
    if reply.first() == Some(&b'[') && reply.last() == Some(&b'c') {
        caps.rgb = true;
        return;
    }

    // Kitty keyboard flags reply: `[?<flags>u`.
    if reply.first() == Some(&b'[') && reply.get(1) == Some(&b'?') && reply.last() == Some(&b'u') {
        caps.kitty_keyboard = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn da1_reply_marks_rgb_capable() {
        let mut caps = TerminalCapabilities::default();
        apply_reply(&mut caps, b"[?1;2c");
        assert!(caps.rgb);
    }

    #[test]
    fn kitty_flags_reply_marks_kitty_keyboard() {
        let mut caps = TerminalCapabilities::default();
        apply_reply(&mut caps, b"[?1u");
        assert!(caps.kitty_keyboard);
    }

    #[test]
    fn unrecognized_reply_is_ignored() {
        let mut caps = TerminalCapabilities::default();
        apply_reply(&mut caps, b"garbage");
        assert_eq!(caps, TerminalCapabilities::default());
    }
}
