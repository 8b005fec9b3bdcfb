//! Raw ANSI escape sequence writers used by the emit step (§4.3) and by
//! the renderer's terminal setup/teardown (§4.5). Every function writes
//! directly to a `Write` sink and returns `io::Result<()>` so callers can
//! batch several into one buffered write before a single flush.

use std::io::{self, Write};

use crate::cell::Attr;
use crate::color::Color;

#[inline]
pub fn cursor_to<W: Write>(w: &mut W, x: u16, y: u16) -> io::Result<()> {
    write!(w, "\x1b[{};{}H", y + 1, x + 1)
}

#[inline]
pub fn cursor_up<W: Write>(w: &mut W, n: u16) -> io::Result<()> {
    if n > 0 {
        write!(w, "\x1b[{}A", n)
    } else {
        Ok(())
    }
}

#[inline]
pub fn cursor_down<W: Write>(w: &mut W, n: u16) -> io::Result<()> {
    if n > 0 {
        write!(w, "\x1b[{}B", n)
    } else {
        Ok(())
    }
}

#[inline]
pub fn cursor_forward<W: Write>(w: &mut W, n: u16) -> io::Result<()> {
    if n > 0 {
        write!(w, "\x1b[{}C", n)
    } else {
        Ok(())
    }
}

#[inline]
pub fn cursor_backward<W: Write>(w: &mut W, n: u16) -> io::Result<()> {
    if n > 0 {
        write!(w, "\x1b[{}D", n)
    } else {
        Ok(())
    }
}

#[inline]
pub fn cursor_save<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b7")
}

#[inline]
pub fn cursor_restore<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b8")
}

#[inline]
pub fn cursor_hide<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?25l")
}

#[inline]
pub fn cursor_show<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?25h")
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorShape {
    Block,
    Underline,
    Bar,
}

#[inline]
pub fn cursor_shape<W: Write>(w: &mut W, shape: CursorShape, blinking: bool) -> io::Result<()> {
    let n = match (shape, blinking) {
        (CursorShape::Block, true) => 1,
        (CursorShape::Block, false) => 2,
        (CursorShape::Underline, true) => 3,
        (CursorShape::Underline, false) => 4,
        (CursorShape::Bar, true) => 5,
        (CursorShape::Bar, false) => 6,
    };
    write!(w, "\x1b[{} q", n)
}

#[inline]
pub fn erase_line<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[2K")
}

#[inline]
pub fn erase_screen<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[2J")
}

#[inline]
pub fn clear_screen<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[2J\x1b[3J\x1b[H")
}

/// Erase `count` lines upward from the cursor, used for resetting inline
/// (non-alt-screen) mode before a fresh render.
pub fn erase_lines<W: Write>(w: &mut W, count: u16) -> io::Result<()> {
    for _ in 0..count {
        erase_line(w)?;
        cursor_up(w, 1)?;
    }
    erase_line(w)?;
    write!(w, "\x1b[G")
}

#[inline]
pub fn enter_alt_screen<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?1049h")
}

#[inline]
pub fn exit_alt_screen<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?1049l")
}

#[inline]
pub fn begin_sync<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?2026h")
}

#[inline]
pub fn end_sync<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?2026l")
}

#[inline]
pub fn reset<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[0m")
}

/// Set the foreground color: `39` reset for [`Color::TERMINAL_DEFAULT`],
/// otherwise truecolor `38;2;r;g;b`.
#[inline]
pub fn fg<W: Write>(w: &mut W, color: Color) -> io::Result<()> {
    if color.is_terminal_default() {
        write!(w, "\x1b[39m")
    } else {
        let (r, g, b, _) = color.to_rgba8();
        write!(w, "\x1b[38;2;{};{};{}m", r, g, b)
    }
}

/// Set the background color: `49` reset for [`Color::TERMINAL_DEFAULT`],
/// otherwise truecolor `48;2;r;g;b`.
#[inline]
pub fn bg<W: Write>(w: &mut W, color: Color) -> io::Result<()> {
    if color.is_terminal_default() {
        write!(w, "\x1b[49m")
    } else {
        let (r, g, b, _) = color.to_rgba8();
        write!(w, "\x1b[48;2;{};{};{}m", r, g, b)
    }
}

/// Set text attributes from bitflags, one `CSI ... m` for all set bits.
#[allow(unused_assignments)]
pub fn attrs<W: Write>(w: &mut W, attr: Attr) -> io::Result<()> {
    if attr.is_empty() {
        return Ok(());
    }

    let mut first = true;
    write!(w, "\x1b[")?;

    macro_rules! emit {
        ($flag:expr, $code:expr) => {
            if attr.contains($flag) {
                if !first {
                    write!(w, ";")?;
                }
                write!(w, "{}", $code)?;
                first = false;
            }
        };
    }

    emit!(Attr::BOLD, 1);
    emit!(Attr::DIM, 2);
    emit!(Attr::ITALIC, 3);
    emit!(Attr::UNDERLINE, 4);
    emit!(Attr::BLINK, 5);
    emit!(Attr::INVERSE, 7);
    emit!(Attr::HIDDEN, 8);
    emit!(Attr::STRIKETHROUGH, 9);

    write!(w, "m")
}

#[inline]
pub fn enable_mouse<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?1000h\x1b[?1002h\x1b[?1003h\x1b[?1006h")
}

#[inline]
pub fn disable_mouse<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?1006l\x1b[?1003l\x1b[?1002l\x1b[?1000l")
}

#[inline]
pub fn enable_kitty_keyboard<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[>1u")
}

#[inline]
pub fn disable_kitty_keyboard<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[<u")
}

#[inline]
pub fn query_kitty_keyboard<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?u")
}

#[inline]
pub fn enable_bracketed_paste<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?2004h")
}

#[inline]
pub fn disable_bracketed_paste<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?2004l")
}

#[inline]
pub fn enable_focus_reporting<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?1004h")
}

#[inline]
pub fn disable_focus_reporting<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[?1004l")
}

#[inline]
pub fn set_title<W: Write>(w: &mut W, title: &str) -> io::Result<()> {
    write!(w, "\x1b]0;{}\x07", title)
}

pub fn link<W: Write>(w: &mut W, text: &str, url: &str) -> io::Result<()> {
    write!(w, "\x1b]8;;{}\x07{}\x1b]8;;\x07", url, text)
}

/// `DA1` primary device attributes query, used during capability probing.
#[inline]
pub fn query_device_attributes<W: Write>(w: &mut W) -> io::Result<()> {
    write!(w, "\x1b[c")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn to_string<F: FnOnce(&mut Vec<u8>) -> io::Result<()>>(f: F) -> String {
        let mut buf = Vec::new();
        f(&mut buf).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn cursor_to_is_one_indexed() {
        assert_eq!(to_string(|w| cursor_to(w, 0, 0)), "\x1b[1;1H");
        assert_eq!(to_string(|w| cursor_to(w, 5, 10)), "\x1b[11;6H");
    }

    #[test]
    fn fg_terminal_default_resets() {
        assert_eq!(to_string(|w| fg(w, Color::TERMINAL_DEFAULT)), "\x1b[39m");
    }

    #[test]
    fn fg_truecolor() {
        assert_eq!(to_string(|w| fg(w, Color::rgb(255, 128, 64))), "\x1b[38;2;255;128;64m");
    }

    #[test]
    fn bg_truecolor() {
        assert_eq!(to_string(|w| bg(w, Color::rgb(0, 128, 255))), "\x1b[48;2;0;128;255m");
    }

    #[test]
    fn attrs_combine_in_declared_order() {
        assert_eq!(to_string(|w| attrs(w, Attr::BOLD | Attr::UNDERLINE)), "\x1b[1;4m");
        assert_eq!(
            to_string(|w| attrs(w, Attr::BOLD | Attr::ITALIC | Attr::STRIKETHROUGH)),
            "\x1b[1;3;9m"
        );
    }

    #[test]
    fn sync_output_markers() {
        assert_eq!(to_string(begin_sync), "\x1b[?2026h");
        assert_eq!(to_string(end_sync), "\x1b[?2026l");
    }
}
