//! `Core`: the explicit, constructed-once handle that replaces the
//! teacher's process-wide singleton (a lazily-initialized native library
//! handle reached through a `static OnceLock`, see the old `lib.rs`).
//!
//! Per spec §9 ("replacing global singletons"): a `Core` is built at
//! startup and passed into the [`crate::renderer::Renderer`]; tests build
//! an in-process `Core` over a [`MockSink`] instead of touching a real
//! terminal. It owns exactly two platform-facing concerns: the output
//! sink (§4.5 "output strategies") and raw-mode terminal state
//! (grounded on `pipeline/terminal.rs`'s `TerminalSetup::enable_raw_mode`,
//! generalized away from that file's `static mut ORIGINAL_TERMIOS`).

use std::io::{self, Write};

use crate::error::Result;

/// The output strategy contract (§4.5). A sink reports whether a write was
/// accepted immediately; `false` means the frame pipeline must enter
/// `Stalled` (§4.3 backpressure) until a subsequent `notify_drained`.
pub trait OutputSink: Send {
    /// Write `bytes`. Returns `true` if accepted immediately, `false` if
    /// the sink is backpressured (the bytes may or may not have been
    /// buffered internally — the pipeline does not retry them itself;
    /// the caller is expected to hold the same segment and resend after
    /// drain, which in practice means `present()` recomputes the diff
    /// against the still-current buffer on the next call).
    fn write(&mut self, bytes: &[u8]) -> Result<bool>;

    /// Whether a write right now would be accepted.
    fn can_write(&self) -> bool;

    fn flush(&mut self) -> Result<()>;
}

/// *Native* strategy: writes straight to a real `Write` sink (stdout).
/// Always immediately accepted — there is no drain protocol for a
/// directly-owned OS file descriptor.
pub struct NativeSink<W: Write + Send> {
    out: W,
}

impl<W: Write + Send> NativeSink<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }
}

impl NativeSink<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write + Send> OutputSink for NativeSink<W> {
    fn write(&mut self, bytes: &[u8]) -> Result<bool> {
        self.out.write_all(bytes)?;
        Ok(true)
    }

    fn can_write(&self) -> bool {
        true
    }

    fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }
}

/// *Javascript-like* strategy: hands bytes to a user-provided writable
/// sink that reports backpressure explicitly, instead of writing straight
/// through. Models a host environment (e.g. a JS `Writable` stream) whose
/// internal buffer can report "not drained".
pub struct ChannelSink {
    drained: bool,
    pending: Vec<u8>,
    on_write: Box<dyn FnMut(&[u8]) -> bool + Send>,
}

impl ChannelSink {
    /// `on_write` is called with each accepted write and returns whether
    /// the sink is still drained (ready for more) after accepting it.
    pub fn new(on_write: impl FnMut(&[u8]) -> bool + Send + 'static) -> Self {
        Self { drained: true, pending: Vec::new(), on_write: Box::new(on_write) }
    }

    /// Called by the host once its buffer has drained, resuming output.
    pub fn notify_drained(&mut self) {
        self.drained = true;
    }
}

impl OutputSink for ChannelSink {
    fn write(&mut self, bytes: &[u8]) -> Result<bool> {
        if !self.drained {
            return Ok(false);
        }
        self.pending.extend_from_slice(bytes);
        self.drained = (self.on_write)(bytes);
        Ok(self.drained)
    }

    fn can_write(&self) -> bool {
        self.drained
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Records every accepted write, with an externally-settable backpressure
/// switch. Used by tests (S8, and frame-pipeline unit tests) that need a
/// controllable sink without a real terminal.
pub struct MockSink {
    pub buffer: Vec<u8>,
    pub accept: bool,
    writes: usize,
}

impl MockSink {
    pub fn new() -> Self {
        Self { buffer: Vec::new(), accept: true, writes: 0 }
    }

    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn take(&mut self) -> Vec<u8> {
        std::mem::take(&mut self.buffer)
    }
}

impl Default for MockSink {
    fn default() -> Self {
        Self::new()
    }
}

impl OutputSink for MockSink {
    fn write(&mut self, bytes: &[u8]) -> Result<bool> {
        if !self.accept {
            return Ok(false);
        }
        self.buffer.extend_from_slice(bytes);
        self.writes += 1;
        Ok(true)
    }

    fn can_write(&self) -> bool {
        self.accept
    }

    fn flush(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Raw-mode terminal state. On unix, saves the original `termios` so it
/// can be restored exactly; on other platforms this is a no-op (§1
/// Non-goals: non-ANSI terminals are out of scope, but we still compile
/// everywhere the library does).
pub struct RawMode {
    #[cfg(unix)]
    original: Option<libc::termios>,
    enabled: bool,
}

impl RawMode {
    pub fn new() -> Self {
        Self {
            #[cfg(unix)]
            original: None,
            enabled: false,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    #[cfg(unix)]
    pub fn enable(&mut self) -> Result<()> {
        use std::os::unix::io::AsRawFd;
        let fd = io::stdin().as_raw_fd();
        if unsafe { libc::isatty(fd) } == 0 {
            return Ok(());
        }
        unsafe {
            let mut termios: libc::termios = std::mem::zeroed();
            if libc::tcgetattr(fd, &mut termios) != 0 {
                return Err(io::Error::last_os_error().into());
            }
            self.original = Some(termios);

            termios.c_iflag &= !(libc::IGNBRK
                | libc::BRKINT
                | libc::PARMRK
                | libc::ISTRIP
                | libc::INLCR
                | libc::IGNCR
                | libc::ICRNL
                | libc::IXON);
            termios.c_oflag &= !libc::OPOST;
            termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
            termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
            termios.c_cflag |= libc::CS8;
            termios.c_cc[libc::VMIN] = 1;
            termios.c_cc[libc::VTIME] = 0;

            if libc::tcsetattr(fd, libc::TCSAFLUSH, &termios) != 0 {
                return Err(io::Error::last_os_error().into());
            }
        }
        self.enabled = true;
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn enable(&mut self) -> Result<()> {
        self.enabled = true;
        Ok(())
    }

    #[cfg(unix)]
    pub fn disable(&mut self) -> Result<()> {
        use std::os::unix::io::AsRawFd;
        if let Some(original) = self.original.take() {
            let fd = io::stdin().as_raw_fd();
            unsafe {
                if libc::tcsetattr(fd, libc::TCSAFLUSH, &original) != 0 {
                    return Err(io::Error::last_os_error().into());
                }
            }
        }
        self.enabled = false;
        Ok(())
    }

    #[cfg(not(unix))]
    pub fn disable(&mut self) -> Result<()> {
        self.enabled = false;
        Ok(())
    }
}

impl Default for RawMode {
    fn default() -> Self {
        Self::new()
    }
}

/// Query the terminal's current size in columns/rows via `TIOCGWINSZ`.
/// Falls back to `80x24` when not attached to a tty (tests, piped output).
#[cfg(unix)]
pub fn terminal_size() -> (u16, u16) {
    use std::os::unix::io::AsRawFd;
    #[repr(C)]
    struct WinSize {
        ws_row: libc::c_ushort,
        ws_col: libc::c_ushort,
        ws_xpixel: libc::c_ushort,
        ws_ypixel: libc::c_ushort,
    }
    let fd = io::stdout().as_raw_fd();
    let mut size = WinSize { ws_row: 0, ws_col: 0, ws_xpixel: 0, ws_ypixel: 0 };
    let rc = unsafe { libc::ioctl(fd, libc::TIOCGWINSZ, &mut size as *mut WinSize) };
    if rc == 0 && size.ws_col > 0 && size.ws_row > 0 {
        (size.ws_col, size.ws_row)
    } else {
        (80, 24)
    }
}

#[cfg(not(unix))]
pub fn terminal_size() -> (u16, u16) {
    (80, 24)
}

/// The constructed-once core passed into the renderer: output strategy +
/// raw-mode ownership. Not `Clone` — there is exactly one per renderer.
pub struct Core {
    pub sink: Box<dyn OutputSink>,
    pub raw_mode: RawMode,
}

impl Core {
    pub fn new(sink: Box<dyn OutputSink>) -> Self {
        Self { sink, raw_mode: RawMode::new() }
    }

    pub fn native() -> Self {
        Self::new(Box::new(NativeSink::stdout()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mock_sink_backpressure() {
        let mut sink = MockSink::new();
        assert!(sink.write(b"hello").unwrap());
        sink.accept = false;
        assert!(!sink.write(b"world").unwrap());
        assert_eq!(sink.buffer, b"hello");
        sink.accept = true;
        assert!(sink.write(b"world").unwrap());
        assert_eq!(sink.buffer, b"helloworld");
    }

    #[test]
    fn channel_sink_drains() {
        let mut sink = ChannelSink::new(|_| false);
        assert!(!sink.write(b"a").unwrap());
        assert!(!sink.can_write());
        sink.notify_drained();
        assert!(sink.can_write());
    }
}
