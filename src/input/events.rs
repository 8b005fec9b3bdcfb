//! The structured events the decoder emits (§4.4) and the modifier
//! bitflags shared by keyboard and mouse parsing.
//!
//! Grounded on the teacher's `input/parser.rs` `KeyEvent`/`MouseEvent`
//! pair, regrouped to match spec §4.4's field names exactly (`name`,
//! `sequence`, `shift`, `ctrl`, `meta`, `code_point`) instead of the
//! teacher's `KeyCode` enum + `Modifier` bitflags.

bitflags::bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct Modifiers: u8 {
        const NONE  = 0;
        const SHIFT = 1 << 0;
        const META  = 1 << 1;
        const CTRL  = 1 << 2;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyState {
    Press,
    Repeat,
    Release,
}

/// A decoded keyboard event (§4.4).
#[derive(Debug, Clone, PartialEq)]
pub struct KeyEvent {
    /// Canonical name: `"a"`, `"up"`, `"enter"`, `"f5"`, ...
    pub name: String,
    /// The raw escape sequence (or single byte/char) this event was
    /// decoded from, for callers that want to log or re-synthesize input.
    pub sequence: String,
    pub shift: bool,
    pub ctrl: bool,
    pub meta: bool,
    pub code_point: Option<u32>,
    pub state: KeyState,
}

impl KeyEvent {
    pub fn new(name: impl Into<String>, sequence: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            name: name.into(),
            sequence: sequence.into(),
            shift: modifiers.contains(Modifiers::SHIFT),
            ctrl: modifiers.contains(Modifiers::CTRL),
            meta: modifiers.contains(Modifiers::META),
            code_point: None,
            state: KeyState::Press,
        }
    }

    pub fn with_code_point(mut self, cp: u32) -> Self {
        self.code_point = Some(cp);
        self
    }

    pub fn with_state(mut self, state: KeyState) -> Self {
        self.state = state;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseEventType {
    Down,
    Up,
    Move,
    Drag,
    Scroll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
    None,
}

/// A decoded mouse event (§4.4).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MouseEvent {
    pub event_type: MouseEventType,
    pub button: MouseButton,
    pub x: u16,
    pub y: u16,
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Positive = scroll up, negative = scroll down. Only set for `Scroll`.
    pub scroll_delta: Option<i8>,
}

/// Everything the decoder can produce from one parse step.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedEvent {
    Key(KeyEvent),
    Mouse(MouseEvent),
    Resize(u16, u16),
    FocusGained,
    FocusLost,
    Paste(String),
    /// Raw bytes of a capability reply (DA1, Kitty flags, color query)
    /// not yet folded into a [`super::capabilities::TerminalCapabilities`].
    CapabilityReply(Vec<u8>),
}
