//! `RendererConfig` (§4.6): builder-constructed, overridable by
//! environment variables at startup — the same shape the teacher's
//! `TerminalSetup` takes as explicit constructor flags rather than
//! reading global state mid-flight, extended with the knobs spec §4.5
//! names (`target_fps`, wrap default, debug overlay corner).

use crate::color::Color;
use crate::frame_pipeline::Corner;
use crate::text::WrapMode;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseMode {
    Off,
    Click,
    Drag,
    Any,
}

#[derive(Debug, Clone)]
pub struct RendererConfig {
    pub target_fps: u32,
    pub use_alternate_screen: bool,
    pub mouse_mode: MouseMode,
    pub wrap_default: WrapMode,
    pub debug_overlay_corner: Corner,
    pub background: Color,
}

impl Default for RendererConfig {
    fn default() -> Self {
        Self {
            target_fps: 30,
            use_alternate_screen: true,
            mouse_mode: MouseMode::Click,
            wrap_default: WrapMode::Word,
            debug_overlay_corner: Corner::TopRight,
            background: Color::TERMINAL_DEFAULT,
        }
    }
}

pub struct RendererConfigBuilder {
    config: RendererConfig,
}

impl RendererConfigBuilder {
    pub fn new() -> Self {
        Self { config: RendererConfig::default() }
    }

    pub fn target_fps(mut self, fps: u32) -> Self {
        self.config.target_fps = fps.max(1);
        self
    }

    pub fn use_alternate_screen(mut self, enabled: bool) -> Self {
        self.config.use_alternate_screen = enabled;
        self
    }

    pub fn mouse_mode(mut self, mode: MouseMode) -> Self {
        self.config.mouse_mode = mode;
        self
    }

    pub fn wrap_default(mut self, mode: WrapMode) -> Self {
        self.config.wrap_default = mode;
        self
    }

    pub fn debug_overlay_corner(mut self, corner: Corner) -> Self {
        self.config.debug_overlay_corner = corner;
        self
    }

    pub fn background(mut self, color: Color) -> Self {
        self.config.background = color;
        self
    }

    /// Apply `OTUI_TARGET_FPS` / `OTUI_ALT_SCREEN` overrides (§6), mirroring
    /// how `OTUI_DEBUG_FFI`/`OTUI_TRACE_FFI` gate logging rather than a
    /// bespoke config flag.
    pub fn apply_env(mut self) -> Self {
        if let Ok(fps) = std::env::var("OTUI_TARGET_FPS") {
            if let Ok(fps) = fps.parse() {
                self.config.target_fps = fps;
            }
        }
        if let Ok(flag) = std::env::var("OTUI_ALT_SCREEN") {
            self.config.use_alternate_screen = flag != "0";
        }
        self
    }

    pub fn build(self) -> RendererConfig {
        self.config
    }
}

impl Default for RendererConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_overrides_defaults() {
        let config = RendererConfigBuilder::new().target_fps(60).use_alternate_screen(false).build();
        assert_eq!(config.target_fps, 60);
        assert!(!config.use_alternate_screen);
    }

    #[test]
    fn zero_fps_clamps_to_one() {
        let config = RendererConfigBuilder::new().target_fps(0).build();
        assert_eq!(config.target_fps, 1);
    }
}
