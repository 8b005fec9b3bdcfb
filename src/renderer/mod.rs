//! The renderer (§4.5): owns the frame pipeline, the input decoder, the
//! scene, and the terminal's lifecycle (raw mode, alternate screen,
//! capability negotiation).
//!
//! Grounded on `pipeline/terminal.rs`'s `TerminalSetup::enter_fullscreen`/
//! `exit_fullscreen` sequencing (the order setup/teardown writes escape
//! sequences in is preserved exactly, generalized to run through
//! [`crate::core::Core`]'s sink instead of a raw `stdout` write) and on
//! the old `renderer/output.rs`'s frame-timing bookkeeping, reworked
//! around [`std::time::Instant`] instead of a JS-side clock.

pub mod config;
pub mod stats;

use crate::cell_buffer::CellBuffer;
use crate::color::Color;
use crate::core::Core;
use crate::error::Result;
use crate::frame_pipeline::{ansi, FramePipeline, PipelineState};
use crate::input::{capabilities, DecodedEvent, Decoder, KeyEvent, MouseEvent, TerminalCapabilities};
use crate::scene::{NodeId, Scene};

pub use config::RendererConfig;
pub use stats::FrameStatsSnapshot;

use stats::Stats;

/// Time elapsed since compositing, handed to post-process hooks (§4.5).
pub type DeltaTime = std::time::Duration;

pub type PostProcessFn = Box<dyn FnMut(&mut CellBuffer, DeltaTime) + Send>;
/// Runs before composition each tick; returning `false` asks the renderer
/// to skip this tick's present (the "may suspend" hook of §4.5, modeled
/// here as a yes/no rather than true coroutine suspension since this
/// crate has no async runtime dependency to suspend on).
pub type FrameCallback = Box<dyn FnMut() -> bool + Send>;

/// What an incoming event resolves to after hit-testing/focus routing
/// (§4.4 Dispatch). The renderer does not own application-level handler
/// tables — a `Renderable` is only a paint contract (see `scene.rs`) — so
/// dispatch stops at "here is the node chain this event concerns" and
/// leaves invoking any handler to the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// Keyboard event routed to the focused node, innermost first, out to
    /// the root (empty chain if nothing is focused).
    Key(KeyEvent, Vec<NodeId>),
    /// Mouse event routed to the hit-tested node, innermost first, out to
    /// the root (empty chain if the hit grid has nothing at that cell).
    Mouse(MouseEvent, Vec<NodeId>),
    Resize(u16, u16),
    FocusGained,
    FocusLost,
    Paste(String),
}

pub struct Renderer {
    core: Core,
    pipeline: FramePipeline,
    scene: Scene,
    decoder: Decoder,
    capabilities: TerminalCapabilities,
    config: RendererConfig,
    running: bool,
    live_count: u32,
    dirty: bool,
    focused: Option<NodeId>,
    post_processes: Vec<(u64, PostProcessFn)>,
    next_post_process_id: u64,
    frame_callback: Option<FrameCallback>,
    stats: Stats,
}

impl Renderer {
    pub fn new(core: Core, width: u16, height: u16, config: RendererConfig) -> Self {
        Self {
            core,
            pipeline: FramePipeline::new(width, height, config.background),
            scene: Scene::new(),
            decoder: Decoder::new(),
            capabilities: TerminalCapabilities::default(),
            config,
            running: false,
            live_count: 0,
            dirty: true,
            focused: None,
            post_processes: Vec::new(),
            next_post_process_id: 0,
            frame_callback: None,
            stats: Stats::new(),
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut Scene {
        self.dirty = true;
        &mut self.scene
    }

    pub fn capabilities(&self) -> TerminalCapabilities {
        self.capabilities
    }

    pub fn config(&self) -> &RendererConfig {
        &self.config
    }

    /// Enter the terminal modes the renderer needs and query capabilities.
    /// §4.5: alt screen (if configured) → hide cursor → mouse → Kitty
    /// keyboard → focus tracking + bracketed paste → raw mode → probe.
    #[tracing::instrument(skip(self))]
    pub fn setup_terminal(&mut self) -> Result<()> {
        let mut out = Vec::new();
        if self.config.use_alternate_screen {
            ansi::enter_alt_screen(&mut out)?;
        }
        ansi::cursor_hide(&mut out)?;
        ansi::enable_mouse(&mut out)?;
        ansi::enable_kitty_keyboard(&mut out)?;
        ansi::enable_focus_reporting(&mut out)?;
        ansi::enable_bracketed_paste(&mut out)?;
        capabilities::probe(&mut out)?;

        self.core.sink.write(&out)?;
        self.core.sink.flush()?;
        self.core.raw_mode.enable()?;
        tracing::debug!(alt_screen = self.config.use_alternate_screen, "terminal setup complete");
        Ok(())
    }

    /// Reverse of [`setup_terminal`], run unconditionally (§4.5) so a
    /// renderer that errored mid-setup still restores the terminal.
    #[tracing::instrument(skip(self))]
    pub fn teardown(&mut self) -> Result<()> {
        let mut out = Vec::new();
        ansi::disable_bracketed_paste(&mut out)?;
        ansi::disable_focus_reporting(&mut out)?;
        ansi::disable_kitty_keyboard(&mut out)?;
        ansi::disable_mouse(&mut out)?;
        ansi::cursor_show(&mut out)?;
        if self.config.use_alternate_screen {
            ansi::exit_alt_screen(&mut out)?;
        }
        ansi::reset(&mut out)?;

        self.core.sink.write(&out)?;
        self.core.sink.flush()?;
        self.core.raw_mode.disable()?;
        tracing::debug!("terminal teardown complete");
        Ok(())
    }

    pub fn start(&mut self) {
        self.running = true;
    }

    pub fn pause(&mut self) {
        self.running = false;
    }

    /// Cooperative stop (§5 "Cancellation & timeouts"): drops the running
    /// flag; callers running a loop around [`tick`] are expected to check
    /// [`is_running`] and break, then call [`teardown`] themselves.
    pub fn stop(&mut self) {
        self.running = false;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_target_fps(&mut self, fps: u32) {
        self.config.target_fps = fps.max(1);
    }

    pub fn request_live(&mut self) {
        self.live_count += 1;
    }

    pub fn drop_live(&mut self) {
        self.live_count = self.live_count.saturating_sub(1);
    }

    pub fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    pub fn set_background(&mut self, color: Color) {
        self.config.background = color;
        self.pipeline.set_background(color);
        self.dirty = true;
    }

    pub fn set_cursor_position(&mut self, x: u16, y: u16) {
        self.pipeline.set_cursor_position(x, y);
    }

    pub fn set_cursor_style(&mut self, shape: ansi::CursorShape, blinking: bool) {
        self.pipeline.set_cursor_style(shape, blinking);
    }

    pub fn set_cursor_color(&mut self, color: Option<Color>) {
        self.pipeline.set_cursor_color(color);
    }

    pub fn toggle_debug_overlay(&mut self) {
        self.pipeline.toggle_debug_overlay();
    }

    pub fn configure_debug_overlay(&mut self, corner: crate::frame_pipeline::Corner) {
        self.pipeline.configure_debug_overlay(corner);
    }

    pub fn focus(&mut self, id: Option<NodeId>) {
        self.focused = id;
    }

    pub fn focused(&self) -> Option<NodeId> {
        self.focused
    }

    /// Returns an id for later removal with [`remove_post_process`].
    pub fn add_post_process(&mut self, f: PostProcessFn) -> u64 {
        let id = self.next_post_process_id;
        self.next_post_process_id += 1;
        self.post_processes.push((id, f));
        id
    }

    pub fn remove_post_process(&mut self, id: u64) {
        self.post_processes.retain(|(pid, _)| *pid != id);
    }

    pub fn clear_post_process(&mut self) {
        self.post_processes.clear();
    }

    pub fn set_frame_callback(&mut self, f: FrameCallback) {
        self.frame_callback = Some(f);
    }

    pub fn remove_frame_callback(&mut self) {
        self.frame_callback = None;
    }

    pub fn get_stats(&self) -> FrameStatsSnapshot {
        self.stats.snapshot()
    }

    pub fn dump_hit_grid(&self) -> String {
        self.pipeline.dump_hit_grid()
    }

    pub fn dump_buffers(&self, label: &str) -> (String, String) {
        let (next, current) = self.pipeline.dump_buffers();
        (format!("-- next ({label}) --\n{next}"), format!("-- current ({label}) --\n{current}"))
    }

    pub fn dump_stdout_buffer(&self, label: &str) -> Vec<u8> {
        let mut out = format!("-- stdout ({label}) --\n").into_bytes();
        out.extend_from_slice(self.pipeline.dump_stdout_buffer());
        out
    }

    /// Resize both cell buffers and the hit grid, forcing a full repaint.
    pub fn resize(&mut self, width: u16, height: u16) -> Result<()> {
        self.pipeline.resize(width, height)?;
        self.dirty = true;
        Ok(())
    }

    /// SIGWINCH (or any out-of-band size-change signal) arrives outside
    /// the input byte stream, so it is injected directly rather than
    /// routed through [`handle_input`]/the decoder.
    pub fn notify_resize(&mut self, width: u16, height: u16) -> Result<Dispatch> {
        self.resize(width, height)?;
        Ok(Dispatch::Resize(width, height))
    }

    /// Feed raw input bytes, folding capability replies into
    /// [`capabilities`] internally and resolving everything else into a
    /// [`Dispatch`] (§4.4 Dispatch).
    pub fn handle_input(&mut self, bytes: &[u8]) -> Vec<Dispatch> {
        self.decoder
            .feed(bytes)
            .into_iter()
            .filter_map(|event| self.resolve(event))
            .collect()
    }

    fn resolve(&mut self, event: DecodedEvent) -> Option<Dispatch> {
        match event {
            DecodedEvent::CapabilityReply(reply) => {
                capabilities::apply_reply(&mut self.capabilities, &reply);
                None
            }
            DecodedEvent::Key(key) => {
                let chain = self.focused.map(|id| self.scene.ancestors(id)).unwrap_or_default();
                Some(Dispatch::Key(key, chain))
            }
            DecodedEvent::Mouse(mouse) => {
                // Mouse coordinates arrive 1-indexed straight off the wire
                // (§4.4 S6); the hit grid is 0-indexed like the cell buffer.
                let hit = self.pipeline.check_hit(mouse.x.saturating_sub(1), mouse.y.saturating_sub(1));
                let chain = if hit == crate::hit_grid::NONE { Vec::new() } else { self.scene.ancestors(hit) };
                Some(Dispatch::Mouse(mouse, chain))
            }
            DecodedEvent::Resize(w, h) => {
                let _ = self.resize(w, h);
                Some(Dispatch::Resize(w, h))
            }
            DecodedEvent::FocusGained => Some(Dispatch::FocusGained),
            DecodedEvent::FocusLost => Some(Dispatch::FocusLost),
            DecodedEvent::Paste(text) => Some(Dispatch::Paste(text)),
        }
    }

    /// One cooperative tick (§5 "Cooperative single-threaded"): run the
    /// frame callback, present if live or dirty, update frame-time stats.
    /// Returns `true` if a frame was actually presented.
    pub fn tick(&mut self) -> Result<bool> {
        if !self.running {
            return Ok(false);
        }

        let started = std::time::Instant::now();

        if let Some(cb) = &mut self.frame_callback {
            if !cb() {
                return Ok(false);
            }
        }

        let should_present = self.live_count > 0 || self.dirty;
        if !should_present {
            return Ok(false);
        }

        // Composite first, then run post-process hooks on `next` while it
        // still holds this frame's painted content (§4.5: hooks receive
        // "the final next buffer" between compositing and diffing), and
        // only then diff/emit/swap. Skipped when resuming a stalled frame,
        // since `next` wasn't repainted and the hooks already ran on it.
        if self.pipeline.state() != PipelineState::Stalled {
            self.pipeline.composite(&mut self.scene);

            let overlay_text = self.stats.overlay_text();
            self.pipeline.render_debug_overlay(&overlay_text);

            let delta = started.elapsed();
            for (_, pp) in &mut self.post_processes {
                pp(self.pipeline.next_buffer_mut(), delta);
            }
        }

        let presented = self.pipeline.diff_emit_swap(&mut *self.core.sink, false)?;
        if presented {
            self.dirty = false;
            let delta = started.elapsed();
            self.stats.record(delta);
            tracing::trace!(
                frame_id = self.pipeline.frame_id(),
                bytes = self.pipeline.stats().bytes_last_frame,
                cells_changed = self.pipeline.stats().cells_changed_last_frame,
                "frame presented"
            );
        }
        Ok(presented)
    }

    /// Alias for [`tick`] matching the name spec §5 uses for the
    /// test-driving external clock ("`advance()` in tests").
    pub fn advance(&mut self) -> Result<bool> {
        self.tick()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MockSink;
    use crate::geometry::Rect;

    fn renderer() -> Renderer {
        let core = Core::new(Box::new(MockSink::new()));
        Renderer::new(core, 10, 4, RendererConfig::default())
    }

    #[test]
    fn setup_then_teardown_round_trips_raw_mode() {
        let mut r = renderer();
        r.setup_terminal().unwrap();
        r.teardown().unwrap();
        assert!(!r.core.raw_mode.is_enabled());
    }

    #[test]
    fn tick_does_nothing_when_not_running() {
        let mut r = renderer();
        assert!(!r.tick().unwrap());
    }

    #[test]
    fn tick_presents_when_dirty() {
        let mut r = renderer();
        r.start();
        r.scene_mut().insert(None, Rect::new(0, 0, 3, 1), 0, Box::new(|_, _| {}));
        assert!(r.tick().unwrap());
        assert_eq!(r.get_stats().frame_count, 1);
    }

    #[test]
    fn live_count_forces_presents_even_when_not_dirty() {
        let mut r = renderer();
        r.start();
        assert!(r.tick().unwrap());
        r.request_live();
        assert!(r.tick().unwrap());
        assert_eq!(r.get_stats().frame_count, 2);
    }

    #[test]
    fn frame_callback_returning_false_skips_tick() {
        let mut r = renderer();
        r.start();
        r.set_frame_callback(Box::new(|| false));
        assert!(!r.tick().unwrap());
        assert_eq!(r.get_stats().frame_count, 0);
    }

    /// Post-process hooks (§4.5) must see this frame's composited `next`
    /// buffer before it's diffed and emitted, so their writes actually
    /// reach the terminal instead of landing on the already-swapped,
    /// cleared buffer.
    #[test]
    fn post_process_hook_mutation_reaches_emitted_frame() {
        let mut r = renderer();
        r.start();
        r.scene_mut().insert(
            None,
            Rect::new(0, 0, 1, 1),
            0,
            Box::new(|buf, rect| {
                buf.set_cell(rect.x, rect.y, crate::cell::Cell::new('A' as u32, Color::WHITE, Color::BLACK, crate::cell::Attr::NONE));
            }),
        );
        r.add_post_process(Box::new(|buf, _delta| {
            buf.set_cell(0, 0, crate::cell::Cell::new('B' as u32, Color::WHITE, Color::BLACK, crate::cell::Attr::NONE));
        }));
        assert!(r.tick().unwrap());

        let (_, current) = r.pipeline.dump_buffers();
        assert!(current.contains('B'));
        assert!(!current.contains('A'));
    }

    #[test]
    fn mouse_dispatch_resolves_hit_chain() {
        let mut r = renderer();
        r.start();
        let root = r.scene_mut().insert(None, Rect::new(0, 0, 10, 4), 0, Box::new(|_, _| {}));
        r.tick().unwrap();

        let events = r.handle_input(b"\x1b[<0;1;1M");
        assert_eq!(events.len(), 1);
        match &events[0] {
            Dispatch::Mouse(_, chain) => assert_eq!(chain, &vec![root]),
            _ => panic!("expected mouse dispatch"),
        }
    }

    #[test]
    fn capability_reply_is_absorbed_not_surfaced() {
        let mut r = renderer();
        let events = r.handle_input(b"\x1b[?1;2c");
        assert!(events.is_empty());
        assert!(r.capabilities().rgb);
    }
}
