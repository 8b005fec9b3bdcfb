//! The frame pipeline (§4.3): owns `next`/`current`, runs the scene
//! composite step, diffs the two buffers, encodes the minimal ANSI delta,
//! and hands it to an [`OutputSink`](crate::core::OutputSink) with
//! explicit backpressure.
//!
//! Grounded on `packages/spark-tui/rust/src/renderer/ansi.rs` (the SGR
//! writers, reused verbatim via the sibling [`ansi`] module) and
//! `packages/spark-tui/rust/src/renderer/diff.rs`'s run-length diff idea,
//! generalized from that file's single flat `Vec<Cell>` buffer to this
//! crate's [`CellBuffer`] + scene composite model.

pub mod ansi;

use std::io::Write as _;

use crate::cell::Attr;
use crate::cell_buffer::CellBuffer;
use crate::color::Color;
use crate::core::OutputSink;
use crate::error::Result;
use crate::hit_grid::HitGrid;
use crate::scene::Scene;

/// The pipeline's state machine (§4.3). `Stalled` is entered from
/// `Emitting`/`Flushing` when the sink reports backpressure and exited
/// back to `Idle` once a drain is observed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineState {
    Idle,
    Painting,
    Diffing,
    Emitting,
    Flushing,
    Stalled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CursorState {
    pub x: u16,
    pub y: u16,
    pub visible: bool,
    pub shape: ansi::CursorShape,
    pub blinking: bool,
    pub color: Option<Color>,
}

impl Default for CursorState {
    fn default() -> Self {
        Self { x: 0, y: 0, visible: true, shape: ansi::CursorShape::Block, blinking: true, color: None }
    }
}

/// Frame-count/byte-count counters exposed for diagnostics; wall-clock
/// timing (fps, frame times) lives one layer up in
/// [`crate::renderer::Renderer`], which is the thing that knows about
/// real time.
#[derive(Debug, Clone, Copy, Default)]
pub struct MemoryStats {
    pub frames_presented: u64,
    pub bytes_last_frame: usize,
    pub cells_changed_last_frame: usize,
}

pub struct FramePipeline {
    next: CellBuffer,
    current: CellBuffer,
    hit_grid: HitGrid,
    background: Color,
    state: PipelineState,
    frame_id: u64,
    cursor: CursorState,
    debug_overlay: bool,
    debug_corner: Corner,
    pending_force: bool,
    pending_bytes: Option<Vec<u8>>,
    last_emitted: Vec<u8>,
    stats: MemoryStats,
}

impl FramePipeline {
    pub fn new(width: u16, height: u16, background: Color) -> Self {
        let mut next = CellBuffer::new("next", width, height);
        next.clear(background);
        let mut current = CellBuffer::new("current", width, height);
        current.clear(background);
        Self {
            next,
            current,
            hit_grid: HitGrid::new(width, height),
            background,
            state: PipelineState::Idle,
            frame_id: 0,
            cursor: CursorState::default(),
            debug_overlay: false,
            debug_corner: Corner::TopRight,
            pending_force: true, // first frame is always a full emit
            pending_bytes: None,
            last_emitted: Vec::new(),
            stats: MemoryStats::default(),
        }
    }

    pub fn state(&self) -> PipelineState {
        self.state
    }

    pub fn frame_id(&self) -> u64 {
        self.frame_id
    }

    pub fn stats(&self) -> MemoryStats {
        self.stats
    }

    pub fn next_buffer(&self) -> &CellBuffer {
        &self.next
    }

    pub fn next_buffer_mut(&mut self) -> &mut CellBuffer {
        &mut self.next
    }

    pub fn current_buffer(&self) -> &CellBuffer {
        &self.current
    }

    pub fn hit_grid(&self) -> &HitGrid {
        &self.hit_grid
    }

    pub fn check_hit(&self, x: u16, y: u16) -> u32 {
        self.hit_grid.check_hit(x, y)
    }

    pub fn set_background(&mut self, background: Color) {
        self.background = background;
    }

    pub fn cursor(&self) -> CursorState {
        self.cursor
    }

    pub fn set_cursor_position(&mut self, x: u16, y: u16) {
        self.cursor.x = x;
        self.cursor.y = y;
    }

    pub fn set_cursor_visible(&mut self, visible: bool) {
        self.cursor.visible = visible;
    }

    pub fn set_cursor_style(&mut self, shape: ansi::CursorShape, blinking: bool) {
        self.cursor.shape = shape;
        self.cursor.blinking = blinking;
    }

    pub fn set_cursor_color(&mut self, color: Option<Color>) {
        self.cursor.color = color;
    }

    pub fn toggle_debug_overlay(&mut self) {
        self.debug_overlay = !self.debug_overlay;
    }

    pub fn set_debug_overlay(&mut self, enabled: bool) {
        self.debug_overlay = enabled;
    }

    pub fn configure_debug_overlay(&mut self, corner: Corner) {
        self.debug_corner = corner;
    }

    /// `can_render()` per §4.3 backpressure: false only while `Stalled`.
    pub fn can_render(&self) -> bool {
        self.state != PipelineState::Stalled
    }

    /// Reallocate both buffers and force the next `present()` to emit the
    /// full grid rather than a diff (§4.3 Resize).
    pub fn resize(&mut self, width: u16, height: u16) -> Result<()> {
        self.next.resize(width, height, self.background)?;
        self.current.resize(width, height, self.background)?;
        self.hit_grid.resize(width, height);
        self.pending_force = true;
        Ok(())
    }

    /// Draw a one-line debug string into the configured corner of `next`,
    /// ahead of the diff step. Called by the renderer with fps text, if
    /// the overlay is enabled.
    pub fn render_debug_overlay(&mut self, text: &str) {
        if !self.debug_overlay || text.is_empty() {
            return;
        }
        let width = self.next.width();
        let height = self.next.height();
        let text_len = text.chars().count() as u16;
        let (x, y) = match self.debug_corner {
            Corner::TopLeft => (0, 0),
            Corner::TopRight => (width.saturating_sub(text_len), 0),
            Corner::BottomLeft => (0, height.saturating_sub(1)),
            Corner::BottomRight => (width.saturating_sub(text_len), height.saturating_sub(1)),
        };
        self.next.draw_text(text, x, y, Color::BLACK, Some(Color::WHITE), Attr::NONE, None);
    }

    /// Composite the scene into `next`, diff against `current`, encode and
    /// send the ANSI delta, then swap. Returns `Ok(true)` if bytes were
    /// accepted by `sink` (including the degenerate "no changes" case),
    /// `Ok(false)` if the pipeline is, or just became, `Stalled`.
    ///
    /// This is `composite()` followed immediately by `diff_emit_swap()`;
    /// callers that need to run post-process hooks on `next` in between
    /// (§4.5) call those two steps separately instead.
    pub fn present(&mut self, scene: &mut Scene, sink: &mut dyn OutputSink, force: bool) -> Result<bool> {
        if self.state == PipelineState::Stalled {
            return self.retry_flush(sink);
        }
        self.composite(scene);
        self.diff_emit_swap(sink, force)
    }

    /// The composite step alone (§4.3): walk the scene into `next` and
    /// stamp the hit grid. Leaves `next` open for post-process hooks to
    /// mutate before [`diff_emit_swap`] runs the diff/emit/swap steps.
    /// No-op if the pipeline is currently `Stalled` (a stalled frame is
    /// resumed by resending, not repainting).
    pub fn composite(&mut self, scene: &mut Scene) {
        if self.state == PipelineState::Stalled {
            return;
        }
        self.state = PipelineState::Painting;
        self.hit_grid.clear();
        scene.composite(&mut self.next, &mut self.hit_grid);
    }

    /// Diff `next` against `current`, encode and flush the ANSI delta,
    /// then swap. If the pipeline is `Stalled` from a previous call,
    /// resumes by resending the previously-encoded bytes rather than
    /// re-diffing.
    pub fn diff_emit_swap(&mut self, sink: &mut dyn OutputSink, force: bool) -> Result<bool> {
        if self.state == PipelineState::Stalled {
            return self.retry_flush(sink);
        }

        self.state = PipelineState::Diffing;
        let force = force || std::mem::take(&mut self.pending_force);
        let bytes = self.encode(force);

        self.state = PipelineState::Emitting;
        self.state = PipelineState::Flushing;
        self.flush(bytes, sink)
    }

    /// Resume a stalled frame: resend the previously-encoded bytes rather
    /// than repainting, since `next` hasn't changed since the stall.
    fn retry_flush(&mut self, sink: &mut dyn OutputSink) -> Result<bool> {
        let bytes = self.pending_bytes.take().unwrap_or_default();
        self.state = PipelineState::Flushing;
        self.flush(bytes, sink)
    }

    fn flush(&mut self, bytes: Vec<u8>, sink: &mut dyn OutputSink) -> Result<bool> {
        if !sink.write(&bytes)? {
            self.pending_bytes = Some(bytes);
            self.state = PipelineState::Stalled;
            return Ok(false);
        }
        sink.flush()?;

        self.last_emitted = bytes;
        self.stats.bytes_last_frame = self.last_emitted.len();
        self.stats.frames_presented += 1;

        std::mem::swap(&mut self.next, &mut self.current);
        self.next.clear(self.background);
        self.frame_id += 1;
        self.state = PipelineState::Idle;
        Ok(true)
    }

    /// The diff + emit steps (§4.3), combined since the diff's only
    /// purpose is deciding what the emit step writes.
    fn encode(&mut self, force: bool) -> Vec<u8> {
        let mut out = Vec::new();
        let width = self.next.width();
        let height = self.next.height();
        let mut last_style: Option<(Color, Color, Attr)> = None;
        let mut changed = 0usize;

        for y in 0..height {
            let mut x = 0u16;
            while x < width {
                let differs = force || self.next.get(x, y) != self.current.get(x, y);
                if !differs {
                    x += 1;
                    continue;
                }

                let run_start = x;
                while x < width && (force || self.next.get(x, y) != self.current.get(x, y)) {
                    changed += 1;
                    x += 1;
                }
                let run_end = x;

                ansi::cursor_to(&mut out, run_start, y).ok();
                for col in run_start..run_end {
                    let Some(cell) = self.next.get(col, y) else { continue };
                    if cell.is_continuation() {
                        continue;
                    }
                    let style = (cell.fg, cell.bg, cell.attrs);
                    if last_style != Some(style) {
                        ansi::reset(&mut out).ok();
                        ansi::fg(&mut out, cell.fg).ok();
                        ansi::bg(&mut out, cell.bg).ok();
                        ansi::attrs(&mut out, cell.attrs).ok();
                        last_style = Some(style);
                    }
                    if let Some(c) = char::from_u32(cell.char) {
                        write!(out, "{}", c).ok();
                    }
                }
            }
        }

        self.stats.cells_changed_last_frame = changed;
        self.encode_cursor(&mut out);
        out
    }

    /// Cursor control is emitted last so it lands after every cell write.
    fn encode_cursor(&self, out: &mut Vec<u8>) {
        if self.cursor.visible {
            if let Some(color) = self.cursor.color {
                let (r, g, b, _) = color.to_rgba8();
                write!(out, "\x1b]12;#{:02x}{:02x}{:02x}\x07", r, g, b).ok();
            }
            ansi::cursor_shape(out, self.cursor.shape, self.cursor.blinking).ok();
            ansi::cursor_to(out, self.cursor.x, self.cursor.y).ok();
            ansi::cursor_show(out).ok();
        } else {
            ansi::cursor_hide(out).ok();
        }
    }

    /// Serialize `next`/`current`/the hit grid as text for debugging;
    /// file naming/placement is the caller's job (the renderer knows
    /// where diagnostics belong).
    pub fn dump_buffers(&self) -> (String, String) {
        let mut next = String::new();
        self.next.write_resolved_chars(&mut next, true);
        let mut current = String::new();
        self.current.write_resolved_chars(&mut current, true);
        (next, current)
    }

    pub fn dump_stdout_buffer(&self) -> &[u8] {
        &self.last_emitted
    }

    pub fn dump_hit_grid(&self) -> String {
        let mut out = String::new();
        for y in 0..self.hit_grid.height() {
            for x in 0..self.hit_grid.width() {
                out.push_str(&format!("{:>4}", self.hit_grid.check_hit(x, y)));
            }
            out.push('\n');
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::MockSink;
    use crate::geometry::Rect;

    fn paint_hello(scene: &mut Scene, color: Color) {
        scene.insert(
            None,
            Rect::new(0, 0, 5, 1),
            0,
            Box::new(move |buf, rect| {
                buf.draw_text("HELLO", rect.x, rect.y, color, Some(Color::BLACK), Attr::NONE, None);
            }),
        );
    }

    #[test]
    fn s1_repeated_present_emits_nothing_the_second_time() {
        let mut pipeline = FramePipeline::new(5, 1, Color::BLACK);
        let mut sink = MockSink::new();
        let mut scene = Scene::new();
        paint_hello(&mut scene, Color::WHITE);

        assert!(pipeline.present(&mut scene, &mut sink, false).unwrap());
        assert!(!sink.buffer.is_empty());

        let mut scene2 = Scene::new();
        paint_hello(&mut scene2, Color::WHITE);
        sink.take();
        assert!(pipeline.present(&mut scene2, &mut sink, false).unwrap());
        assert!(sink.buffer.is_empty());
    }

    #[test]
    fn s9_backpressure_blocks_swap_and_bytes() {
        let mut pipeline = FramePipeline::new(5, 1, Color::BLACK);
        let mut sink = MockSink::new();
        sink.accept = false;
        let mut scene = Scene::new();
        paint_hello(&mut scene, Color::WHITE);

        let ok = pipeline.present(&mut scene, &mut sink, false).unwrap();
        assert!(!ok);
        assert!(!pipeline.can_render());
        assert!(sink.buffer.is_empty());
        assert_eq!(pipeline.frame_id(), 0);
    }

    #[test]
    fn s8_drain_then_present_resumes() {
        let mut pipeline = FramePipeline::new(5, 1, Color::BLACK);
        let mut sink = MockSink::new();
        sink.accept = false;
        let mut scene = Scene::new();
        paint_hello(&mut scene, Color::WHITE);
        assert!(!pipeline.present(&mut scene, &mut sink, false).unwrap());

        sink.accept = true;
        assert!(pipeline.present(&mut scene, &mut sink, false).unwrap());
        assert!(pipeline.can_render());
        assert!(!sink.buffer.is_empty());
        assert_eq!(pipeline.frame_id(), 1);
    }

    #[test]
    fn force_present_emits_full_grid_even_when_unchanged() {
        let mut pipeline = FramePipeline::new(3, 1, Color::BLACK);
        let mut sink = MockSink::new();
        let mut scene = Scene::new();

        assert!(pipeline.present(&mut scene, &mut sink, false).unwrap());
        sink.take();
        assert!(pipeline.present(&mut scene, &mut sink, true).unwrap());
        assert!(!sink.buffer.is_empty());
    }

    #[test]
    fn hit_grid_reflects_composited_scene() {
        let mut pipeline = FramePipeline::new(10, 10, Color::BLACK);
        let mut sink = MockSink::new();
        let mut scene = Scene::new();
        scene.insert(None, Rect::new(2, 2, 3, 2), 0, Box::new(|_, _| {}));

        pipeline.present(&mut scene, &mut sink, false).unwrap();
        assert_eq!(pipeline.check_hit(2, 2), 1);
        assert_eq!(pipeline.check_hit(0, 0), 0);
    }
}
