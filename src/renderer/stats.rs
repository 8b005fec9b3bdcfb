//! Frame-timing bookkeeping for [`super::Renderer::get_stats`] (§4.5).
//!
//! Grounded on the old `renderer/output.rs`'s rolling frame-time window,
//! reworked around [`std::time::Instant`]/[`std::time::Duration`] instead
//! of a host-supplied clock.

use std::collections::VecDeque;
use std::time::Duration;

const WINDOW: usize = 120;

pub struct Stats {
    frame_count: u64,
    frame_times: VecDeque<Duration>,
}

impl Stats {
    pub fn new() -> Self {
        Self { frame_count: 0, frame_times: VecDeque::with_capacity(WINDOW) }
    }

    pub fn record(&mut self, delta: Duration) {
        self.frame_count += 1;
        if self.frame_times.len() == WINDOW {
            self.frame_times.pop_front();
        }
        self.frame_times.push_back(delta);
    }

    pub fn overlay_text(&self) -> String {
        let snapshot = self.snapshot();
        format!("{:.0}fps {}", snapshot.fps, snapshot.frame_count)
    }

    pub fn snapshot(&self) -> FrameStatsSnapshot {
        if self.frame_times.is_empty() {
            return FrameStatsSnapshot {
                fps: 0.0,
                frame_count: self.frame_count,
                frame_times_ms: Vec::new(),
                avg_ms: 0.0,
                min_ms: 0.0,
                max_ms: 0.0,
            };
        }

        let frame_times_ms: Vec<f64> = self.frame_times.iter().map(|d| d.as_secs_f64() * 1000.0).collect();
        let total: f64 = frame_times_ms.iter().sum();
        let avg_ms = total / frame_times_ms.len() as f64;
        let min_ms = frame_times_ms.iter().cloned().fold(f64::INFINITY, f64::min);
        let max_ms = frame_times_ms.iter().cloned().fold(0.0, f64::max);
        let fps = if avg_ms > 0.0 { 1000.0 / avg_ms } else { 0.0 };

        FrameStatsSnapshot { fps, frame_count: self.frame_count, frame_times_ms, avg_ms, min_ms, max_ms }
    }
}

impl Default for Stats {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct FrameStatsSnapshot {
    pub fps: f64,
    pub frame_count: u64,
    pub frame_times_ms: Vec<f64>,
    pub avg_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_stats_report_zero() {
        let stats = Stats::new();
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.frame_count, 0);
        assert_eq!(snapshot.fps, 0.0);
    }

    #[test]
    fn records_accumulate_and_window_caps() {
        let mut stats = Stats::new();
        for _ in 0..200 {
            stats.record(Duration::from_millis(16));
        }
        let snapshot = stats.snapshot();
        assert_eq!(snapshot.frame_count, 200);
        assert_eq!(snapshot.frame_times_ms.len(), WINDOW);
        assert!((snapshot.avg_ms - 16.0).abs() < 0.5);
        assert!(snapshot.fps > 50.0 && snapshot.fps < 70.0);
    }
}
