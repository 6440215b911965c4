use std::time::{Duration, Instant};

#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoopMetricsSnapshot {
    pub fps: f32,
    pub tps: f32,
    pub frame_time_ms: f32,
    /// Ticks whose work took longer than the tick period (each one slips the schedule).
    pub slipped_ticks: u32,
}

impl LoopMetricsSnapshot {
    pub fn title_suffix(&self) -> String {
        format!("{:.0} fps | {:.0} tps", self.fps, self.tps)
    }
}

/// Counts gathered since the last snapshot.
#[derive(Debug, Default)]
struct WindowCounts {
    frames: u32,
    ticks: u32,
    slipped_ticks: u32,
    frame_time: Duration,
}

impl WindowCounts {
    fn into_snapshot(self, elapsed: Duration) -> LoopMetricsSnapshot {
        let seconds = elapsed.as_secs_f32().max(f32::EPSILON);
        let frame_time_ms = match self.frames {
            0 => 0.0,
            frames => self.frame_time.as_secs_f32() * 1000.0 / frames as f32,
        };
        LoopMetricsSnapshot {
            fps: self.frames as f32 / seconds,
            tps: self.ticks as f32 / seconds,
            frame_time_ms,
            slipped_ticks: self.slipped_ticks,
        }
    }
}

#[derive(Debug)]
pub(crate) struct MetricsAccumulator {
    window_start: Instant,
    window: Duration,
    counts: WindowCounts,
}

impl MetricsAccumulator {
    pub(crate) fn new(window: Duration, start: Instant) -> Self {
        Self {
            window_start: start,
            window,
            counts: WindowCounts::default(),
        }
    }

    pub(crate) fn record_frame(&mut self, frame_dt: Duration) {
        let counts = &mut self.counts;
        counts.frames = counts.frames.saturating_add(1);
        counts.frame_time = counts.frame_time.saturating_add(frame_dt);
    }

    pub(crate) fn record_tick(&mut self, work: Duration, period: Duration) {
        let counts = &mut self.counts;
        counts.ticks = counts.ticks.saturating_add(1);
        if work > period {
            counts.slipped_ticks = counts.slipped_ticks.saturating_add(1);
        }
    }

    /// Emits once per window and starts the next one at `now`.
    pub(crate) fn maybe_snapshot(&mut self, now: Instant) -> Option<LoopMetricsSnapshot> {
        let elapsed = now.saturating_duration_since(self.window_start);
        if elapsed < self.window {
            return None;
        }
        self.window_start = now;
        Some(std::mem::take(&mut self.counts).into_snapshot(elapsed))
    }
}
