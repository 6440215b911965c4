use std::time::{Duration, Instant};

/// Fixed-period tick source.
///
/// At most one tick fires per [`TickScheduler::poll`]. The next deadline is
/// measured from the moment the tick fired, so a tick that runs long pushes
/// every later tick back instead of queueing catch-up ticks.
#[derive(Debug, Clone)]
pub struct TickScheduler {
    period: Duration,
    next_due: Instant,
    cancelled: bool,
}

impl TickScheduler {
    pub fn new(period: Duration, start: Instant) -> Self {
        Self {
            period: normalize_period(period),
            next_due: start + normalize_period(period),
            cancelled: false,
        }
    }

    pub fn from_rate(ticks_per_second: u32, start: Instant) -> Self {
        Self::new(period_for_rate(ticks_per_second), start)
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Next due instant, or `None` once cancelled.
    pub fn deadline(&self) -> Option<Instant> {
        (!self.cancelled).then_some(self.next_due)
    }

    pub fn poll(&mut self, now: Instant) -> bool {
        if self.cancelled || now < self.next_due {
            return false;
        }
        self.next_due = now + self.period;
        true
    }

    /// Re-arms after a tick whose work finished at `finished_at`.
    pub fn rearm_after(&mut self, finished_at: Instant) {
        if self.cancelled {
            return;
        }
        self.next_due = self.next_due.max(finished_at + self.period);
    }

    pub fn cancel(&mut self) {
        self.cancelled = true;
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled
    }
}

pub fn period_for_rate(ticks_per_second: u32) -> Duration {
    Duration::from_secs_f64(1.0 / f64::from(ticks_per_second.max(1)))
}

fn normalize_period(period: Duration) -> Duration {
    if period.is_zero() {
        Duration::from_millis(1)
    } else {
        period
    }
}
