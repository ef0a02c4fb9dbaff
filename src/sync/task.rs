use std::time::{Duration, Instant};

/// A repeating timer driven by the caller's clock.
///
/// Dropping the task cancels it; there is nothing running in the
/// background.
#[derive(Debug, Clone)]
pub struct RepeatingTask {
    period: Duration,
    next_due: Instant,
}

impl RepeatingTask {
    /// First firing is one period after `now`.
    pub fn start(period: Duration, now: Instant) -> Self {
        Self {
            period,
            next_due: now + period,
        }
    }

    /// Returns true once per elapsed period. Missed periods are collapsed
    /// into a single firing.
    pub fn poll(&mut self, now: Instant) -> bool {
        if now < self.next_due {
            return false;
        }
        self.next_due += self.period;
        if self.next_due <= now {
            self.next_due = now + self.period;
        }
        true
    }

    pub fn next_due(&self) -> Instant {
        self.next_due
    }
}
