use std::time::Duration;

use rand::Rng;

/// Repeat interval and jitter bound shared by every watch loop.
///
/// A zero interval means the targets are checked once.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleParams {
    pub interval: Duration,
    pub jitter: Duration,
}

impl ScheduleParams {
    pub fn once() -> Self {
        Self::default()
    }

    pub fn every(interval: Duration, jitter: Duration) -> Self {
        Self { interval, jitter }
    }

    pub fn is_repeating(&self) -> bool {
        !self.interval.is_zero()
    }

    /// Delay between the start of one tick and the start of the next, in
    /// `[interval, interval + jitter)` (exactly `interval` with zero jitter).
    pub fn next_delay<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        self.interval.saturating_add(self.sample_jitter(rng))
    }

    fn sample_jitter<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let bound = u64::try_from(self.jitter.as_nanos()).unwrap_or(u64::MAX);
        if bound == 0 {
            return Duration::ZERO;
        }
        Duration::from_nanos(rng.gen_range(0..bound))
    }
}
