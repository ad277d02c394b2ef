//! Hybrid strategy: sleep through most of the wait, spin through the part
//! the OS might overshoot.

use std::time::{Duration, Instant};

use crate::busy_wait::spin_until;
use crate::clock::{Clock, MonotonicClock};
use crate::sleep::sleep_until;
use crate::timer::{TickTimer, WaitPolicy};

/// Worst-case scheduling delay used when none is configured, in µs.
pub const DEFAULT_WORST_CASE_DELAY_US: u64 = 100;

/// Sleep until `worst_case_delay` before the deadline, then spin.
///
/// When less than `worst_case_delay` remains the whole wait is spent
/// spinning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorstCase {
    worst_case_delay: Duration,
}

impl WorstCase {
    /// Policy for an expected worst-case OS wake-up delay in microseconds.
    #[must_use]
    pub fn new(worst_case_delay_us: u64) -> Self {
        Self {
            worst_case_delay: Duration::from_micros(worst_case_delay_us),
        }
    }

    /// The configured worst-case delay.
    #[must_use]
    pub fn worst_case_delay(&self) -> Duration {
        self.worst_case_delay
    }
}

impl Default for WorstCase {
    fn default() -> Self {
        Self::new(DEFAULT_WORST_CASE_DELAY_US)
    }
}

impl WaitPolicy for WorstCase {
    const NAME: &'static str = "WorstCaseTimer";

    fn wait_until<C: Clock>(&self, clock: &C, deadline: Instant) {
        let remaining = deadline.saturating_duration_since(clock.now());
        if remaining >= self.worst_case_delay
            && let Some(wake) = deadline.checked_sub(self.worst_case_delay)
        {
            sleep_until(clock, wake);
        }
        spin_until(clock, deadline);
    }
}

/// Timer that sleeps, then spins the final stretch before each tick.
pub type WorstCaseTimer<C = MonotonicClock> = TickTimer<WorstCase, C>;

impl WorstCaseTimer<MonotonicClock> {
    /// Worst-case timer on the monotonic clock.
    #[must_use]
    pub fn with_delay_us(worst_case_delay_us: u64) -> Self {
        Self::with_clock(WorstCase::new(worst_case_delay_us), MonotonicClock)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::Timer;

    #[test]
    fn test_default_delay() {
        assert_eq!(
            WorstCase::default().worst_case_delay(),
            Duration::from_micros(DEFAULT_WORST_CASE_DELAY_US)
        );
    }

    #[test]
    fn test_wait_reaches_deadline() {
        let policy = WorstCase::new(500);
        let deadline = Instant::now() + Duration::from_millis(3);
        policy.wait_until(&MonotonicClock, deadline);
        assert!(Instant::now() >= deadline);
    }

    #[test]
    fn test_wait_shorter_than_delay_spins() {
        let policy = WorstCase::new(50_000);
        let deadline = Instant::now() + Duration::from_millis(1);
        policy.wait_until(&MonotonicClock, deadline);
        assert!(Instant::now() >= deadline);
    }

    #[test]
    fn test_worst_case_timer_ticks() {
        let mut timer = WorstCaseTimer::with_delay_us(200);
        assert_eq!(timer.set_frequency(200), Ok(()));
        assert_eq!(timer.start(), Ok(()));
        let start = Instant::now();
        for _ in 0..3 {
            assert_eq!(timer.sleep_to_next_tick(), Ok(()));
        }
        assert!(start.elapsed() >= Duration::from_millis(10));
    }
}
