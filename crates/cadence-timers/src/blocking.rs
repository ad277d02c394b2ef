//! Blocking strategy: near-zero CPU use, jitter bounded by the OS scheduler.

use std::time::Instant;

use crate::clock::{Clock, MonotonicClock};
use crate::sleep::sleep_until;
use crate::timer::{TickTimer, WaitPolicy};

/// Sleep until the deadline, re-measuring after every wake-up.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Blocking;

impl WaitPolicy for Blocking {
    const NAME: &'static str = "BlockingTimer";

    fn wait_until<C: Clock>(&self, clock: &C, deadline: Instant) {
        sleep_until(clock, deadline);
    }
}

/// Timer that blocks in the OS between ticks.
pub type BlockingTimer<C = MonotonicClock> = TickTimer<Blocking, C>;

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::Timer;
    use std::time::Duration;

    #[test]
    fn test_blocking_ticks_are_spaced_by_period() {
        let mut timer = BlockingTimer::new();
        assert_eq!(timer.set_frequency(200), Ok(()));
        assert_eq!(timer.start(), Ok(()));

        let start = Instant::now();
        for _ in 0..4 {
            assert_eq!(timer.sleep_to_next_tick(), Ok(()));
        }
        assert!(start.elapsed() >= Duration::from_millis(20));
    }
}
