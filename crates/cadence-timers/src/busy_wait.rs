//! Busy-wait strategy: lowest latency, one core fully occupied.

use std::time::Instant;

use crate::clock::{Clock, MonotonicClock};
use crate::timer::{TickTimer, WaitPolicy};

/// Spin on the clock until the deadline.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BusyWait;

impl WaitPolicy for BusyWait {
    const NAME: &'static str = "BusyWaitTimer";

    #[inline]
    fn wait_until<C: Clock>(&self, clock: &C, deadline: Instant) {
        spin_until(clock, deadline);
    }
}

/// Timer that spins between ticks.
pub type BusyWaitTimer<C = MonotonicClock> = TickTimer<BusyWait, C>;

#[inline]
pub(crate) fn spin_until<C: Clock + ?Sized>(clock: &C, deadline: Instant) {
    while clock.now() < deadline {
        std::hint::spin_loop();
    }
}
