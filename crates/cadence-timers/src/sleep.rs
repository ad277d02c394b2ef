//! Blocking sleep helpers.
//!
//! A single OS sleep can return before the requested time has passed, so
//! every helper here re-measures the clock and sleeps again until the target
//! instant is reached.

use std::time::{Duration, Instant};

use crate::clock::{Clock, MonotonicClock};

#[cfg(target_os = "linux")]
use crate::linux::sleep_once;

#[cfg(not(target_os = "linux"))]
use crate::fallback::sleep_once;

/// Block until `clock` reads at least `deadline`.
///
/// Sleeps for the remaining time as measured by `clock` and loops until the
/// deadline is reached.
pub fn sleep_until<C: Clock + ?Sized>(clock: &C, deadline: Instant) {
    loop {
        let remaining = deadline.saturating_duration_since(clock.now());
        if remaining.is_zero() {
            return;
        }
        sleep_once(remaining);
    }
}

/// Block for at least `duration` on the monotonic clock.
pub fn sleep_for(duration: Duration) {
    if duration.is_zero() {
        return;
    }
    match Instant::now().checked_add(duration) {
        Some(deadline) => sleep_until(&MonotonicClock, deadline),
        None => sleep_once(duration),
    }
}

/// Block for at least `ns` nanoseconds.
pub fn sleep_ns(ns: u64) {
    sleep_for(Duration::from_nanos(ns));
}

/// Block for at least `us` microseconds.
pub fn sleep_us(us: u64) {
    sleep_for(Duration::from_micros(us));
}

/// Block for at least `ms` milliseconds.
pub fn sleep_ms(ms: u64) {
    sleep_for(Duration::from_millis(ms));
}

/// Block for at least `secs` seconds.
pub fn sleep_secs(secs: u64) {
    sleep_for(Duration::from_secs(secs));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;

    #[test]
    fn test_sleep_ms_sleeps_at_least_requested() {
        let start = Instant::now();
        sleep_ms(3);
        assert!(start.elapsed() >= Duration::from_millis(3));
    }

    #[test]
    fn test_sleep_us_sleeps_at_least_requested() {
        let start = Instant::now();
        sleep_us(250);
        assert!(start.elapsed() >= Duration::from_micros(250));
    }

    #[test]
    fn test_zero_sleep_returns() {
        sleep_ns(0);
        sleep_for(Duration::ZERO);
    }

    #[test]
    fn test_sleep_until_past_deadline_returns_immediately() {
        let clock = ManualClock::new();
        let deadline = clock.now();
        clock.advance(Duration::from_secs(10));

        let start = Instant::now();
        sleep_until(&clock, deadline);
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
