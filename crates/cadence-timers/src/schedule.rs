//! Tick deadline arithmetic.
//!
//! Deadlines are kept in nanoseconds relative to a reference instant and
//! derived from a picosecond period, so a rate such as 3 Hz does not
//! accumulate truncation error tick after tick:
//!
//! ```text
//! deadline_ns(counter) = period_ps * counter / 1000 + 1
//! ```
//!
//! The `+ 1` absorbs the picosecond round-off. Every [`REBASE_INTERVAL`]
//! ticks the reference instant moves forward to the current deadline and the
//! counter restarts, which keeps `period_ps * counter` inside a `u64` for any
//! supported frequency. Each rebase adds at most 1 ns of error.

use std::time::{Duration, Instant};

use crate::units::{PS_PER_NS, elapsed_ns};

/// Number of ticks between reference rebases.
pub const REBASE_INTERVAL: u64 = 1 << 23;

/// Deadline state of a running timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSchedule {
    reference: Instant,
    period_ps: u64,
    counter: u64,
    deadline_ns: u64,
}

impl TickSchedule {
    /// Begin a schedule at `reference`; the first deadline is one period later.
    #[must_use]
    pub fn start(reference: Instant, period_ps: u64) -> Self {
        Self::resume(reference, period_ps, 1)
    }

    /// Rebuild a schedule whose next deadline is tick `counter` after
    /// `reference`.
    #[must_use]
    pub fn resume(reference: Instant, period_ps: u64, counter: u64) -> Self {
        let counter = counter.clamp(1, REBASE_INTERVAL);
        Self {
            reference,
            period_ps,
            counter,
            deadline_ns: deadline_ns(period_ps, counter),
        }
    }

    /// Reference instant deadlines are measured from.
    #[must_use]
    pub fn reference(&self) -> Instant {
        self.reference
    }

    /// Tick length in picoseconds.
    #[must_use]
    pub fn period_ps(&self) -> u64 {
        self.period_ps
    }

    /// Tick counter since the last rebase.
    #[must_use]
    pub fn counter(&self) -> u64 {
        self.counter
    }

    /// Next deadline in nanoseconds after the reference instant.
    #[must_use]
    pub fn deadline_ns(&self) -> u64 {
        self.deadline_ns
    }

    /// Next deadline as an instant.
    #[must_use]
    pub fn deadline(&self) -> Instant {
        self.reference + Duration::from_nanos(self.deadline_ns)
    }

    /// How far `now` is past the deadline, or `None` if it is not past it.
    #[must_use]
    pub fn lateness_ns(&self, now: Instant) -> Option<u64> {
        let elapsed = elapsed_ns(self.reference, now);
        elapsed
            .checked_sub(self.deadline_ns)
            .filter(|&late| late > 0)
    }

    /// Time left until the deadline, zero once it has passed.
    #[must_use]
    pub fn remaining(&self, now: Instant) -> Duration {
        self.deadline().saturating_duration_since(now)
    }

    /// Move to the next tick, rebasing when the counter reaches
    /// [`REBASE_INTERVAL`].
    pub fn advance(&mut self) {
        if self.counter >= REBASE_INTERVAL {
            self.reference += Duration::from_nanos(self.deadline_ns);
            self.counter = 0;
        }
        self.counter = self.counter.saturating_add(1);
        self.deadline_ns = deadline_ns(self.period_ps, self.counter);
    }
}

#[inline]
fn deadline_ns(period_ps: u64, counter: u64) -> u64 {
    (period_ps.saturating_mul(counter) / PS_PER_NS).saturating_add(1)
}
