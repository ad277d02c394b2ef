//! Run statistics shared with observers outside the loop.

use std::sync::atomic::{AtomicU64, Ordering};

/// Lock-free run counters.
///
/// Written by the loop thread with relaxed ordering; readers get an
/// eventually consistent view through [`RunCounters::snapshot`].
#[derive(Debug, Default)]
pub struct RunCounters {
    ticks: AtomicU64,
    skipped: AtomicU64,
    sends: AtomicU64,
    tolerance_ms: AtomicU64,
}

impl RunCounters {
    /// All counters at zero.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            ticks: AtomicU64::new(0),
            skipped: AtomicU64::new(0),
            sends: AtomicU64::new(0),
            tolerance_ms: AtomicU64::new(0),
        }
    }

    /// Count one tick, skipped or not.
    #[inline]
    pub fn inc_tick(&self) {
        self.ticks.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one skipped tick.
    #[inline]
    pub fn inc_skipped(&self) {
        self.skipped.fetch_add(1, Ordering::Relaxed);
    }

    /// Count one posted send.
    #[inline]
    pub fn inc_send(&self) {
        self.sends.fetch_add(1, Ordering::Relaxed);
    }

    /// Add milliseconds spent waiting inside the tolerance window.
    #[inline]
    pub fn add_tolerance_ms(&self, ms: u32) {
        self.tolerance_ms.fetch_add(u64::from(ms), Ordering::Relaxed);
    }

    /// Take a snapshot of all counters.
    #[must_use]
    pub fn snapshot(&self) -> RunSnapshot {
        RunSnapshot {
            ticks: self.ticks.load(Ordering::Relaxed),
            skipped: self.skipped.load(Ordering::Relaxed),
            sends: self.sends.load(Ordering::Relaxed),
            tolerance_ms: self.tolerance_ms.load(Ordering::Relaxed),
        }
    }

    /// Reset all counters to zero.
    pub fn reset(&self) {
        self.ticks.store(0, Ordering::Relaxed);
        self.skipped.store(0, Ordering::Relaxed);
        self.sends.store(0, Ordering::Relaxed);
        self.tolerance_ms.store(0, Ordering::Relaxed);
    }
}

/// Point-in-time copy of [`RunCounters`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSnapshot {
    /// Ticks served, skipped ones included
    pub ticks: u64,
    /// Ticks whose payload was discarded
    pub skipped: u64,
    /// Lists handed to the sender
    pub sends: u64,
    /// Total milliseconds spent in tolerance waits
    pub tolerance_ms: u64,
}

impl RunSnapshot {
    /// Fraction of ticks that were skipped, in `[0, 1]`.
    #[must_use]
    pub fn skip_ratio(&self) -> f64 {
        if self.ticks == 0 {
            return 0.0;
        }
        #[expect(
            clippy::cast_precision_loss,
            reason = "tick counts stay far below 2^52 in any real run"
        )]
        let ratio = self.skipped as f64 / self.ticks as f64;
        ratio
    }
}
