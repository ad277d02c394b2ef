//! Time unit conversions.
//!
//! All conversions are `const fn` and saturate instead of overflowing, so
//! they are usable both in constants and on the tick hot path.

use std::time::{Duration, Instant};

/// Milliseconds per second.
pub const MS_PER_SEC: u64 = 1_000;
/// Microseconds per second.
pub const US_PER_SEC: u64 = 1_000_000;
/// Nanoseconds per second.
pub const NS_PER_SEC: u64 = 1_000_000_000;
/// Picoseconds per second.
pub const PS_PER_SEC: u64 = 1_000_000_000_000;
/// Nanoseconds per microsecond.
pub const NS_PER_US: u64 = 1_000;
/// Nanoseconds per millisecond.
pub const NS_PER_MS: u64 = 1_000_000;
/// Picoseconds per nanosecond.
pub const PS_PER_NS: u64 = 1_000;

/// Seconds to milliseconds.
#[must_use]
pub const fn secs_to_ms(secs: u64) -> u64 {
    secs.saturating_mul(MS_PER_SEC)
}

/// Milliseconds to microseconds.
#[must_use]
pub const fn ms_to_us(ms: u64) -> u64 {
    ms.saturating_mul(1_000)
}

/// Milliseconds to nanoseconds.
#[must_use]
pub const fn ms_to_ns(ms: u64) -> u64 {
    ms.saturating_mul(NS_PER_MS)
}

/// Microseconds to nanoseconds.
#[must_use]
pub const fn us_to_ns(us: u64) -> u64 {
    us.saturating_mul(NS_PER_US)
}

/// Nanoseconds to picoseconds.
#[must_use]
pub const fn ns_to_ps(ns: u64) -> u64 {
    ns.saturating_mul(PS_PER_NS)
}

/// Nanoseconds to whole microseconds, truncating.
#[must_use]
pub const fn ns_to_us(ns: u64) -> u64 {
    ns / NS_PER_US
}

/// Nanoseconds to whole milliseconds, truncating.
#[must_use]
pub const fn ns_to_ms(ns: u64) -> u64 {
    ns / NS_PER_MS
}

/// Length of one tick at `hz` in picoseconds. Zero for a zero frequency.
#[must_use]
pub const fn period_ps(hz: u32) -> u64 {
    match hz {
        0 => 0,
        hz => PS_PER_SEC / hz as u64,
    }
}

/// Length of one tick at `hz` in whole milliseconds. Zero for a zero frequency.
#[must_use]
pub const fn period_ms(hz: u32) -> u64 {
    match hz {
        0 => 0,
        hz => MS_PER_SEC / hz as u64,
    }
}

/// A duration as nanoseconds, saturating at `u64::MAX`.
#[must_use]
pub fn duration_ns(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// Nanoseconds from `earlier` to `later`, zero if `later` is not after it.
#[must_use]
pub fn elapsed_ns(earlier: Instant, later: Instant) -> u64 {
    duration_ns(later.saturating_duration_since(earlier))
}
