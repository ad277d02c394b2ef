//! Linux sleep primitive.

#![expect(unsafe_code, reason = "clock_nanosleep has no safe std wrapper")]

use core::time::Duration;
use libc::{CLOCK_MONOTONIC, c_long, clock_nanosleep, time_t, timespec};

/// Sleep once on the monotonic clock.
///
/// May return early on a signal. Callers re-measure and loop.
pub(crate) fn sleep_once(duration: Duration) {
    let ts = timespec {
        tv_sec: time_t::try_from(duration.as_secs()).unwrap_or(time_t::MAX),
        tv_nsec: c_long::try_from(duration.subsec_nanos()).unwrap_or(0),
    };

    // SAFETY: `ts` is a valid timespec that outlives the call and the
    // remainder pointer is null, which clock_nanosleep permits.
    unsafe {
        clock_nanosleep(CLOCK_MONOTONIC, 0, &ts, std::ptr::null_mut());
    }
}
