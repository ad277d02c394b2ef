//! Portable sleep primitive for non-Linux targets.

use core::time::Duration;

pub(crate) fn sleep_once(duration: Duration) {
    std::thread::sleep(duration);
}
