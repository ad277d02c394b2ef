//! Convenience re-exports.

pub use crate::blocking::BlockingTimer;
pub use crate::busy_wait::BusyWaitTimer;
pub use crate::clock::{Clock, ManualClock, MonotonicClock};
pub use crate::schedule::TickSchedule;
pub use crate::sleep::{sleep_ms, sleep_ns, sleep_secs, sleep_us};
pub use crate::strategy::TimerStrategy;
pub use crate::timer::{MAX_FREQUENCY_HZ, Timer};
pub use crate::worst_case::WorstCaseTimer;
pub use cadence_errors::{TimerError, TimerResult};
