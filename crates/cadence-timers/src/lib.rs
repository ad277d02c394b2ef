//! Fixed-frequency tick timers.
//!
//! A timer turns a frequency into a sequence of absolute deadlines and waits
//! for each one in turn. Three wait strategies share one [`Timer`] contract:
//!
//! - [`BusyWaitTimer`]: spins on the clock. Lowest jitter, one core busy.
//! - [`BlockingTimer`]: sleeps in the OS. Near-zero CPU, OS-granular jitter.
//! - [`WorstCaseTimer`]: sleeps until a configured worst-case wake-up delay
//!   before the deadline, then spins.
//!
//! Deadline arithmetic lives in [`TickSchedule`] and is exact to the
//! nanosecond for every frequency up to [`MAX_FREQUENCY_HZ`].
//!
//! # RT-Safety
//!
//! - `sleep_to_next_tick` never allocates
//! - a deadline that has already passed is reported immediately, without
//!   waiting, as [`TimerError::DeadlineMissed`]
//!
//! # Example
//!
//! ```no_run
//! use cadence_timers::prelude::*;
//!
//! # fn main() -> Result<(), TimerError> {
//! let mut timer = BlockingTimer::new();
//! timer.set_frequency(100)?;
//! timer.start()?;
//! for _ in 0..100 {
//!     timer.sleep_to_next_tick()?;
//!     // periodic work
//! }
//! timer.stop();
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]
#![deny(unused_must_use)]

pub mod blocking;
pub mod busy_wait;
pub mod clock;
pub mod schedule;
pub mod sleep;
pub mod strategy;
pub mod timer;
pub mod units;
pub mod worst_case;

#[cfg(target_os = "linux")]
mod linux;

#[cfg(not(target_os = "linux"))]
mod fallback;

pub mod prelude;

pub use blocking::{Blocking, BlockingTimer};
pub use busy_wait::{BusyWait, BusyWaitTimer};
pub use cadence_errors::{TimerError, TimerResult};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use schedule::{REBASE_INTERVAL, TickSchedule};
pub use strategy::{ParseStrategyError, TimerStrategy};
pub use timer::{MAX_FREQUENCY_HZ, TickTimer, Timer, WaitPolicy};
pub use worst_case::{DEFAULT_WORST_CASE_DELAY_US, WorstCase, WorstCaseTimer};
