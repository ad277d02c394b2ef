//! Common imports for driving a real-time run.

pub use crate::counters::{RunCounters, RunSnapshot};
pub use crate::info::TickInfo;
pub use crate::rt_setup::{Elevate, RtSetup};
pub use crate::system::{RealTimeSystem, RunReport};
pub use cadence_errors::{ElevationError, ErrorSeverity, SystemError, SystemResult};
