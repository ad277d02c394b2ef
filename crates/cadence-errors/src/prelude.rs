//! Prelude module for common error types.
//!
//! ```
//! use cadence_errors::prelude::*;
//!
//! fn check(hz: u32) -> TimerResult {
//!     if hz == 0 {
//!         return Err(TimerError::ZeroFrequency);
//!     }
//!     Ok(())
//! }
//!
//! assert_eq!(check(0), Err(TimerError::ZeroFrequency));
//! ```

pub use crate::sender::{PacketError, SenderError, SenderResult, WorkerErrorCode};
pub use crate::sticky::StickyError;
pub use crate::system::{ElevationError, ErrorSeverity, SystemError, SystemResult};
pub use crate::timer::{TimerError, TimerResult};
