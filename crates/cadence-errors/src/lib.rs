//! Error types for the cadence real-time sender.
//!
//! Every cadence component reports failures two ways: the operation returns a
//! typed error, and the component records the message in its own
//! [`StickyError`] slot so callers that only hold a `bool` outcome can still
//! drain a human-readable reason later.
//!
//! # Modules
//!
//! - [`sticky`]: drain-on-read error slot owned by each component
//! - [`timer`]: tick timer failures
//! - [`sender`]: sender, packet, and worker-thread failures
//! - [`system`]: orchestrator and process-elevation failures
//!
//! # Example
//!
//! ```
//! use cadence_errors::prelude::*;
//!
//! let mut slot = StickyError::new("BusyWaitTimer");
//! let err = slot.record(TimerError::AlreadyStarted);
//!
//! assert_eq!(err, TimerError::AlreadyStarted);
//! assert!(slot.is_set());
//! assert_eq!(
//!     slot.take().as_deref(),
//!     Some("You can't start the timer while it is already running")
//! );
//! assert!(!slot.is_set());
//! ```

#![deny(unsafe_op_in_unsafe_fn, clippy::unwrap_used)]
#![warn(missing_docs, rust_2018_idioms)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod prelude;
pub mod sender;
pub mod sticky;
pub mod system;
pub mod timer;

pub use sender::{PacketError, SenderError, SenderResult, WorkerErrorCode};
pub use sticky::StickyError;
pub use system::{ElevationError, ErrorSeverity, SystemError, SystemResult};
pub use timer::{TimerError, TimerResult};
