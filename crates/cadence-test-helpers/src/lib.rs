//! Shared test utilities for cadence.
//!
//! # Modules
//!
//! - [`mod@must`] - Unwrap helpers with good error messages and `#[track_caller]`
//! - [`mock`] - A scripted [`Sender`](cadence_sender::Sender) and its probe
//! - [`net`] - Loopback helpers for TCP tests
//! - [`prelude`] - Convenience re-exports
//!
//! ```rust,ignore
//! use cadence_test_helpers::prelude::*;
//! ```

#![allow(clippy::panic)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod must;
pub mod prelude;

#[cfg(feature = "mock")]
#[cfg_attr(docsrs, doc(cfg(feature = "mock")))]
pub mod mock;

#[cfg(feature = "net")]
#[cfg_attr(docsrs, doc(cfg(feature = "net")))]
pub mod net;

pub use must::*;
