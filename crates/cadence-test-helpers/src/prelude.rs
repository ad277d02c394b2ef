//! Convenience re-exports for common test utilities.

pub use crate::must::{must, must_some, must_with};

#[cfg(feature = "mock")]
pub use crate::mock::{MockProbe, MockSender};

#[cfg(feature = "net")]
pub use crate::net::{connect_with_retry, free_local_addr};

pub type TestResult = Result<(), Box<dyn std::error::Error>>;
