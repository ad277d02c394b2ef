//! Sticky error slot.
//!
//! A [`StickyError`] keeps the most recent failure message of one component
//! until it is read. Reading through [`StickyError::take`] drains the slot.

use core::fmt;

/// Drain-on-read error message slot owned by a single component.
///
/// Setting a new message replaces the previous one. The owner label is fixed
/// at construction and only used for diagnostics.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StickyError {
    owner: &'static str,
    message: Option<String>,
}

impl StickyError {
    /// Create an empty slot for the named component.
    #[must_use]
    pub const fn new(owner: &'static str) -> Self {
        Self {
            owner,
            message: None,
        }
    }

    /// Name of the component owning this slot.
    #[must_use]
    pub fn owner(&self) -> &'static str {
        self.owner
    }

    /// Store a message, replacing any previous one.
    pub fn set(&mut self, message: impl Into<String>) {
        self.message = Some(message.into());
    }

    /// Store the display form of `err` and hand the error back.
    ///
    /// Lets call sites write `return Err(self.error.record(e))`.
    pub fn record<E: fmt::Display>(&mut self, err: E) -> E {
        self.message = Some(err.to_string());
        err
    }

    /// Drain the slot, returning the stored message if any.
    pub fn take(&mut self) -> Option<String> {
        self.message.take()
    }

    /// Borrow the stored message without draining it.
    #[must_use]
    pub fn peek(&self) -> Option<&str> {
        self.message.as_deref()
    }

    /// Whether a message is currently stored.
    #[must_use]
    pub fn is_set(&self) -> bool {
        self.message.is_some()
    }

    /// Drop the stored message, if any.
    pub fn clear(&mut self) {
        self.message = None;
    }
}

impl fmt::Display for StickyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {message}", self.owner),
            None => write!(f, "{}: no error", self.owner),
        }
    }
}
