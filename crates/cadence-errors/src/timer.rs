//! Tick timer errors.

/// Failures reported by the tick timers.
///
/// All variants are `Copy` so the timer hot path never allocates while
/// reporting a deadline miss.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, thiserror::Error)]
pub enum TimerError {
    /// Requested frequency is above the supported maximum.
    #[error("The frequency provided is : {requested}, the max frequency supported is {max}")]
    FrequencyTooHigh {
        /// Requested frequency in Hz
        requested: u32,
        /// Maximum supported frequency in Hz
        max: u32,
    },
    /// A zero frequency has no period.
    #[error("The frequency must be greater than zero")]
    ZeroFrequency,
    /// `start` was called before any frequency was set.
    #[error("The frequency must be set before starting the timer")]
    FrequencyUnset,
    /// `set_frequency` was called on a running timer.
    #[error("You can't change the frequency while the timer is running")]
    FrequencyWhileRunning,
    /// `start` was called on a running timer.
    #[error("You can't start the timer while it is already running")]
    AlreadyStarted,
    /// `sleep_to_next_tick` was called on a stopped timer.
    #[error("The timer must be started before waiting for the next tick")]
    NotStarted,
    /// The deadline had already passed when the wait was requested.
    #[error("The tick already ticked before calling sleep_to_next_tick ({late_ns}ns late)")]
    DeadlineMissed {
        /// How far past the deadline the call arrived
        late_ns: u64,
    },
}

impl TimerError {
    /// Whether this error is a blown deadline rather than a misuse.
    #[must_use]
    pub fn is_deadline_miss(self) -> bool {
        matches!(self, TimerError::DeadlineMissed { .. })
    }
}

/// Result type for timer operations.
pub type TimerResult<T = ()> = Result<T, TimerError>;
