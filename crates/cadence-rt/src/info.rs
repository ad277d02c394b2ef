//! Per-tick context handed to the payload callback.

/// What the orchestrator knows about the tick it is about to serve.
///
/// The callback may call [`TickInfo::request_stop`] to end the run after it
/// returns; the orchestrator then tears the sender down and reports success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TickInfo {
    sequence: u64,
    skipped: bool,
    tolerance_used_ms: u32,
    stop_requested: bool,
}

impl TickInfo {
    /// Describe tick `sequence`.
    #[must_use]
    pub const fn new(sequence: u64, skipped: bool, tolerance_used_ms: u32) -> Self {
        Self {
            sequence,
            skipped,
            tolerance_used_ms,
            stop_requested: false,
        }
    }

    /// Zero-based tick counter. Skipped ticks are counted too.
    #[must_use]
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Whether this tick's payload will be discarded because the sender is
    /// still busy with an earlier one.
    #[must_use]
    pub fn is_skipped(&self) -> bool {
        self.skipped
    }

    /// Milliseconds spent waiting for the previous send inside the
    /// tolerance window.
    #[must_use]
    pub fn tolerance_used_ms(&self) -> u32 {
        self.tolerance_used_ms
    }

    /// Ask the orchestrator to stop after this callback returns.
    pub fn request_stop(&mut self) {
        self.stop_requested = true;
    }

    #[must_use]
    pub fn is_stop_requested(&self) -> bool {
        self.stop_requested
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tick_does_not_request_stop() {
        let info = TickInfo::new(7, true, 3);
        assert_eq!(info.sequence(), 7);
        assert!(info.is_skipped());
        assert_eq!(info.tolerance_used_ms(), 3);
        assert!(!info.is_stop_requested());
    }

    #[test]
    fn test_request_stop_sticks() {
        let mut info = TickInfo::new(0, false, 0);
        info.request_stop();
        info.request_stop();
        assert!(info.is_stop_requested());
    }
}
