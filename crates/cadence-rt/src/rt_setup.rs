//! Process elevation to real-time execution.

use cadence_errors::ElevationError;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};

/// Default SCHED_FIFO priority requested for the process.
pub const DEFAULT_REALTIME_PRIORITY: i32 = 99;
/// Default core the process is pinned to.
pub const DEFAULT_CPU_CORE: usize = 0;

/// Raises the calling process to real-time execution.
pub trait Elevate: Send {
    /// Apply the elevation.
    ///
    /// # Errors
    ///
    /// Fails on the first step the OS refuses.
    fn elevate(&self) -> Result<(), ElevationError>;
}

/// Real-time setup configuration.
///
/// Applied in order: lock memory, switch to SCHED_FIFO, pin to a core.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RtSetup {
    /// Lock all current and future pages into RAM.
    pub lock_memory: bool,

    /// SCHED_FIFO priority (None = keep the current policy).
    ///
    /// Clamped to the platform maximum before it is applied.
    pub realtime_priority: Option<i32>,

    /// Core to pin the process to (None = no affinity).
    pub cpu_core: Option<usize>,
}

impl Default for RtSetup {
    fn default() -> Self {
        Self {
            lock_memory: true,
            realtime_priority: Some(DEFAULT_REALTIME_PRIORITY),
            cpu_core: Some(DEFAULT_CPU_CORE),
        }
    }
}

impl RtSetup {
    /// Create a new RtSetup with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a minimal RtSetup (no special configuration).
    #[must_use]
    pub fn minimal() -> Self {
        Self {
            lock_memory: false,
            realtime_priority: None,
            cpu_core: None,
        }
    }

    /// Set memory locking.
    #[must_use]
    pub fn with_lock_memory(mut self, enabled: bool) -> Self {
        self.lock_memory = enabled;
        self
    }

    /// Set the FIFO priority.
    #[must_use]
    pub fn with_realtime_priority(mut self, priority: i32) -> Self {
        self.realtime_priority = Some(priority);
        self
    }

    /// Set the core to pin to.
    #[must_use]
    pub fn with_cpu_core(mut self, core: usize) -> Self {
        self.cpu_core = Some(core);
        self
    }

    /// Check if any RT features are enabled.
    #[must_use]
    pub fn has_rt_features(&self) -> bool {
        self.lock_memory || self.realtime_priority.is_some() || self.cpu_core.is_some()
    }
}

impl Elevate for RtSetup {
    fn elevate(&self) -> Result<(), ElevationError> {
        if !self.has_rt_features() {
            return Ok(());
        }
        if self.lock_memory {
            crate::platform::lock_memory().map_err(ElevationError::LockMemory)?;
        }
        if let Some(requested) = self.realtime_priority {
            let priority = crate::platform::clamp_fifo_priority(requested);
            if priority != requested {
                warn!(requested, priority, "FIFO priority clamped to the platform range");
            }
            crate::platform::set_fifo_scheduler(priority)
                .map_err(|source| ElevationError::Scheduler { priority, source })?;
        }
        if let Some(core) = self.cpu_core {
            crate::platform::pin_process(core)
                .map_err(|source| ElevationError::Affinity { core, source })?;
        }
        info!(
            lock_memory = self.lock_memory,
            priority = ?self.realtime_priority,
            core = ?self.cpu_core,
            "process elevated to real-time"
        );
        Ok(())
    }
}
