//! TCP sender configuration.

use std::time::Duration;

use cadence_errors::{SenderError, SenderResult};
use serde::{Deserialize, Serialize};

/// Default address the sender listens on.
pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:9000";
/// Default SCHED_FIFO priority of the worker thread.
pub const DEFAULT_WORKER_PRIORITY: i32 = 98;
/// Default core the worker thread is pinned to.
pub const DEFAULT_WORKER_CORE: usize = 0;
/// Default socket send timeout.
pub const DEFAULT_SEND_TIMEOUT_MS: u64 = 1_000;
/// Default kernel send and receive buffer size.
pub const DEFAULT_SOCKET_BUFFER_BYTES: usize = 2 * 1024 * 1024;

/// Settings for [`TcpSender`](crate::TcpSender).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TcpSenderConfig {
    /// Address to listen on for the single peer.
    pub bind_addr: String,
    /// Core the worker pins itself to; `None` leaves affinity alone.
    pub cpu_core: Option<usize>,
    /// SCHED_FIFO priority for the worker; `None` keeps the default policy.
    pub worker_priority: Option<i32>,
    /// Socket send timeout in milliseconds. Must be non-zero.
    pub send_timeout_ms: u64,
    /// Kernel send buffer size in bytes.
    pub send_buffer_bytes: usize,
    /// Kernel receive buffer size in bytes.
    pub recv_buffer_bytes: usize,
    /// Check for termination between partial writes of a single packet.
    pub interrupt_partial_writes: bool,
}

impl TcpSenderConfig {
    /// Real-time defaults listening on `bind_addr`.
    pub fn new(bind_addr: impl Into<String>) -> Self {
        Self {
            bind_addr: bind_addr.into(),
            ..Self::default()
        }
    }

    /// Settings that need no privileges: no pinning, no FIFO priority.
    pub fn unprivileged(bind_addr: impl Into<String>) -> Self {
        Self {
            cpu_core: None,
            worker_priority: None,
            ..Self::new(bind_addr)
        }
    }

    /// Listen on all interfaces at `port`.
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.bind_addr = format!("0.0.0.0:{port}");
        self
    }

    /// Socket send timeout as a duration.
    #[must_use]
    pub fn send_timeout(&self) -> Duration {
        Duration::from_millis(self.send_timeout_ms)
    }

    /// Check the settings for values the worker cannot apply.
    ///
    /// # Errors
    ///
    /// Returns [`SenderError::InvalidConfig`] naming the first invalid field.
    pub fn validate(&self) -> SenderResult {
        if self.bind_addr.trim().is_empty() {
            return Err(invalid("bind_addr must not be empty"));
        }
        if self.send_timeout_ms == 0 {
            return Err(invalid("send_timeout_ms must be greater than zero"));
        }
        if self.send_buffer_bytes == 0 || self.recv_buffer_bytes == 0 {
            return Err(invalid("socket buffer sizes must be greater than zero"));
        }
        if let Some(priority) = self.worker_priority
            && !(1..=99).contains(&priority)
        {
            return Err(SenderError::InvalidConfig(format!(
                "worker_priority must be in 1..=99, got {priority}"
            )));
        }
        Ok(())
    }
}

fn invalid(reason: &str) -> SenderError {
    SenderError::InvalidConfig(reason.to_string())
}

impl Default for TcpSenderConfig {
    fn default() -> Self {
        Self {
            bind_addr: DEFAULT_BIND_ADDR.to_string(),
            cpu_core: Some(DEFAULT_WORKER_CORE),
            worker_priority: Some(DEFAULT_WORKER_PRIORITY),
            send_timeout_ms: DEFAULT_SEND_TIMEOUT_MS,
            send_buffer_bytes: DEFAULT_SOCKET_BUFFER_BYTES,
            recv_buffer_bytes: DEFAULT_SOCKET_BUFFER_BYTES,
            interrupt_partial_writes: false,
        }
    }
}
