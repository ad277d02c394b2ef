//! TCP reference sender.
//!
//! [`TcpSender::initialize`] listens, accepts exactly one peer, closes the
//! listener and starts one worker thread that owns the connection. Every
//! [`send`](Sender::send) afterwards is a non-blocking post to that worker.

use std::io;
use std::net::{Shutdown, SocketAddr, TcpListener, TcpStream};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use cadence_errors::{SenderError, SenderResult, StickyError, WorkerErrorCode};
use tracing::{debug, info, warn};

use crate::config::TcpSenderConfig;
use crate::handoff::Handoff;
use crate::packet::PacketList;
use crate::platform;
use crate::sender::Sender;
use crate::worker::{Worker, WorkerSettings};

/// Name given to the worker thread.
pub const WORKER_THREAD_NAME: &str = "cadence-sender";

/// Single-peer TCP sender backed by a dedicated worker thread.
#[derive(Debug)]
pub struct TcpSender {
    config: TcpSenderConfig,
    handoff: Option<Arc<Handoff>>,
    worker: Option<JoinHandle<()>>,
    stream: Option<TcpStream>,
    peer: Option<SocketAddr>,
    error: StickyError,
}

impl TcpSender {
    /// Create an uninitialized sender.
    #[must_use]
    pub fn new(config: TcpSenderConfig) -> Self {
        Self {
            config,
            handoff: None,
            worker: None,
            stream: None,
            peer: None,
            error: StickyError::new("TCPSender"),
        }
    }

    /// Sender listening on all interfaces at `port` with real-time defaults.
    #[must_use]
    pub fn with_port(port: u16) -> Self {
        Self::new(TcpSenderConfig::default().with_port(port))
    }

    /// The configuration in use.
    pub fn config(&self) -> &TcpSenderConfig {
        &self.config
    }

    /// Address of the connected peer, if any.
    pub fn peer_addr(&self) -> Option<SocketAddr> {
        self.peer
    }

    /// Whether a worker is currently attached.
    pub fn is_running(&self) -> bool {
        self.handoff
            .as_ref()
            .is_some_and(|handoff| !handoff.is_terminated())
    }

    /// Accept the single peer from an already bound `listener` and start
    /// the worker. The listener is closed once the peer connects.
    ///
    /// [`initialize`](Sender::initialize) binds the configured address and
    /// calls this.
    ///
    /// # Errors
    ///
    /// Fails on an invalid configuration, or if accepting, duplicating the socket, spawning or prioritizing
    /// the worker, or the worker's own socket setup fails.
    pub fn accept_from(&mut self, listener: TcpListener) -> SenderResult {
        self.end()?;
        self.check_config()?;

        info!(addr = ?listener.local_addr().ok(), "waiting for the client");
        let (stream, peer) = listener
            .accept()
            .map_err(|e| self.error.record(SenderError::Accept(e)))?;
        drop(listener);
        info!(%peer, "client connected");

        if let Err(e) = platform::ignore_sigpipe() {
            warn!(error = %e, "failed to ignore SIGPIPE");
        }

        let worker_stream = stream
            .try_clone()
            .map_err(|e| self.error.record(SenderError::Socket(e)))?;
        let handoff = Arc::new(Handoff::new());
        let worker = Worker::new(Arc::clone(&handoff), worker_stream, self.worker_settings());

        let handle = thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || worker.run())
            .map_err(|e| self.error.record(SenderError::Spawn(e)))?;

        self.handoff = Some(Arc::clone(&handoff));
        self.worker = Some(handle);
        self.stream = Some(stream);
        self.peer = Some(peer);

        if let Some(priority) = self.config.worker_priority
            && let Some(handle) = self.worker.as_ref()
            && let Err(source) = platform::set_fifo_priority(handle, priority)
        {
            self.end()?;
            return Err(self
                .error
                .record(SenderError::ThreadPriority { priority, source }));
        }

        if !handoff.wait_initialized() {
            let code = handoff.error_code();
            self.end()?;
            let err = if code.is_error() {
                SenderError::Worker(code)
            } else {
                SenderError::WorkerUnavailable
            };
            return Err(self.error.record(err));
        }

        info!(%peer, "sender worker started");
        Ok(())
    }

    /// Report why the worker is gone, if it is.
    ///
    /// # Errors
    ///
    /// Returns the worker's error code, [`SenderError::WorkerUnavailable`]
    /// when it exited without one, or [`SenderError::NotInitialized`] when
    /// no worker was ever started.
    pub fn check_worker(&mut self) -> SenderResult {
        let Some(handoff) = self.handoff.as_ref() else {
            return Err(self.error.record(SenderError::NotInitialized));
        };
        if handoff.is_error() {
            let code = handoff.error_code();
            return Err(self.error.record(SenderError::Worker(code)));
        }
        if handoff.is_terminated() {
            return Err(self.error.record(SenderError::WorkerUnavailable));
        }
        Ok(())
    }

    fn check_config(&mut self) -> SenderResult {
        self.config
            .validate()
            .map_err(|e| self.error.record(e))
    }

    fn worker_settings(&self) -> WorkerSettings {
        WorkerSettings {
            cpu_core: self.config.cpu_core,
            send_timeout: self.config.send_timeout(),
            send_buffer_bytes: self.config.send_buffer_bytes,
            recv_buffer_bytes: self.config.recv_buffer_bytes,
            interrupt_partial_writes: self.config.interrupt_partial_writes,
        }
    }
}

impl Sender for TcpSender {
    fn initialize(&mut self) -> SenderResult {
        self.end()?;
        self.check_config()?;
        info!(addr = %self.config.bind_addr, "server: listening");
        let listener = TcpListener::bind(self.config.bind_addr.as_str()).map_err(|source| {
            self.error.record(SenderError::Bind {
                addr: self.config.bind_addr.clone(),
                source,
            })
        })?;
        self.accept_from(listener)
    }

    fn send(&mut self, list: PacketList) -> SenderResult {
        self.check_worker()?;
        if !self.handoff.as_ref().is_some_and(|handoff| handoff.post(list)) {
            return Err(self.error.record(SenderError::SendInProgress));
        }
        Ok(())
    }

    fn is_send_done(&self) -> bool {
        self.handoff.as_ref().is_some_and(|handoff| handoff.is_done())
    }

    fn end(&mut self) -> SenderResult {
        if let Some(handoff) = self.handoff.take() {
            handoff.request_terminate();
            handoff.wait_terminated();
            if handoff.error_code() != WorkerErrorCode::NoError {
                debug!(code = %handoff.error_code(), "sender worker had failed");
            }
        }
        if let Some(worker) = self.worker.take()
            && worker.join().is_err()
        {
            warn!("sender worker panicked");
        }
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.shutdown(Shutdown::Both) {
                debug!(error = %e, "socket shutdown");
            }
            info!(peer = ?self.peer, "sender closed");
        }
        self.peer = None;
        Ok(())
    }

    fn take_error(&mut self) -> Option<String> {
        self.error.take()
    }

    fn is_error(&self) -> bool {
        self.error.is_set()
    }
}

/// Size the kernel buffers of any TCP stream, such as a receiving peer.
///
/// A no-op where the platform keeps its defaults.
///
/// # Errors
///
/// Fails when the kernel rejects either size.
pub fn set_socket_buffers(stream: &TcpStream, send_bytes: usize, recv_bytes: usize) -> io::Result<()> {
    platform::set_socket_buffers(stream, send_bytes, recv_bytes)
}

impl Drop for TcpSender {
    fn drop(&mut self) {
        if let Err(e) = self.end() {
            warn!(error = %e, "sender teardown failed");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::Packet;

    #[test]
    fn test_send_before_initialize_fails() {
        let mut sender = TcpSender::new(TcpSenderConfig::unprivileged("127.0.0.1:0"));
        let result = sender.send(PacketList::from(Packet::from_bytes(vec![1u8])));

        assert!(matches!(result, Err(SenderError::NotInitialized)));
        assert_eq!(
            sender.take_error().as_deref(),
            Some("You must initialize the sender object first")
        );
        assert!(!sender.is_send_done());
    }

    #[test]
    fn test_end_without_worker_is_noop() {
        let mut sender = TcpSender::with_port(0);
        assert!(matches!(sender.end(), Ok(())));
        assert!(matches!(sender.end(), Ok(())));
        assert!(!sender.is_running());
        assert_eq!(sender.peer_addr(), None);
    }

    #[test]
    fn test_bind_failure_is_reported() -> Result<(), Box<dyn std::error::Error>> {
        let taken = TcpListener::bind("127.0.0.1:0")?;
        let addr = taken.local_addr()?.to_string();
        let mut sender = TcpSender::new(TcpSenderConfig::unprivileged(addr));
        let result = sender.initialize();

        assert!(matches!(result, Err(SenderError::Bind { .. })));
        assert!(sender.is_error());
        Ok(())
    }

    #[test]
    fn test_invalid_config_fails_before_binding() -> Result<(), Box<dyn std::error::Error>> {
        let taken = TcpListener::bind("127.0.0.1:0")?;
        let config = TcpSenderConfig {
            send_buffer_bytes: 0,
            ..TcpSenderConfig::unprivileged(taken.local_addr()?.to_string())
        };
        let mut sender = TcpSender::new(config);

        // A bind attempt would fail with AddrInUse; validation must come first.
        assert!(matches!(
            sender.initialize(),
            Err(SenderError::InvalidConfig(_))
        ));
        assert!(sender.is_error());

        let result = sender.accept_from(taken);
        assert!(matches!(result, Err(SenderError::InvalidConfig(_))));
        assert!(!sender.is_running());
        Ok(())
    }

    #[test]
    fn test_check_worker_without_worker() {
        let mut sender = TcpSender::with_port(0);
        assert!(matches!(
            sender.check_worker(),
            Err(SenderError::NotInitialized)
        ));
    }
}
