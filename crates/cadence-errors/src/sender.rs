//! Sender, packet, and worker-thread errors.

use core::fmt;
use std::io;

/// Error codes a sender worker thread reports through the handoff record.
///
/// Stored in an `AtomicU8`, so the representation is fixed. `NoError` is zero
/// so a freshly reset record reads as healthy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u8)]
pub enum WorkerErrorCode {
    /// Worker exited cleanly or is still running
    #[default]
    NoError = 0,
    /// Worker could not pin itself to the configured CPU core
    CannotPinCpu = 1,
    /// Worker could not set the socket send timeout
    CannotSetSocketTimeout = 2,
    /// A write or file transfer on the peer socket failed
    SendFailed = 3,
    /// The packet kind cannot be transmitted on this platform
    UnsupportedPacketKind = 4,
    /// Worker could not size the socket send/receive buffers
    CannotSetSocketBuffers = 5,
}

impl WorkerErrorCode {
    /// Numeric code stored in the handoff record.
    #[must_use]
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Decode a stored code. Returns `None` for unknown values.
    #[must_use]
    pub fn from_code(code: u8) -> Option<Self> {
        match code {
            0 => Some(WorkerErrorCode::NoError),
            1 => Some(WorkerErrorCode::CannotPinCpu),
            2 => Some(WorkerErrorCode::CannotSetSocketTimeout),
            3 => Some(WorkerErrorCode::SendFailed),
            4 => Some(WorkerErrorCode::UnsupportedPacketKind),
            5 => Some(WorkerErrorCode::CannotSetSocketBuffers),
            _ => None,
        }
    }

    /// Whether the code describes a failure.
    #[must_use]
    pub fn is_error(self) -> bool {
        self != WorkerErrorCode::NoError
    }
}

impl fmt::Display for WorkerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WorkerErrorCode::NoError => write!(f, "Sender worker thread reported no error."),
            WorkerErrorCode::CannotPinCpu => {
                write!(f, "Sender worker thread can't set CPU Affinity.")
            }
            WorkerErrorCode::CannotSetSocketTimeout => {
                write!(f, "Sender worker thread can't set timeout on the socket.")
            }
            WorkerErrorCode::SendFailed => {
                write!(f, "Sender worker thread, error while sending the data.")
            }
            WorkerErrorCode::UnsupportedPacketKind => {
                write!(f, "Sender worker thread can't send that type of packets.")
            }
            WorkerErrorCode::CannotSetSocketBuffers => {
                write!(f, "Can't reserve the buffers needed for the socket.")
            }
        }
    }
}

/// Failures reported by [`Sender`](https://docs.rs/cadence-sender) implementations.
#[derive(Debug, thiserror::Error)]
pub enum SenderError {
    /// An operation other than `initialize` was called first.
    #[error("You must initialize the sender object first")]
    NotInitialized,
    /// `send` was called while the previous list is still in flight.
    #[error("send called while a send operation is already in progress")]
    SendInProgress,
    /// The worker thread exited without recording an error.
    #[error("No worker thread available to execute the send operation")]
    WorkerUnavailable,
    /// The worker thread exited with an error code.
    #[error("{0}")]
    Worker(WorkerErrorCode),
    /// The sender configuration holds a value the worker cannot apply.
    #[error("{0}")]
    InvalidConfig(String),
    /// The listening socket could not be bound.
    #[error("server: failed to bind {addr}: {source}")]
    Bind {
        /// Address that was requested
        addr: String,
        /// Underlying I/O error
        #[source]
        source: io::Error,
    },
    /// Accepting the single peer failed.
    #[error("error in accepting the client: {0}")]
    Accept(#[source] io::Error),
    /// The peer socket handle could not be duplicated for the worker.
    #[error("error preparing the client socket: {0}")]
    Socket(#[source] io::Error),
    /// The worker thread could not be created.
    #[error("failed to create the sender worker thread: {0}")]
    Spawn(#[source] io::Error),
    /// The worker thread could not be raised to real-time priority.
    #[error("pthread setschedparam failed for priority {priority}: {source}")]
    ThreadPriority {
        /// Requested FIFO priority
        priority: i32,
        /// Underlying OS error
        #[source]
        source: io::Error,
    },
}

impl SenderError {
    /// Worker error code carried by this error, if any.
    #[must_use]
    pub fn worker_code(&self) -> Option<WorkerErrorCode> {
        match self {
            SenderError::Worker(code) => Some(*code),
            _ => None,
        }
    }
}

/// Result type for sender operations.
pub type SenderResult<T = ()> = Result<T, SenderError>;

/// Packet construction failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum PacketError {
    /// The requested range does not fit inside the buffer.
    #[error("packet of {size} bytes at offset {offset} exceeds buffer of {len} bytes")]
    OutOfBounds {
        /// Start of the range
        offset: usize,
        /// Length of the range
        size: usize,
        /// Length of the backing buffer
        len: usize,
    },
}
