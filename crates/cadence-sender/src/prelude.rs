//! Convenience re-exports.

pub use crate::config::TcpSenderConfig;
pub use crate::packet::{Packet, PacketKind, PacketList, PacketSource};
pub use crate::sender::Sender;
pub use crate::tcp::TcpSender;
pub use cadence_errors::{SenderError, SenderResult, WorkerErrorCode};
