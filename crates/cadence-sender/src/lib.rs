//! Non-blocking packet delivery to a single TCP peer.
//!
//! The caller hands a [`PacketList`] to a [`Sender`] and returns at once; a
//! dedicated worker thread performs the blocking writes and reports
//! completion through a shared [`Handoff`] record. At most one list is in
//! flight per sender.
//!
//! # Example
//!
//! ```no_run
//! use cadence_sender::prelude::*;
//!
//! # fn main() -> Result<(), SenderError> {
//! let mut sender = TcpSender::new(TcpSenderConfig::unprivileged("0.0.0.0:9000"));
//! sender.initialize()?; // blocks until one client connects
//!
//! sender.send(Packet::from_bytes(b"hello".to_vec()).into())?;
//! while !sender.is_send_done() {
//!     std::hint::spin_loop();
//! }
//! sender.end()?;
//! # Ok(())
//! # }
//! ```

#![deny(unsafe_op_in_unsafe_fn)]
#![deny(clippy::unwrap_used)]

pub mod config;
pub mod handoff;
pub mod packet;
pub mod sender;
pub mod tcp;

mod worker;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
use linux as platform;

#[cfg(not(target_os = "linux"))]
mod fallback;
#[cfg(not(target_os = "linux"))]
use fallback as platform;

pub mod prelude;

pub use config::TcpSenderConfig;
pub use handoff::{Handoff, TerminatedOnDrop};
pub use packet::{Packet, PacketKind, PacketList, PacketSource};
pub use sender::Sender;
pub use tcp::{TcpSender, set_socket_buffers};
