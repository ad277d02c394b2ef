//! Real-time orchestration for cadence.
//!
//! A [`RealTimeSystem`] binds three collaborators:
//!
//! - a [`Timer`](cadence_timers::Timer) that paces the loop,
//! - a [`Sender`](cadence_sender::Sender) that moves each tick's packets off
//!   the loop thread,
//! - a payload callback that builds the packets for the tick.
//!
//! Before running, the process is elevated through [`RtSetup`]: memory is
//! locked, the scheduler is switched to SCHED_FIFO and the process is pinned
//! to a core. Tests and unprivileged tools install [`RtSetup::minimal`].
//!
//! ```no_run
//! use cadence_rt::prelude::*;
//! use cadence_sender::prelude::*;
//! use cadence_timers::prelude::*;
//!
//! # fn main() -> Result<(), SystemError> {
//! let mut system = RealTimeSystem::new();
//! system.set_timer(Box::new(BusyWaitTimer::new()));
//! system.set_sender(Box::new(TcpSender::with_port(9000)));
//! system.set_frequency(100);
//! system.set_tolerance_ms(2);
//! system.set_skip_mode(true);
//! system.set_payload_fn(|info| {
//!     Packet::from_bytes(info.sequence().to_le_bytes().to_vec()).into()
//! });
//! system.initialize()?;
//! let report = system.run()?;
//! println!("{} ticks", report.ticks);
//! # Ok(())
//! # }
//! ```

pub mod counters;
pub mod info;
pub mod rt_setup;
pub mod system;

#[cfg(target_os = "linux")]
mod linux;
#[cfg(target_os = "linux")]
use linux as platform;

#[cfg(not(target_os = "linux"))]
mod fallback;
#[cfg(not(target_os = "linux"))]
use fallback as platform;

pub mod prelude;

pub use cadence_errors::{ElevationError, SystemError, SystemResult};
pub use counters::{RunCounters, RunSnapshot};
pub use info::TickInfo;
pub use rt_setup::{Elevate, RtSetup};
pub use system::{PayloadFn, RealTimeSystem, RunReport};
