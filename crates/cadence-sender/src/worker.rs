//! The sending worker thread.

use std::fs::File;
use std::io::{self, Write};
use std::net::TcpStream;
use std::sync::Arc;
use std::time::Duration;

use cadence_errors::WorkerErrorCode;
use tracing::{debug, error, warn};

use crate::handoff::{Handoff, TerminatedOnDrop};
use crate::packet::{Packet, PacketList, PacketSource};
use crate::platform;

/// Per-worker settings copied out of the sender configuration.
#[derive(Debug, Clone, Copy)]
pub(crate) struct WorkerSettings {
    pub(crate) cpu_core: Option<usize>,
    pub(crate) send_timeout: Duration,
    pub(crate) send_buffer_bytes: usize,
    pub(crate) recv_buffer_bytes: usize,
    pub(crate) interrupt_partial_writes: bool,
}

/// Owns the peer socket and executes the handoff protocol.
pub(crate) struct Worker {
    handoff: Arc<Handoff>,
    stream: TcpStream,
    settings: WorkerSettings,
}

/// Whether a packet or list ran to completion or stopped on a terminate
/// request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Progress {
    Complete,
    Interrupted,
}

type WorkerResult<T = Progress> = Result<T, WorkerErrorCode>;

impl Worker {
    pub(crate) fn new(handoff: Arc<Handoff>, stream: TcpStream, settings: WorkerSettings) -> Self {
        Self {
            handoff,
            stream,
            settings,
        }
    }

    /// Thread body. Marks the record terminated on every exit path.
    pub(crate) fn run(self) {
        let handoff = Arc::clone(&self.handoff);
        let _terminated = TerminatedOnDrop::new(&handoff);

        if let Err(code) = self.setup() {
            error!(%code, "sender worker setup failed");
            handoff.fail(code);
            return;
        }
        handoff.mark_initialized();
        debug!("sender worker ready");

        while let Some(list) = handoff.take_blocking() {
            match self.transmit(&list) {
                Ok(Progress::Complete) => {
                    drop(list);
                    handoff.mark_done();
                }
                Ok(Progress::Interrupted) => break,
                Err(code) => {
                    error!(%code, packets = list.len(), "sender worker stopped");
                    handoff.fail(code);
                    return;
                }
            }
        }
        debug!("sender worker exiting");
    }

    fn setup(&self) -> WorkerResult<()> {
        if let Some(core) = self.settings.cpu_core {
            platform::pin_current_thread(core).map_err(|e| {
                warn!(core, error = %e, "sched_setaffinity failed");
                WorkerErrorCode::CannotPinCpu
            })?;
        }
        self.stream
            .set_write_timeout(Some(self.settings.send_timeout))
            .map_err(|e| {
                warn!(error = %e, "setting SO_SNDTIMEO failed");
                WorkerErrorCode::CannotSetSocketTimeout
            })?;
        platform::set_socket_buffers(
            &self.stream,
            self.settings.send_buffer_bytes,
            self.settings.recv_buffer_bytes,
        )
        .map_err(|e| {
            warn!(error = %e, "setting SO_SNDBUF/SO_RCVBUF failed");
            WorkerErrorCode::CannotSetSocketBuffers
        })
    }

    fn transmit(&self, list: &PacketList) -> WorkerResult {
        for packet in list {
            if self.handoff.terminate_requested() {
                return Ok(Progress::Interrupted);
            }
            if self.transmit_packet(packet)? == Progress::Interrupted {
                return Ok(Progress::Interrupted);
            }
        }
        Ok(Progress::Complete)
    }

    fn transmit_packet(&self, packet: &Packet) -> WorkerResult {
        match packet.source() {
            PacketSource::Memory { .. } => match packet.as_bytes() {
                Some(bytes) => self.write_bytes(bytes),
                None => Err(WorkerErrorCode::SendFailed),
            },
            PacketSource::File { file, offset } => self.write_file(file, *offset, packet.len()),
        }
    }

    fn interrupted(&self) -> bool {
        self.settings.interrupt_partial_writes && self.handoff.terminate_requested()
    }

    fn write_bytes(&self, mut remaining: &[u8]) -> WorkerResult {
        while !remaining.is_empty() {
            if self.interrupted() {
                return Ok(Progress::Interrupted);
            }
            match (&self.stream).write(remaining) {
                Ok(0) => {
                    warn!("peer accepted zero bytes");
                    return Err(WorkerErrorCode::SendFailed);
                }
                Ok(written) => remaining = remaining.get(written..).unwrap_or_default(),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) => {
                    warn!(error = %e, "send failed");
                    return Err(WorkerErrorCode::SendFailed);
                }
            }
        }
        Ok(Progress::Complete)
    }

    fn write_file(&self, file: &File, mut offset: u64, len: usize) -> WorkerResult {
        let mut remaining = len;
        while remaining > 0 {
            if self.interrupted() {
                return Ok(Progress::Interrupted);
            }
            match platform::send_file(&self.stream, file, &mut offset, remaining) {
                Ok(0) => {
                    warn!(offset, remaining, "sendfile moved zero bytes");
                    return Err(WorkerErrorCode::SendFailed);
                }
                Ok(sent) => remaining = remaining.saturating_sub(sent),
                Err(e) if e.kind() == io::ErrorKind::Interrupted => {}
                Err(e) if e.kind() == io::ErrorKind::Unsupported => {
                    warn!("file-backed packets are not supported on this platform");
                    return Err(WorkerErrorCode::UnsupportedPacketKind);
                }
                Err(e) => {
                    warn!(error = %e, "sendfile failed");
                    return Err(WorkerErrorCode::SendFailed);
                }
            }
        }
        Ok(Progress::Complete)
    }
}
