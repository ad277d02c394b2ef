//! The real-time orchestrator.
//!
//! [`RealTimeSystem`] owns a [`Timer`], a [`Sender`] and a payload callback.
//! Each tick it waits a bounded time for the previous send, asks the
//! callback for the next [`PacketList`], hands it to the sender and sleeps
//! until the next deadline.

use std::fmt;
use std::sync::Arc;

use cadence_errors::{StickyError, SystemError, SystemResult};
use cadence_sender::{PacketList, Sender};
use cadence_timers::Timer;
use cadence_timers::sleep::{sleep_ms, sleep_us};
use cadence_timers::units::period_ms;
use tracing::{debug, error, info, warn};

use crate::counters::RunCounters;
use crate::info::TickInfo;
use crate::rt_setup::{Elevate, RtSetup};

/// Milliseconds of every period reserved for the loop itself; the tolerance
/// window is clamped to `period - TOLERANCE_HEADROOM_MS`.
pub const TOLERANCE_HEADROOM_MS: u64 = 5;
/// A skip streak this many seconds long means the peer is gone.
pub const PEER_TIMEOUT_SECS: u64 = 3;
/// Granularity of the tolerance wait.
pub const TOLERANCE_POLL_US: u64 = 500;

/// Payload callback. Called once per tick, skipped ticks included.
pub type PayloadFn = Box<dyn FnMut(&mut TickInfo) -> PacketList + Send>;

/// Outcome of a run that ended on a stop request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunReport {
    /// Ticks served, skipped ones included
    pub ticks: u64,
    /// Ticks whose payload was discarded
    pub skipped: u64,
}

/// Fixed-rate packet producer driving a timer and a sender.
///
/// Any setter invalidates a previous [`initialize`](Self::initialize).
/// [`run`](Self::run) consumes the initialization: a second run needs a
/// fresh `initialize`, which also accepts a fresh peer.
pub struct RealTimeSystem {
    timer: Option<Box<dyn Timer>>,
    sender: Option<Box<dyn Sender>>,
    payload: Option<PayloadFn>,
    frequency: Option<u32>,
    tolerance_ms: u32,
    effective_tolerance_ms: u32,
    skip_mode: bool,
    ready: bool,
    elevation: Box<dyn Elevate>,
    counters: Arc<RunCounters>,
    error: StickyError,
}

impl Default for RealTimeSystem {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RealTimeSystem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RealTimeSystem")
            .field("has_timer", &self.timer.is_some())
            .field("has_sender", &self.sender.is_some())
            .field("has_payload", &self.payload.is_some())
            .field("frequency", &self.frequency)
            .field("tolerance_ms", &self.tolerance_ms)
            .field("skip_mode", &self.skip_mode)
            .field("ready", &self.ready)
            .finish_non_exhaustive()
    }
}

impl RealTimeSystem {
    /// Create an unconfigured system that elevates with [`RtSetup::default`].
    #[must_use]
    pub fn new() -> Self {
        Self {
            timer: None,
            sender: None,
            payload: None,
            frequency: None,
            tolerance_ms: 0,
            effective_tolerance_ms: 0,
            skip_mode: false,
            ready: false,
            elevation: Box::new(RtSetup::default()),
            counters: Arc::new(RunCounters::new()),
            error: StickyError::new("RealTimeSystem"),
        }
    }

    /// Install the timer that paces the loop.
    pub fn set_timer(&mut self, timer: Box<dyn Timer>) {
        self.timer = Some(timer);
        self.ready = false;
    }

    /// Install the sender that carries each tick's packets.
    pub fn set_sender(&mut self, sender: Box<dyn Sender>) {
        self.sender = Some(sender);
        self.ready = false;
    }

    /// Install the callback producing each tick's packets.
    pub fn set_payload_fn<F>(&mut self, payload: F)
    where
        F: FnMut(&mut TickInfo) -> PacketList + Send + 'static,
    {
        self.payload = Some(Box::new(payload));
        self.ready = false;
    }

    /// Tick rate in Hz. Validated by the timer during `initialize`.
    pub fn set_frequency(&mut self, hz: u32) {
        self.frequency = Some(hz);
        self.ready = false;
    }

    /// How long each tick may wait for the previous send to finish.
    pub fn set_tolerance_ms(&mut self, ms: u32) {
        self.tolerance_ms = ms;
        self.ready = false;
    }

    /// When enabled, a send still in flight after the tolerance window
    /// skips the tick instead of failing the run.
    pub fn set_skip_mode(&mut self, enabled: bool) {
        self.skip_mode = enabled;
        self.ready = false;
    }

    /// Replace the process elevation applied during `initialize`.
    pub fn set_elevation(&mut self, elevation: Box<dyn Elevate>) {
        self.elevation = elevation;
        self.ready = false;
    }

    /// Configured tick rate, if set.
    #[must_use]
    pub fn frequency(&self) -> Option<u32> {
        self.frequency
    }

    /// Whether overdue sends skip ticks.
    #[must_use]
    pub fn skip_mode(&self) -> bool {
        self.skip_mode
    }

    /// Tolerance actually applied by the loop, after clamping to the period.
    #[must_use]
    pub fn effective_tolerance_ms(&self) -> u32 {
        self.effective_tolerance_ms
    }

    /// Whether `run` may be called.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.ready
    }

    /// Shared run counters. Reset at the start of every run.
    #[must_use]
    pub fn counters(&self) -> Arc<RunCounters> {
        Arc::clone(&self.counters)
    }

    /// The installed timer, for inspection after a run.
    pub fn timer_mut(&mut self) -> Option<&mut Box<dyn Timer>> {
        self.timer.as_mut()
    }

    /// The installed sender, for inspection after a run.
    pub fn sender_mut(&mut self) -> Option<&mut Box<dyn Sender>> {
        self.sender.as_mut()
    }

    /// Drain the last recorded failure message.
    pub fn take_error(&mut self) -> Option<String> {
        self.error.take()
    }

    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.is_set()
    }

    /// Validate the configuration, elevate the process, then bring up the
    /// timer and the sender.
    ///
    /// Blocks until the sender has a peer.
    ///
    /// # Errors
    ///
    /// Fails on a missing collaborator or frequency, a refused elevation, a
    /// frequency the timer rejects, or a sender that cannot accept a peer.
    pub fn initialize(&mut self) -> SystemResult {
        self.ready = false;
        if self.payload.is_none() {
            return Err(self.error.record(SystemError::MissingCallback));
        }
        let Some(timer) = self.timer.as_mut() else {
            return Err(self.error.record(SystemError::MissingTimer));
        };
        let Some(sender) = self.sender.as_mut() else {
            return Err(self.error.record(SystemError::MissingSender));
        };
        let Some(hz) = self.frequency else {
            return Err(self.error.record(SystemError::FrequencyUnset));
        };

        if let Err(e) = self.elevation.elevate() {
            error!(error = %e, "process elevation failed");
            return Err(self.error.record(SystemError::Elevation(e)));
        }

        let configured = timer.initialize().and_then(|()| timer.set_frequency(hz));
        if let Err(e) = configured {
            return Err(self.error.record(SystemError::Timer(e)));
        }

        if let Err(e) = sender.initialize() {
            error!(error = %e, "sender initialization failed");
            return Err(self.error.record(SystemError::Sender(e)));
        }

        let headroom = period_ms(hz).saturating_sub(TOLERANCE_HEADROOM_MS);
        let headroom = u32::try_from(headroom).unwrap_or(u32::MAX);
        self.effective_tolerance_ms = self.tolerance_ms.min(headroom);
        if self.effective_tolerance_ms < self.tolerance_ms {
            warn!(
                requested = self.tolerance_ms,
                applied = self.effective_tolerance_ms,
                "tolerance clamped to the tick period"
            );
        }

        self.ready = true;
        info!(
            hz,
            tolerance_ms = self.effective_tolerance_ms,
            skip_mode = self.skip_mode,
            "real-time system initialized"
        );
        Ok(())
    }

    /// Send `list` once before the loop starts and wait up to
    /// `time_limit_ms` for it to complete.
    ///
    /// The wait sleeps in halving steps and stops early once the sender
    /// reports completion.
    ///
    /// # Errors
    ///
    /// Fails when called before `initialize`, when the sender rejects the
    /// list, or when the limit expires. The last two tear the sender down and
    /// invalidate the initialization.
    pub fn send_before_run(&mut self, list: PacketList, time_limit_ms: u32) -> SystemResult {
        if !self.ready {
            return Err(self.error.record(SystemError::NotInitialized));
        }
        let Some(sender) = self.sender.as_mut() else {
            return Err(self.error.record(SystemError::MissingSender));
        };

        if let Err(e) = sender.send(list) {
            end_sender(&mut **sender);
            self.ready = false;
            return Err(self.error.record(SystemError::Sender(e)));
        }

        let mut remaining = time_limit_ms;
        while remaining > 0 {
            let step = (remaining / 2).saturating_add(1);
            remaining = remaining.saturating_sub(step);
            sleep_ms(u64::from(step));
            if sender.is_send_done() {
                break;
            }
        }

        if sender.is_send_done() {
            debug!(time_limit_ms, "pre-run payload delivered");
            return Ok(());
        }

        end_sender(&mut **sender);
        self.ready = false;
        Err(self.error.record(SystemError::HandshakeTimeout {
            limit_ms: time_limit_ms,
        }))
    }

    /// Run the tick loop until the callback requests a stop or a failure
    /// ends it.
    ///
    /// Every exit ends the sender and stops the timer.
    ///
    /// # Errors
    ///
    /// Fails when called before `initialize`, when a send misses its
    /// tolerance window with skipping disabled, when the skip streak reaches
    /// [`PEER_TIMEOUT_SECS`] worth of ticks, when a tick overruns its period,
    /// or when the sender rejects a list.
    pub fn run(&mut self) -> SystemResult<RunReport> {
        if !self.ready {
            return Err(self.error.record(SystemError::NotInitialized));
        }
        self.ready = false;

        let (Some(timer), Some(sender), Some(payload), Some(frequency)) = (
            self.timer.as_mut(),
            self.sender.as_mut(),
            self.payload.as_mut(),
            self.frequency,
        ) else {
            return Err(self.error.record(SystemError::NotInitialized));
        };

        self.counters.reset();
        let mut tick_loop = TickLoop {
            timer,
            sender,
            payload,
            counters: &self.counters,
            frequency,
            tolerance_ms: self.effective_tolerance_ms,
            skip_mode: self.skip_mode,
        };
        let outcome = tick_loop.run();
        outcome.map_err(|e| self.error.record(e))
    }
}

fn end_sender(sender: &mut dyn Sender) {
    if let Err(e) = sender.end() {
        warn!(error = %e, "sender reported an error while ending");
    }
}

/// Borrowed view of a system for the duration of one run.
struct TickLoop<'a> {
    timer: &'a mut Box<dyn Timer>,
    sender: &'a mut Box<dyn Sender>,
    payload: &'a mut PayloadFn,
    counters: &'a RunCounters,
    frequency: u32,
    tolerance_ms: u32,
    skip_mode: bool,
}

impl TickLoop<'_> {
    fn run(&mut self) -> SystemResult<RunReport> {
        if let Err(e) = self.timer.start() {
            return Err(self.abort(SystemError::Timer(e)));
        }
        let disconnect_after = u64::from(self.frequency).saturating_mul(PEER_TIMEOUT_SECS);
        let mut report = RunReport::default();
        let mut streak = 0u64;
        let mut sequence = 0u64;
        info!(hz = self.frequency, "real-time loop started");

        loop {
            if streak >= disconnect_after {
                return Err(self.abort(SystemError::PeerDisconnected { skipped: streak }));
            }

            let used_ms = self.wait_for_sender();
            let skipped = !self.sender.is_send_done();
            if skipped && !self.skip_mode {
                return Err(self.abort(SystemError::SendDeadline));
            }

            let mut info = TickInfo::new(sequence, skipped, used_ms);
            let list = (self.payload)(&mut info);
            report.ticks = report.ticks.saturating_add(1);
            self.counters.inc_tick();
            self.counters.add_tolerance_ms(used_ms);
            if skipped {
                report.skipped = report.skipped.saturating_add(1);
                self.counters.inc_skipped();
            }

            if info.is_stop_requested() {
                self.finish(report);
                return Ok(report);
            }

            if skipped {
                drop(list);
                streak = streak.saturating_add(1);
                debug!(sequence, streak, "sender still busy, tick skipped");
            } else {
                streak = 0;
                if let Err(e) = self.sender.send(list) {
                    return Err(self.abort(SystemError::Sender(e)));
                }
                self.counters.inc_send();
            }

            if let Err(e) = self.timer.sleep_to_next_tick() {
                return Err(self.abort(SystemError::TickOverrun(e)));
            }
            sequence = sequence.saturating_add(1);
        }
    }

    /// Poll the sender for up to the tolerance window. Returns the whole
    /// milliseconds spent waiting.
    fn wait_for_sender(&self) -> u32 {
        let polls_allowed = self.tolerance_ms.saturating_mul(2);
        let mut polls = 0u32;
        while polls < polls_allowed && !self.sender.is_send_done() {
            sleep_us(TOLERANCE_POLL_US);
            polls = polls.saturating_add(1);
        }
        polls / 2
    }

    fn abort(&mut self, err: SystemError) -> SystemError {
        error!(error = %err, "real-time loop aborted");
        end_sender(&mut **self.sender);
        self.timer.stop();
        err
    }

    fn finish(&mut self, report: RunReport) {
        info!(
            ticks = report.ticks,
            skipped = report.skipped,
            "stop requested, real-time loop finished"
        );
        end_sender(&mut **self.sender);
        self.timer.stop();
    }
}
