//! Scripted sender for orchestrator tests.
//!
//! A [`MockSender`] completes each posted list after a configurable delay.
//! Individual sends can be stalled longer, held forever, or rejected. A
//! [`MockProbe`] cloned before the sender is handed off keeps observing it.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use cadence_errors::{SenderError, SenderResult, WorkerErrorCode};
use cadence_sender::{PacketList, Sender};
use parking_lot::Mutex;

#[derive(Debug, Default)]
struct MockState {
    initialized: bool,
    send_delay: Duration,
    stalls: HashMap<usize, Duration>,
    hang_from: Option<usize>,
    fail_send_from: Option<usize>,
    fail_initialize: bool,
    pending_until: Option<Instant>,
    hanging: bool,
    sent_bytes: Vec<usize>,
    initialize_calls: usize,
    end_calls: usize,
    error: Option<String>,
}

impl MockState {
    fn is_done(&self) -> bool {
        if self.hanging {
            return false;
        }
        self.pending_until
            .is_none_or(|deadline| Instant::now() >= deadline)
    }
}

/// In-process [`Sender`] with scripted completion times.
#[derive(Debug, Default)]
pub struct MockSender {
    state: Arc<Mutex<MockState>>,
}

/// Read-only handle on a [`MockSender`]'s history.
#[derive(Debug, Clone)]
pub struct MockProbe {
    state: Arc<Mutex<MockState>>,
}

impl MockSender {
    /// Sender whose sends complete immediately.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every send completes `delay` after it is posted.
    pub fn with_send_delay(self, delay: Duration) -> Self {
        self.state.lock().send_delay = delay;
        self
    }

    /// Send number `index` (zero-based) completes `delay` after it is posted.
    pub fn with_stall(self, index: usize, delay: Duration) -> Self {
        self.state.lock().stalls.insert(index, delay);
        self
    }

    /// Send number `index` and every later one never complete.
    pub fn hang_from(self, index: usize) -> Self {
        self.state.lock().hang_from = Some(index);
        self
    }

    /// Send number `index` and every later one are rejected.
    pub fn fail_send_from(self, index: usize) -> Self {
        self.state.lock().fail_send_from = Some(index);
        self
    }

    /// `initialize` fails.
    pub fn failing_initialize(self) -> Self {
        self.state.lock().fail_initialize = true;
        self
    }

    pub fn probe(&self) -> MockProbe {
        MockProbe {
            state: Arc::clone(&self.state),
        }
    }
}

impl Sender for MockSender {
    fn initialize(&mut self) -> SenderResult {
        let mut state = self.state.lock();
        state.initialize_calls += 1;
        if state.fail_initialize {
            let err = SenderError::WorkerUnavailable;
            state.error = Some(err.to_string());
            return Err(err);
        }
        state.initialized = true;
        state.pending_until = None;
        state.hanging = false;
        Ok(())
    }

    fn send(&mut self, list: PacketList) -> SenderResult {
        let mut state = self.state.lock();
        if !state.initialized {
            return Err(SenderError::NotInitialized);
        }
        if !state.is_done() {
            return Err(SenderError::SendInProgress);
        }
        let index = state.sent_bytes.len();
        if state.fail_send_from.is_some_and(|from| index >= from) {
            let err = SenderError::Worker(WorkerErrorCode::SendFailed);
            state.error = Some(err.to_string());
            return Err(err);
        }
        state.sent_bytes.push(list.total_bytes());
        state.hanging = state.hang_from.is_some_and(|from| index >= from);
        let delay = state
            .stalls
            .get(&index)
            .copied()
            .unwrap_or(state.send_delay);
        state.pending_until = Some(Instant::now() + delay);
        Ok(())
    }

    fn is_send_done(&self) -> bool {
        self.state.lock().is_done()
    }

    fn end(&mut self) -> SenderResult {
        let mut state = self.state.lock();
        state.end_calls += 1;
        state.initialized = false;
        state.pending_until = None;
        state.hanging = false;
        Ok(())
    }

    fn take_error(&mut self) -> Option<String> {
        self.state.lock().error.take()
    }

    fn is_error(&self) -> bool {
        self.state.lock().error.is_some()
    }
}

impl MockProbe {
    /// Number of lists accepted so far.
    pub fn send_count(&self) -> usize {
        self.state.lock().sent_bytes.len()
    }

    /// Byte totals of the accepted lists, in order.
    pub fn sent_bytes(&self) -> Vec<usize> {
        self.state.lock().sent_bytes.clone()
    }

    pub fn initialize_count(&self) -> usize {
        self.state.lock().initialize_calls
    }

    pub fn end_count(&self) -> usize {
        self.state.lock().end_calls
    }

    pub fn is_initialized(&self) -> bool {
        self.state.lock().initialized
    }
}
