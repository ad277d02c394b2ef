//! The mailbox between a producer and its sending worker.
//!
//! One [`Handoff`] exists per worker thread. The producer posts at most one
//! [`PacketList`] at a time; the worker takes it, transmits it, and flips the
//! completion flag. The pending slot is only reachable under the mutex. The
//! remaining state is atomics so the producer can poll without locking.
//!
//! Flag ownership:
//!
//! | flag | set by |
//! |---|---|
//! | `done` true | worker |
//! | `done` false, `terminate` | producer |
//! | `error`, `initialized`, `terminated` | worker |

use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::time::Duration;

use cadence_errors::WorkerErrorCode;
use cadence_timers::sleep::sleep_for;
use parking_lot::{Condvar, Mutex};

use crate::packet::PacketList;

/// Interval at which the producer polls for worker readiness.
pub const INIT_POLL_INTERVAL: Duration = Duration::from_millis(5);

/// Interval at which the producer polls for worker exit.
pub const TERMINATE_POLL_INTERVAL: Duration = Duration::from_millis(1);

/// Shared state between one producer and one worker thread.
#[derive(Debug)]
pub struct Handoff {
    pending: Mutex<Option<PacketList>>,
    wake: Condvar,
    done: AtomicBool,
    error: AtomicBool,
    error_code: AtomicU8,
    terminate: AtomicBool,
    initialized: AtomicBool,
    terminated: AtomicBool,
}

impl Handoff {
    /// Fresh record: nothing pending, previous send complete, worker not yet
    /// initialized.
    #[must_use]
    pub fn new() -> Self {
        Self {
            pending: Mutex::new(None),
            wake: Condvar::new(),
            done: AtomicBool::new(true),
            error: AtomicBool::new(false),
            error_code: AtomicU8::new(WorkerErrorCode::NoError.code()),
            terminate: AtomicBool::new(false),
            initialized: AtomicBool::new(false),
            terminated: AtomicBool::new(false),
        }
    }

    /// Post a list for the worker.
    ///
    /// Returns `false` without posting if the previous list is still in
    /// flight.
    pub fn post(&self, list: PacketList) -> bool {
        let mut pending = self.pending.lock();
        if !self.done.load(Ordering::Acquire) {
            return false;
        }
        self.done.store(false, Ordering::Release);
        *pending = Some(list);
        drop(pending);
        self.wake.notify_one();
        true
    }

    /// Block until a list is pending or termination is requested.
    ///
    /// Takes ownership of the pending list, clearing the slot. Returns `None`
    /// once termination is requested and nothing is pending.
    pub fn take_blocking(&self) -> Option<PacketList> {
        let mut pending = self.pending.lock();
        loop {
            if let Some(list) = pending.take() {
                return Some(list);
            }
            if self.terminate.load(Ordering::Acquire) {
                return None;
            }
            self.wake.wait(&mut pending);
        }
    }

    /// Worker: the last posted list has been fully transmitted.
    pub fn mark_done(&self) {
        self.done.store(true, Ordering::Release);
    }

    /// Producer: ask the worker to exit.
    ///
    /// Drops any list that was posted but not yet taken.
    pub fn request_terminate(&self) {
        let mut pending = self.pending.lock();
        self.terminate.store(true, Ordering::Release);
        *pending = None;
        self.done.store(false, Ordering::Release);
        drop(pending);
        self.wake.notify_all();
    }

    /// Worker: setup finished, ready for posts.
    pub fn mark_initialized(&self) {
        self.initialized.store(true, Ordering::Release);
    }

    /// Worker: record a failure. The worker exits right after.
    pub fn fail(&self, code: WorkerErrorCode) {
        self.error_code.store(code.code(), Ordering::Release);
        self.error.store(true, Ordering::Release);
    }

    /// Whether the last posted list has been transmitted.
    #[must_use]
    pub fn is_done(&self) -> bool {
        self.done.load(Ordering::Acquire)
    }

    /// Whether the worker recorded a failure.
    #[must_use]
    pub fn is_error(&self) -> bool {
        self.error.load(Ordering::Acquire)
    }

    /// The failure the worker recorded, `NoError` if none.
    #[must_use]
    pub fn error_code(&self) -> WorkerErrorCode {
        WorkerErrorCode::from_code(self.error_code.load(Ordering::Acquire))
            .unwrap_or(WorkerErrorCode::SendFailed)
    }

    /// Whether termination has been requested.
    #[must_use]
    pub fn terminate_requested(&self) -> bool {
        self.terminate.load(Ordering::Acquire)
    }

    /// Whether the worker finished its setup.
    #[must_use]
    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::Acquire)
    }

    /// Whether the worker has exited.
    #[must_use]
    pub fn is_terminated(&self) -> bool {
        self.terminated.load(Ordering::Acquire)
    }

    /// Producer: poll every [`INIT_POLL_INTERVAL`] until the worker is ready
    /// or has exited. Returns whether it is ready.
    pub fn wait_initialized(&self) -> bool {
        while !self.is_initialized() && !self.is_terminated() {
            sleep_for(INIT_POLL_INTERVAL);
        }
        self.is_initialized() && !self.is_terminated()
    }

    /// Producer: poll every [`TERMINATE_POLL_INTERVAL`] until the worker has
    /// exited.
    pub fn wait_terminated(&self) {
        while !self.is_terminated() {
            sleep_for(TERMINATE_POLL_INTERVAL);
        }
    }

    fn mark_terminated(&self) {
        self.terminated.store(true, Ordering::Release);
    }
}

impl Default for Handoff {
    fn default() -> Self {
        Self::new()
    }
}

/// Marks the worker terminated when dropped, on every exit path.
#[derive(Debug)]
pub struct TerminatedOnDrop<'a> {
    handoff: &'a Handoff,
}

impl<'a> TerminatedOnDrop<'a> {
    /// Arm the guard for `handoff`.
    #[must_use]
    pub fn new(handoff: &'a Handoff) -> Self {
        Self { handoff }
    }
}

impl Drop for TerminatedOnDrop<'_> {
    fn drop(&mut self) {
        self.handoff.mark_terminated();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packet::Packet;
    use std::sync::Arc;
    use std::thread;

    fn list(len: usize) -> PacketList {
        PacketList::from(Packet::from_bytes(vec![7u8; len]))
    }

    #[test]
    fn test_fresh_record() {
        let handoff = Handoff::new();
        assert!(handoff.is_done());
        assert!(!handoff.is_error());
        assert_eq!(handoff.error_code(), WorkerErrorCode::NoError);
        assert!(!handoff.is_initialized());
        assert!(!handoff.is_terminated());
    }

    #[test]
    fn test_second_post_rejected_until_done() {
        let handoff = Handoff::new();
        assert!(handoff.post(list(1)));
        assert!(!handoff.is_done());
        assert!(!handoff.post(list(2)));

        let taken = handoff.take_blocking();
        assert_eq!(taken.map(|l| l.total_bytes()), Some(1));
        assert!(!handoff.post(list(3)));

        handoff.mark_done();
        assert!(handoff.post(list(4)));
    }

    #[test]
    fn test_terminate_clears_pending() {
        let handoff = Handoff::new();
        assert!(handoff.post(list(1)));
        handoff.request_terminate();

        assert!(handoff.terminate_requested());
        assert!(!handoff.is_done());
        assert!(handoff.take_blocking().is_none());
    }

    #[test]
    fn test_take_blocking_wakes_on_post() {
        let handoff = Arc::new(Handoff::new());
        let worker = {
            let handoff = Arc::clone(&handoff);
            thread::spawn(move || {
                let _guard = TerminatedOnDrop::new(&handoff);
                let mut sizes = Vec::new();
                while let Some(list) = handoff.take_blocking() {
                    sizes.push(list.total_bytes());
                    handoff.mark_done();
                }
                sizes
            })
        };

        for len in [3usize, 5, 8] {
            while !handoff.post(list(len)) {
                thread::yield_now();
            }
        }
        while !handoff.is_done() {
            thread::yield_now();
        }
        handoff.request_terminate();
        handoff.wait_terminated();

        let sizes = worker.join().ok();
        assert_eq!(sizes, Some(vec![3, 5, 8]));
    }

    #[test]
    fn test_idle_worker_exits_on_terminate() {
        let handoff = Arc::new(Handoff::new());
        let worker = {
            let handoff = Arc::clone(&handoff);
            thread::spawn(move || {
                let _guard = TerminatedOnDrop::new(&handoff);
                handoff.mark_initialized();
                while handoff.take_blocking().is_some() {
                    handoff.mark_done();
                }
            })
        };

        assert!(handoff.wait_initialized());
        handoff.request_terminate();
        handoff.wait_terminated();

        let joined = worker.join();
        assert!(matches!(joined, Ok(())));
        assert!(!handoff.is_error());
    }

    #[test]
    fn test_failed_setup_reports_not_ready() {
        let handoff = Arc::new(Handoff::new());
        let worker = {
            let handoff = Arc::clone(&handoff);
            thread::spawn(move || {
                let _guard = TerminatedOnDrop::new(&handoff);
                handoff.fail(WorkerErrorCode::CannotSetSocketTimeout);
            })
        };

        assert!(!handoff.wait_initialized());
        let joined = worker.join();
        assert!(matches!(joined, Ok(())));
        assert_eq!(
            handoff.error_code(),
            WorkerErrorCode::CannotSetSocketTimeout
        );
    }
}
