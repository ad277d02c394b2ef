//! The timer contract and its generic implementation.

use std::time::Instant;

use cadence_errors::{StickyError, TimerError, TimerResult};
use tracing::debug;

use crate::clock::{Clock, MonotonicClock};
use crate::schedule::TickSchedule;
use crate::units::period_ps;

/// Highest tick frequency the timers accept, in Hz.
pub const MAX_FREQUENCY_HZ: u32 = 10_000;

/// A fixed-frequency tick source.
///
/// Lifecycle: [`initialize`](Timer::initialize), [`set_frequency`](Timer::set_frequency),
/// [`start`](Timer::start), then repeated
/// [`sleep_to_next_tick`](Timer::sleep_to_next_tick) until [`stop`](Timer::stop).
/// A stopped timer keeps its frequency and can be started again.
///
/// Every failing call also records its message in the timer's sticky error
/// slot, drained by [`take_error`](Timer::take_error).
pub trait Timer: Send {
    /// Clear the frequency and stop the timer.
    ///
    /// # Errors
    ///
    /// The provided timers never fail here; the signature leaves room for
    /// implementations that acquire resources.
    fn initialize(&mut self) -> TimerResult;

    /// Set the tick frequency in Hz.
    ///
    /// # Errors
    ///
    /// Fails for zero, for more than [`MAX_FREQUENCY_HZ`], or while running.
    fn set_frequency(&mut self, hz: u32) -> TimerResult;

    /// Configured frequency, `None` until one is set.
    fn frequency(&self) -> Option<u32>;

    /// Capture the reference time and schedule the first tick.
    ///
    /// # Errors
    ///
    /// Fails if already started or no frequency is set.
    fn start(&mut self) -> TimerResult;

    /// Stop ticking, keeping the configured frequency.
    fn stop(&mut self);

    /// Whether the timer has been started and not stopped.
    fn is_running(&self) -> bool;

    /// Wait for the current deadline and schedule the next one.
    ///
    /// # Errors
    ///
    /// Fails if not started, or without waiting if the deadline has already
    /// passed.
    fn sleep_to_next_tick(&mut self) -> TimerResult;

    /// Drain the last recorded error message.
    fn take_error(&mut self) -> Option<String>;

    /// Whether an error message is waiting to be drained.
    fn is_error(&self) -> bool;
}

/// How a timer spends the time until a deadline.
pub trait WaitPolicy: Send {
    /// Label used for the timer's error slot and logs.
    const NAME: &'static str;

    /// Return once `clock` reads at least `deadline`.
    fn wait_until<C: Clock>(&self, clock: &C, deadline: Instant);
}

/// A [`Timer`] built from a wait policy and a clock.
///
/// The concrete timers are aliases of this type, see
/// [`BusyWaitTimer`](crate::BusyWaitTimer), [`BlockingTimer`](crate::BlockingTimer)
/// and [`WorstCaseTimer`](crate::WorstCaseTimer).
#[derive(Debug)]
pub struct TickTimer<P, C = MonotonicClock> {
    policy: P,
    clock: C,
    frequency: Option<u32>,
    period_ps: u64,
    schedule: Option<TickSchedule>,
    error: StickyError,
}

impl<P: WaitPolicy, C: Clock> TickTimer<P, C> {
    /// Create a timer with the given policy and clock.
    pub fn with_clock(policy: P, clock: C) -> Self {
        Self {
            policy,
            clock,
            frequency: None,
            period_ps: 0,
            schedule: None,
            error: StickyError::new(P::NAME),
        }
    }

    /// The wait policy.
    pub fn policy(&self) -> &P {
        &self.policy
    }

    /// The clock driving this timer.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Current deadline state, `None` while stopped.
    pub fn schedule(&self) -> Option<&TickSchedule> {
        self.schedule.as_ref()
    }
}

impl<P: WaitPolicy + Default> TickTimer<P, MonotonicClock> {
    /// Create a timer on the monotonic clock.
    #[must_use]
    pub fn new() -> Self {
        Self::with_clock(P::default(), MonotonicClock)
    }
}

impl<P: WaitPolicy + Default> Default for TickTimer<P, MonotonicClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: WaitPolicy, C: Clock> Timer for TickTimer<P, C> {
    fn initialize(&mut self) -> TimerResult {
        self.frequency = None;
        self.period_ps = 0;
        self.schedule = None;
        Ok(())
    }

    fn set_frequency(&mut self, hz: u32) -> TimerResult {
        if self.schedule.is_some() {
            return Err(self.error.record(TimerError::FrequencyWhileRunning));
        }
        if hz == 0 {
            return Err(self.error.record(TimerError::ZeroFrequency));
        }
        if hz > MAX_FREQUENCY_HZ {
            return Err(self.error.record(TimerError::FrequencyTooHigh {
                requested: hz,
                max: MAX_FREQUENCY_HZ,
            }));
        }
        self.frequency = Some(hz);
        self.period_ps = period_ps(hz);
        Ok(())
    }

    fn frequency(&self) -> Option<u32> {
        self.frequency
    }

    fn start(&mut self) -> TimerResult {
        if self.schedule.is_some() {
            return Err(self.error.record(TimerError::AlreadyStarted));
        }
        let Some(hz) = self.frequency else {
            return Err(self.error.record(TimerError::FrequencyUnset));
        };
        self.schedule = Some(TickSchedule::start(self.clock.now(), self.period_ps));
        debug!(timer = P::NAME, hz, "timer started");
        Ok(())
    }

    fn stop(&mut self) {
        if self.schedule.take().is_some() {
            debug!(timer = P::NAME, "timer stopped");
        }
    }

    fn is_running(&self) -> bool {
        self.schedule.is_some()
    }

    fn sleep_to_next_tick(&mut self) -> TimerResult {
        let Some(schedule) = self.schedule.as_mut() else {
            return Err(self.error.record(TimerError::NotStarted));
        };
        if let Some(late_ns) = schedule.lateness_ns(self.clock.now()) {
            return Err(self.error.record(TimerError::DeadlineMissed { late_ns }));
        }
        self.policy.wait_until(&self.clock, schedule.deadline());
        schedule.advance();
        Ok(())
    }

    fn take_error(&mut self) -> Option<String> {
        self.error.take()
    }

    fn is_error(&self) -> bool {
        self.error.is_set()
    }
}
