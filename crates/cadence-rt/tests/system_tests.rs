//! Orchestrator behavior against a scripted sender and a real timer.

use std::io;
use std::sync::mpsc;
use std::time::Duration;

use cadence_errors::SenderError;
use cadence_rt::prelude::*;
use cadence_sender::{Packet, PacketList};
use cadence_test_helpers::prelude::*;
use cadence_timers::prelude::*;

struct FailingElevation;

impl Elevate for FailingElevation {
    fn elevate(&self) -> Result<(), ElevationError> {
        Err(ElevationError::LockMemory(io::Error::from(
            io::ErrorKind::PermissionDenied,
        )))
    }
}

fn payload(info: &TickInfo) -> PacketList {
    Packet::from_bytes(info.sequence().to_le_bytes().to_vec()).into()
}

fn system_with(sender: MockSender, hz: u32) -> RealTimeSystem {
    let mut system = RealTimeSystem::new();
    system.set_elevation(Box::new(RtSetup::minimal()));
    system.set_timer(Box::new(BlockingTimer::new()));
    system.set_sender(Box::new(sender));
    system.set_frequency(hz);
    system
}

/// Callback that reports every tick on `tx` and stops at `stop_at`.
fn recording_payload(
    tx: mpsc::Sender<TickInfo>,
    stop_at: u64,
) -> impl FnMut(&mut TickInfo) -> PacketList + Send + 'static {
    move |info| {
        if info.sequence() == stop_at {
            info.request_stop();
        }
        let sent = tx.send(*info);
        assert!(matches!(sent, Ok(())));
        payload(info)
    }
}

fn timer_stopped(system: &mut RealTimeSystem) -> bool {
    system.timer_mut().is_some_and(|timer| !timer.is_running())
}

#[test]
fn test_initialize_checks_collaborators_in_order() {
    let mut system = RealTimeSystem::new();
    system.set_elevation(Box::new(RtSetup::minimal()));
    assert!(matches!(
        system.initialize(),
        Err(SystemError::MissingCallback)
    ));

    system.set_payload_fn(|info| payload(info));
    assert!(matches!(system.initialize(), Err(SystemError::MissingTimer)));

    system.set_timer(Box::new(BlockingTimer::new()));
    assert!(matches!(
        system.initialize(),
        Err(SystemError::MissingSender)
    ));

    system.set_sender(Box::new(MockSender::new()));
    assert!(matches!(
        system.initialize(),
        Err(SystemError::FrequencyUnset)
    ));
    assert_eq!(
        system.take_error().as_deref(),
        Some("Not provided frequency")
    );

    system.set_frequency(100);
    assert!(matches!(system.initialize(), Ok(())));
    assert!(system.is_initialized());
}

#[test]
fn test_elevation_failure_stops_initialize() {
    let sender = MockSender::new();
    let probe = sender.probe();
    let mut system = system_with(sender, 100);
    system.set_payload_fn(|info| payload(info));
    system.set_elevation(Box::new(FailingElevation));

    let result = system.initialize();
    assert!(matches!(
        result,
        Err(SystemError::Elevation(ElevationError::LockMemory(_)))
    ));
    assert_eq!(probe.initialize_count(), 0);
    assert!(!system.is_initialized());
    assert!(system.is_error());
}

#[test]
fn test_zero_frequency_is_rejected_by_timer() {
    let mut system = system_with(MockSender::new(), 0);
    system.set_payload_fn(|info| payload(info));
    assert!(matches!(
        system.initialize(),
        Err(SystemError::Timer(TimerError::ZeroFrequency))
    ));
}

#[test]
fn test_excessive_frequency_is_rejected_by_timer() {
    let mut system = system_with(MockSender::new(), MAX_FREQUENCY_HZ + 1);
    system.set_payload_fn(|info| payload(info));
    assert!(matches!(
        system.initialize(),
        Err(SystemError::Timer(TimerError::FrequencyTooHigh { .. }))
    ));
}

#[test]
fn test_sender_initialize_failure_is_reported() {
    let mut system = system_with(MockSender::new().failing_initialize(), 100);
    system.set_payload_fn(|info| payload(info));
    assert!(matches!(
        system.initialize(),
        Err(SystemError::Sender(SenderError::WorkerUnavailable))
    ));
    assert!(!system.is_initialized());
}

#[test]
fn test_tolerance_is_clamped_to_period_headroom() -> TestResult {
    let mut system = system_with(MockSender::new(), 100);
    system.set_payload_fn(|info| payload(info));
    system.set_tolerance_ms(50);
    system.initialize()?;
    assert_eq!(system.effective_tolerance_ms(), 5);

    system.set_frequency(10);
    system.set_tolerance_ms(20);
    system.initialize()?;
    assert_eq!(system.effective_tolerance_ms(), 20);
    Ok(())
}

#[test]
fn test_tolerance_saturates_at_zero_for_short_periods() -> TestResult {
    let mut system = system_with(MockSender::new(), 1_000);
    system.set_payload_fn(|info| payload(info));
    system.set_tolerance_ms(3);
    system.initialize()?;
    assert_eq!(system.effective_tolerance_ms(), 0);
    Ok(())
}

#[test]
fn test_setters_invalidate_initialization() -> TestResult {
    let mut system = system_with(MockSender::new(), 100);
    system.set_payload_fn(|info| payload(info));
    system.initialize()?;
    assert!(system.is_initialized());

    system.set_skip_mode(true);
    assert!(!system.is_initialized());
    assert!(matches!(system.run(), Err(SystemError::NotInitialized)));
    Ok(())
}

#[test]
fn test_stop_request_ends_run_cleanly() -> TestResult {
    let sender = MockSender::new();
    let probe = sender.probe();
    let mut system = system_with(sender, 100);
    let (tx, rx) = mpsc::channel();
    system.set_payload_fn(recording_payload(tx, 9));
    system.initialize()?;

    let report = system.run()?;
    assert_eq!(report, RunReport { ticks: 10, skipped: 0 });
    assert_eq!(probe.send_count(), 9);
    assert_eq!(probe.end_count(), 1);
    assert!(timer_stopped(&mut system));

    let sequences: Vec<u64> = rx.try_iter().map(|info| info.sequence()).collect();
    assert_eq!(sequences, (0..10).collect::<Vec<_>>());

    let snapshot = system.counters().snapshot();
    assert_eq!(snapshot.ticks, 10);
    assert_eq!(snapshot.sends, 9);
    Ok(())
}

#[test]
fn test_run_consumes_initialization() -> TestResult {
    let mut system = system_with(MockSender::new(), 100);
    system.set_payload_fn(|info| {
        info.request_stop();
        PacketList::empty()
    });
    system.initialize()?;
    system.run()?;
    assert!(!system.is_initialized());
    assert!(matches!(system.run(), Err(SystemError::NotInitialized)));

    system.initialize()?;
    let report = system.run()?;
    assert_eq!(report.ticks, 1);
    Ok(())
}

#[test]
fn test_skip_mode_skips_one_stalled_tick() -> TestResult {
    // 10 Hz: send 2 starts near 200ms and finishes near 350ms. Tick 3 waits
    // 20ms, gives up near 320ms and is skipped; tick 4 at 400ms is clean.
    let sender = MockSender::new().with_stall(2, Duration::from_millis(150));
    let probe = sender.probe();
    let mut system = system_with(sender, 10);
    system.set_tolerance_ms(20);
    system.set_skip_mode(true);
    let (tx, rx) = mpsc::channel();
    system.set_payload_fn(recording_payload(tx, 6));
    system.initialize()?;

    let report = system.run()?;
    assert_eq!(report, RunReport { ticks: 7, skipped: 1 });

    let ticks: Vec<TickInfo> = rx.try_iter().collect();
    let skipped: Vec<u64> = ticks
        .iter()
        .filter(|info| info.is_skipped())
        .map(TickInfo::sequence)
        .collect();
    assert_eq!(skipped, vec![3]);

    let stalled = must_some(ticks.get(3), "tick 3 was not reported");
    assert_eq!(stalled.tolerance_used_ms(), 20);
    assert_eq!(probe.send_count(), 5);
    assert_eq!(probe.end_count(), 1);
    Ok(())
}

#[test]
fn test_missed_tolerance_without_skip_mode_is_fatal() -> TestResult {
    let sender = MockSender::new().hang_from(1);
    let probe = sender.probe();
    let mut system = system_with(sender, 50);
    system.set_tolerance_ms(5);
    system.set_payload_fn(|info| payload(info));
    system.initialize()?;

    assert!(matches!(system.run(), Err(SystemError::SendDeadline)));
    assert_eq!(probe.send_count(), 2);
    assert_eq!(probe.end_count(), 1);
    assert!(timer_stopped(&mut system));
    assert_eq!(
        system.take_error().as_deref(),
        Some("Failed to send the data in the required time")
    );
    Ok(())
}

#[test]
fn test_three_seconds_of_skips_means_disconnect() -> TestResult {
    let sender = MockSender::new().hang_from(0);
    let probe = sender.probe();
    let mut system = system_with(sender, 20);
    system.set_skip_mode(true);
    system.set_payload_fn(|info| payload(info));
    system.initialize()?;

    let result = system.run();
    assert!(matches!(
        result,
        Err(SystemError::PeerDisconnected { skipped: 60 })
    ));
    assert_eq!(probe.send_count(), 1);
    assert_eq!(probe.end_count(), 1);

    let snapshot = system.counters().snapshot();
    assert_eq!(snapshot.skipped, 60);
    assert_eq!(snapshot.ticks, 61);
    Ok(())
}

#[test]
fn test_callback_overrunning_the_period_is_fatal() -> TestResult {
    let sender = MockSender::new();
    let probe = sender.probe();
    let mut system = system_with(sender, 50);
    system.set_payload_fn(|info| {
        if info.sequence() == 2 {
            sleep_ms(45);
        }
        payload(info)
    });
    system.initialize()?;

    let result = system.run();
    assert!(matches!(
        result,
        Err(SystemError::TickOverrun(TimerError::DeadlineMissed { .. }))
    ));
    assert_eq!(probe.end_count(), 1);
    assert!(timer_stopped(&mut system));
    Ok(())
}

#[test]
fn test_rejected_send_is_fatal() -> TestResult {
    let sender = MockSender::new().fail_send_from(3);
    let probe = sender.probe();
    let mut system = system_with(sender, 100);
    system.set_payload_fn(|info| payload(info));
    system.initialize()?;

    let result = system.run();
    assert!(matches!(result, Err(SystemError::Sender(_))));
    assert_eq!(probe.send_count(), 3);
    assert_eq!(probe.end_count(), 1);
    Ok(())
}

#[test]
fn test_send_before_run_waits_for_completion() -> TestResult {
    let sender = MockSender::new().with_send_delay(Duration::from_millis(10));
    let probe = sender.probe();
    let mut system = system_with(sender, 100);
    system.set_payload_fn(|info| payload(info));
    system.initialize()?;

    system.send_before_run(Packet::from_bytes(b"hello".to_vec()).into(), 500)?;
    assert_eq!(probe.sent_bytes(), vec![5]);
    assert!(system.is_initialized());
    Ok(())
}

#[test]
fn test_send_before_run_timeout_tears_down() -> TestResult {
    let sender = MockSender::new().hang_from(0);
    let probe = sender.probe();
    let mut system = system_with(sender, 100);
    system.set_payload_fn(|info| payload(info));
    system.initialize()?;

    let result = system.send_before_run(PacketList::empty(), 30);
    assert!(matches!(
        result,
        Err(SystemError::HandshakeTimeout { limit_ms: 30 })
    ));
    assert_eq!(probe.end_count(), 1);
    assert!(!system.is_initialized());
    assert!(matches!(system.run(), Err(SystemError::NotInitialized)));
    Ok(())
}
