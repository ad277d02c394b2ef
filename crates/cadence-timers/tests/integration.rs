//! Integration tests for the tick timers.

use cadence_timers::prelude::*;
use cadence_timers::{Blocking, BusyWait, TickTimer, WorstCase};
use std::time::{Duration, Instant};

fn start_manual<P: cadence_timers::WaitPolicy>(
    policy: P,
    hz: u32,
) -> Result<(TickTimer<P, ManualClock>, ManualClock), TimerError> {
    let clock = ManualClock::new();
    let mut timer = TickTimer::with_clock(policy, clock.clone());
    timer.initialize()?;
    timer.set_frequency(hz)?;
    timer.start()?;
    Ok((timer, clock))
}

#[test]
fn test_each_strategy_ticks_exactly_at_deadline() -> Result<(), Box<dyn std::error::Error>> {
    fn drive<P: cadence_timers::WaitPolicy>(policy: P) -> Result<(), TimerError> {
        let (mut timer, clock) = start_manual(policy, 100)?;
        for _ in 0..10 {
            if let Some(schedule) = timer.schedule() {
                clock.advance(schedule.remaining(clock.now()));
            }
            timer.sleep_to_next_tick()?;
        }
        Ok(())
    }

    drive(BusyWait)?;
    drive(Blocking)?;
    drive(WorstCase::new(500))?;
    Ok(())
}

#[test]
fn test_missed_deadline_is_reported_for_every_strategy() -> Result<(), Box<dyn std::error::Error>>
{
    fn late<P: cadence_timers::WaitPolicy>(policy: P) -> Result<TimerResult, TimerError> {
        let (mut timer, clock) = start_manual(policy, 1_000)?;
        clock.advance(Duration::from_millis(2));
        Ok(timer.sleep_to_next_tick())
    }

    for result in [late(BusyWait)?, late(Blocking)?, late(WorstCase::default())?] {
        assert_eq!(
            result,
            Err(TimerError::DeadlineMissed { late_ns: 999_999 })
        );
    }
    Ok(())
}

#[test]
fn test_missed_deadline_does_not_sleep() -> Result<(), Box<dyn std::error::Error>> {
    let (mut timer, clock) = start_manual(Blocking, 1)?;
    clock.advance(Duration::from_secs(5));

    let start = Instant::now();
    let result = timer.sleep_to_next_tick();

    assert!(matches!(result, Err(TimerError::DeadlineMissed { .. })));
    assert!(start.elapsed() < Duration::from_millis(500));
    assert!(timer.take_error().is_some_and(|msg| msg.contains("already ticked")));
    Ok(())
}

#[test]
fn test_restart_after_stop_uses_new_reference() -> Result<(), Box<dyn std::error::Error>> {
    let (mut timer, clock) = start_manual(BusyWait, 10)?;
    let first_reference = timer.schedule().map(TickSchedule::reference);

    timer.stop();
    clock.advance(Duration::from_secs(1));
    timer.start()?;

    let second_reference = timer.schedule().map(TickSchedule::reference);
    assert_ne!(first_reference, second_reference);
    assert_eq!(timer.schedule().map(TickSchedule::counter), Some(1));
    Ok(())
}

#[test]
fn test_boxed_strategy_runs_on_real_clock() -> Result<(), Box<dyn std::error::Error>> {
    let mut timer = TimerStrategy::WorstCase {
        worst_case_delay_us: 300,
    }
    .build();
    timer.initialize()?;
    timer.set_frequency(100)?;
    timer.start()?;

    let start = Instant::now();
    timer.sleep_to_next_tick()?;
    timer.sleep_to_next_tick()?;
    timer.stop();

    assert!(start.elapsed() >= Duration::from_millis(10));
    assert!(!timer.is_error());
    Ok(())
}

#[test]
fn test_strategy_config_from_json() -> Result<(), Box<dyn std::error::Error>> {
    let strategy: TimerStrategy =
        serde_json::from_str(r#"{"kind": "worst_case", "worst_case_delay_us": 150}"#)?;
    assert_eq!(
        strategy,
        TimerStrategy::WorstCase {
            worst_case_delay_us: 150
        }
    );

    let strategy: TimerStrategy = serde_json::from_str(r#"{"kind": "blocking"}"#)?;
    assert_eq!(strategy, TimerStrategy::Blocking);

    let strategy: TimerStrategy = serde_json::from_str(r#"{"kind": "worst_case"}"#)?;
    assert_eq!(strategy.to_string(), "worst_case:100");
    Ok(())
}

#[test]
fn test_sleep_helpers_are_lower_bounds() {
    let start = Instant::now();
    sleep_ns(200_000);
    sleep_us(200);
    sleep_ms(1);
    assert!(start.elapsed() >= Duration::from_micros(1_400));
}
