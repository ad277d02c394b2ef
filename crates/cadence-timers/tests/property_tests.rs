//! Property-based tests for unit conversions and deadline arithmetic.

use cadence_timers::units::{
    NS_PER_MS, PS_PER_NS, PS_PER_SEC, duration_ns, ms_to_ns, ns_to_ms, ns_to_us, period_ps,
    us_to_ns,
};
use cadence_timers::{MAX_FREQUENCY_HZ, REBASE_INTERVAL, TickSchedule};
use proptest::prelude::*;
use quickcheck_macros::quickcheck;
use std::time::{Duration, Instant};

#[quickcheck]
fn ms_ns_roundtrip(ms: u32) -> bool {
    ns_to_ms(ms_to_ns(u64::from(ms))) == u64::from(ms)
}

#[quickcheck]
fn us_ns_roundtrip(us: u32) -> bool {
    ns_to_us(us_to_ns(u64::from(us))) == u64::from(us)
}

#[quickcheck]
fn duration_ns_matches_std(nanos: u64) -> bool {
    duration_ns(Duration::from_nanos(nanos)) == nanos
}

#[quickcheck]
fn period_times_frequency_is_one_second(hz: u16) -> bool {
    let hz = u32::from(hz).clamp(1, MAX_FREQUENCY_HZ);
    let total = period_ps(hz) * u64::from(hz);
    total <= PS_PER_SEC && PS_PER_SEC - total < u64::from(hz)
}

proptest! {
    #[test]
    fn deadlines_strictly_increase_by_one_period(
        hz in 1u32..=MAX_FREQUENCY_HZ,
        ticks in 1usize..2_000,
    ) {
        let mut schedule = TickSchedule::start(Instant::now(), period_ps(hz));
        let period_ns = period_ps(hz) / PS_PER_NS;
        let mut previous = schedule.deadline();

        for _ in 0..ticks {
            schedule.advance();
            let next = schedule.deadline();
            prop_assert!(next > previous);

            let step = next.duration_since(previous).as_nanos();
            prop_assert!(step >= u128::from(period_ns));
            prop_assert!(step <= u128::from(period_ns) + 1);
            previous = next;
        }
    }

    #[test]
    fn no_drift_before_rebase(hz in 1u32..=MAX_FREQUENCY_HZ, counter in 1u64..REBASE_INTERVAL) {
        let reference = Instant::now();
        let schedule = TickSchedule::resume(reference, period_ps(hz), counter);
        let exact_ps = u128::from(period_ps(hz)) * u128::from(counter);
        let deadline_ns = schedule.deadline().duration_since(reference).as_nanos();

        prop_assert_eq!(deadline_ns, exact_ps / u128::from(PS_PER_NS) + 1);
    }

    #[test]
    fn rebase_adds_at_most_one_nanosecond(hz in 1u32..=MAX_FREQUENCY_HZ) {
        let reference = Instant::now();
        let mut schedule = TickSchedule::resume(reference, period_ps(hz), REBASE_INTERVAL);
        schedule.advance();

        let exact_ns =
            u128::from(period_ps(hz)) * u128::from(REBASE_INTERVAL + 1) / u128::from(PS_PER_NS);
        let actual_ns = schedule.deadline().duration_since(reference).as_nanos();

        prop_assert_eq!(schedule.counter(), 1);
        prop_assert!(actual_ns >= exact_ns);
        prop_assert!(actual_ns - exact_ns <= 3, "rebase error {}", actual_ns - exact_ns);
    }

    #[test]
    fn lateness_is_distance_past_deadline(hz in 1u32..=MAX_FREQUENCY_HZ, late_ms in 1u64..1_000) {
        let reference = Instant::now();
        let schedule = TickSchedule::start(reference, period_ps(hz));
        let now = schedule.deadline() + Duration::from_nanos(late_ms * NS_PER_MS);

        prop_assert_eq!(schedule.lateness_ns(now), Some(late_ms * NS_PER_MS));
    }
}
