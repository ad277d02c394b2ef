//! `cadence timer`: measure the interval between ticks.

use std::time::Instant;

use anyhow::{Context, Result};
use cadence_timers::units::{duration_ns, ns_to_us};
use tracing::info;

use super::TimerArgs;
use crate::config::CadenceConfig;

pub fn execute(args: &TimerArgs, config: &CadenceConfig) -> Result<()> {
    let strategy = args.strategy.unwrap_or(config.timer);
    let frequency = args.frequency.unwrap_or(config.frequency_hz);

    let mut timer = strategy.build();
    timer.initialize().context("failed to initialize the timer")?;
    timer
        .set_frequency(frequency)
        .context("failed to set the timer frequency")?;
    info!(strategy = %strategy, frequency, "timer configured");

    timer.start().context("failed to start the timer")?;
    let mut previous = Instant::now();
    for tick in 0..args.ticks {
        timer
            .sleep_to_next_tick()
            .with_context(|| format!("tick {tick} missed its deadline"))?;
        let now = Instant::now();
        println!("{}", ns_to_us(duration_ns(now.duration_since(previous))));
        previous = now;
    }
    timer.stop();
    Ok(())
}
