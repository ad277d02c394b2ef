//! `cadence run`: the full real-time loop with a generated payload.

use std::fs::File;
use std::io::{Seek, SeekFrom, Write};
use std::sync::Arc;

use anyhow::{Context, Result};
use cadence_rt::{RealTimeSystem, RtSetup, TickInfo};
use cadence_sender::{Packet, PacketList, TcpSender};
use tracing::{info, warn};

use super::RunArgs;
use crate::config::{CadenceConfig, PayloadConfig};

impl RunArgs {
    /// Overlay command-line flags on the file configuration.
    fn apply(&self, config: &mut CadenceConfig) {
        if let Some(bind) = &self.bind {
            config.sender.bind_addr.clone_from(bind);
        }
        if let Some(frequency) = self.frequency {
            config.frequency_hz = frequency;
        }
        if let Some(tolerance) = self.tolerance_ms {
            config.tolerance_ms = tolerance;
        }
        if let Some(strategy) = self.strategy {
            config.timer = strategy;
        }
        if let Some(size) = self.payload_bytes {
            config.payload.size_bytes = size;
        }
        config.skip_mode |= self.skip_mode;
        config.payload.zero_copy |= self.zero_copy;
        if self.unprivileged {
            config.rt = RtSetup::minimal();
            config.sender.cpu_core = None;
            config.sender.worker_priority = None;
        }
    }
}

/// Build the packet list served on every tick.
fn build_payload(payload: &PayloadConfig) -> Result<PacketList> {
    let bytes: Vec<u8> = (0..=u8::MAX).cycle().take(payload.size_bytes).collect();
    if !payload.zero_copy {
        return Ok(Packet::from_bytes(bytes).into());
    }

    let mut file: File = tempfile::tempfile().context("failed to create the payload file")?;
    file.write_all(&bytes)
        .context("failed to write the payload file")?;
    file.seek(SeekFrom::Start(0))
        .context("failed to rewind the payload file")?;
    Ok(Packet::file(Arc::new(file), 0, payload.size_bytes).into())
}

fn report_tick(info: &TickInfo) {
    if info.is_skipped() {
        println!(
            "tick {} skipped after waiting {} ms",
            info.sequence(),
            info.tolerance_used_ms()
        );
    } else if info.tolerance_used_ms() > 0 {
        println!(
            "tick {} used {} ms of tolerance",
            info.sequence(),
            info.tolerance_used_ms()
        );
    }
}

pub fn execute(args: &RunArgs, config: &CadenceConfig) -> Result<()> {
    let mut config = config.clone();
    args.apply(&mut config);
    config.validate()?;

    let list = build_payload(&config.payload)?;
    let stop_after = args.ticks;

    let mut system = RealTimeSystem::new();
    system.set_elevation(Box::new(config.rt.clone()));
    system.set_timer(config.timer.build());
    system.set_sender(Box::new(TcpSender::new(config.sender.clone())));
    system.set_frequency(config.frequency_hz);
    system.set_tolerance_ms(config.tolerance_ms);
    system.set_skip_mode(config.skip_mode);
    system.set_payload_fn(move |info| {
        report_tick(info);
        if stop_after > 0 && info.sequence().saturating_add(1) >= stop_after {
            info.request_stop();
        }
        list.clone()
    });

    info!(
        addr = %config.sender.bind_addr,
        hz = config.frequency_hz,
        timer = %config.timer,
        bytes = config.payload.size_bytes,
        zero_copy = config.payload.zero_copy,
        "starting real-time run"
    );

    loop {
        println!("waiting for a client on {}", config.sender.bind_addr);
        system
            .initialize()
            .context("failed to initialize the real-time system")?;

        if let Some(hello) = &args.hello {
            let greeting = PacketList::from(Packet::from_bytes(hello.as_bytes().to_vec()));
            if let Err(e) = system.send_before_run(greeting, args.hello_timeout_ms) {
                if args.always_on {
                    warn!(error = %e, "client did not take the greeting");
                    continue;
                }
                return Err(e).context("greeting was not delivered");
            }
        }

        match system.run() {
            Ok(report) => {
                println!(
                    "run finished: {} ticks, {} skipped",
                    report.ticks, report.skipped
                );
                if !args.always_on {
                    return Ok(());
                }
            }
            Err(e) if args.always_on && e.is_recoverable_by_restart() => {
                warn!(error = %e, "run ended, accepting the next client");
            }
            Err(e) => return Err(e).context("real-time run failed"),
        }
    }
}
