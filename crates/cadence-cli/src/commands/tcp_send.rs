//! `cadence tcp-send`: exercise the sender without a timer.

use anyhow::{Context, Result};
use cadence_sender::{Packet, PacketList, Sender, TcpSender};
use cadence_timers::sleep::sleep_us;
use tracing::info;

use super::TcpSendArgs;
use crate::config::CadenceConfig;

const MESSAGES: [&[u8]; 2] = [
    b"Hello from the cadence sender\n",
    b"and this is the second message\n",
];

const POLL_US: u64 = 50;

pub fn execute(args: &TcpSendArgs, config: &CadenceConfig) -> Result<()> {
    let mut sender_config = config.sender.clone();
    if let Some(bind) = &args.bind {
        sender_config.bind_addr.clone_from(bind);
    }
    let lists: Vec<PacketList> = MESSAGES
        .iter()
        .map(|message| PacketList::from(Packet::from_bytes(message.to_vec())))
        .collect();

    let mut sender = TcpSender::new(sender_config);
    info!(addr = %sender.config().bind_addr, "waiting for a client");
    sender
        .initialize()
        .context("failed to accept a client")?;
    if let Some(peer) = sender.peer_addr() {
        println!("client connected from {peer}");
    }

    stream(&mut sender, &lists, args.count)?;
    sender.end().context("failed to close the connection")?;
    println!("sent {} messages", args.count);
    Ok(())
}

/// Send `count` lists, cycling through `lists`, each after the previous one
/// completed.
fn stream(sender: &mut TcpSender, lists: &[PacketList], count: u64) -> Result<()> {
    for (sent, list) in (0..count).zip(lists.iter().cycle()) {
        wait_until_done(sender).with_context(|| format!("message {sent} was not delivered"))?;
        sender
            .send(list.clone())
            .with_context(|| format!("message {sent} was not accepted"))?;
    }
    wait_until_done(sender).context("the last message was not delivered")
}

/// Poll for completion, giving up as soon as the worker is gone.
fn wait_until_done(sender: &mut TcpSender) -> Result<()> {
    while !sender.is_send_done() {
        if !sender.is_running() {
            sender.check_worker()?;
        }
        sleep_us(POLL_US);
    }
    Ok(())
}
