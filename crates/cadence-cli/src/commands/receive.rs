//! `cadence receive`: a client that reports throughput.

use std::io::{ErrorKind, Read};
use std::net::TcpStream;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use cadence_sender::set_socket_buffers;
use tracing::{info, warn};

use super::ReceiveArgs;
use crate::config::CadenceConfig;
use crate::output::format_rate;

const READ_CHUNK_BYTES: usize = 1024 * 1024;
const REPORT_INTERVAL: Duration = Duration::from_secs(1);

pub fn execute(args: &ReceiveArgs, config: &CadenceConfig) -> Result<()> {
    let addr = format!("{}:{}", args.host, args.port);
    let mut stream =
        TcpStream::connect(&addr).with_context(|| format!("failed to connect to {addr}"))?;
    let recv_bytes = args
        .recv_buffer_bytes
        .unwrap_or(config.sender.recv_buffer_bytes);
    if let Err(e) = set_socket_buffers(&stream, config.sender.send_buffer_bytes, recv_bytes) {
        warn!(error = %e, recv_bytes, "could not enlarge the receive buffer");
    }
    stream
        .set_read_timeout(Some(REPORT_INTERVAL))
        .context("failed to set the read timeout")?;
    info!(%addr, "connected");

    let deadline = (args.seconds > 0)
        .then(|| Instant::now().checked_add(Duration::from_secs(args.seconds)))
        .flatten();
    let mut buffer = vec![0u8; READ_CHUNK_BYTES];
    let mut window_start = Instant::now();
    let mut window_bytes = 0u64;
    let mut total_bytes = 0u64;

    loop {
        match stream.read(&mut buffer) {
            Ok(0) => break,
            Ok(n) => {
                let n = u64::try_from(n).unwrap_or(u64::MAX);
                window_bytes = window_bytes.saturating_add(n);
                total_bytes = total_bytes.saturating_add(n);
            }
            Err(e) if matches!(e.kind(), ErrorKind::WouldBlock | ErrorKind::TimedOut) => {}
            Err(e) if e.kind() == ErrorKind::Interrupted => continue,
            Err(e) => return Err(e).context("read from the sender failed"),
        }

        if window_start.elapsed() >= REPORT_INTERVAL {
            println!("{}", format_rate(window_bytes));
            window_bytes = 0;
            window_start = Instant::now();
        }
        if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
            break;
        }
    }

    println!("received {total_bytes} bytes");
    Ok(())
}
