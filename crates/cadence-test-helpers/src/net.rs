//! Loopback helpers for TCP tests.

use std::io;
use std::net::{SocketAddr, TcpListener, TcpStream};
use std::thread;
use std::time::{Duration, Instant};

/// Reserve a loopback address that is free right now.
///
/// The port is released before returning, so another process may grab it;
/// good enough for tests that bind it again immediately.
///
/// # Errors
///
/// Fails if no ephemeral port can be bound.
pub fn free_local_addr() -> io::Result<SocketAddr> {
    let listener = TcpListener::bind("127.0.0.1:0")?;
    listener.local_addr()
}

/// Connect to `addr`, retrying until `limit` elapses.
///
/// Used to race a client against a server that has not bound yet.
///
/// # Errors
///
/// Returns the last connection error once `limit` is exhausted.
pub fn connect_with_retry(addr: SocketAddr, limit: Duration) -> io::Result<TcpStream> {
    let start = Instant::now();
    loop {
        match TcpStream::connect(addr) {
            Ok(stream) => return Ok(stream),
            Err(e) if start.elapsed() >= limit => return Err(e),
            Err(_retry) => thread::sleep(Duration::from_millis(5)),
        }
    }
}
