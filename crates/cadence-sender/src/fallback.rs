//! Portable stand-ins for the Linux-only sender calls.

use std::fs::File;
use std::io;
use std::net::TcpStream;
use std::thread::JoinHandle;

pub(crate) fn ignore_sigpipe() -> io::Result<()> {
    Ok(())
}

pub(crate) fn pin_current_thread(_core: usize) -> io::Result<()> {
    Err(io::Error::from(io::ErrorKind::Unsupported))
}

pub(crate) fn set_fifo_priority<T>(_handle: &JoinHandle<T>, _priority: i32) -> io::Result<()> {
    Err(io::Error::from(io::ErrorKind::Unsupported))
}

/// Buffer sizes are left at the OS defaults.
pub(crate) fn set_socket_buffers(
    _stream: &TcpStream,
    _send_bytes: usize,
    _recv_bytes: usize,
) -> io::Result<()> {
    Ok(())
}

pub(crate) fn send_file(
    _stream: &TcpStream,
    _file: &File,
    _offset: &mut u64,
    _len: usize,
) -> io::Result<usize> {
    Err(io::Error::from(io::ErrorKind::Unsupported))
}
