//! Linux socket and thread calls used by the TCP sender.

#![expect(unsafe_code, reason = "socket options, affinity and sendfile go through libc")]

use std::fs::File;
use std::io;
use std::mem;
use std::net::TcpStream;
use std::os::fd::AsRawFd;
use std::os::unix::thread::JoinHandleExt;
use std::thread::JoinHandle;

/// Ignore SIGPIPE so a vanished peer surfaces as `EPIPE` instead of killing
/// the process.
pub(crate) fn ignore_sigpipe() -> io::Result<()> {
    // SAFETY: SIG_IGN is a valid disposition for SIGPIPE and no handler code
    // runs as a result.
    let previous = unsafe { libc::signal(libc::SIGPIPE, libc::SIG_IGN) };
    if previous == libc::SIG_ERR {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Pin the calling thread to `core`.
pub(crate) fn pin_current_thread(core: usize) -> io::Result<()> {
    if core >= usize::try_from(libc::CPU_SETSIZE).unwrap_or(0) {
        return Err(io::Error::from(io::ErrorKind::InvalidInput));
    }
    // SAFETY: cpu_set_t is a plain bitmask for which all-zero is the empty set.
    let mut set: libc::cpu_set_t = unsafe { mem::zeroed() };
    // SAFETY: `core` was checked against CPU_SETSIZE, so CPU_SET writes
    // inside `set`.
    unsafe { libc::CPU_SET(core, &mut set) };
    // SAFETY: `set` is initialized and the size matches its type. Pid 0 is
    // the calling thread.
    let rc = unsafe { libc::sched_setaffinity(0, mem::size_of::<libc::cpu_set_t>(), &set) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// Move a spawned thread to SCHED_FIFO at `priority`.
pub(crate) fn set_fifo_priority<T>(handle: &JoinHandle<T>, priority: i32) -> io::Result<()> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: the pthread handle belongs to a thread that has not been joined
    // and `param` is a valid sched_param.
    let rc = unsafe { libc::pthread_setschedparam(handle.as_pthread_t(), libc::SCHED_FIFO, &param) };
    if rc != 0 {
        return Err(io::Error::from_raw_os_error(rc));
    }
    Ok(())
}

/// Size the kernel send and receive buffers of `stream`.
pub(crate) fn set_socket_buffers(
    stream: &TcpStream,
    send_bytes: usize,
    recv_bytes: usize,
) -> io::Result<()> {
    set_int_option(stream, libc::SO_SNDBUF, send_bytes)?;
    set_int_option(stream, libc::SO_RCVBUF, recv_bytes)
}

fn set_int_option(stream: &TcpStream, option: libc::c_int, value: usize) -> io::Result<()> {
    let value = libc::c_int::try_from(value)
        .map_err(|_overflow| io::Error::from(io::ErrorKind::InvalidInput))?;
    let len = libc::socklen_t::try_from(mem::size_of::<libc::c_int>())
        .map_err(|_overflow| io::Error::from(io::ErrorKind::InvalidInput))?;
    // SAFETY: the descriptor is owned by `stream` for the duration of the
    // call and `value` is a live c_int of the advertised length.
    let rc = unsafe {
        libc::setsockopt(
            stream.as_raw_fd(),
            libc::SOL_SOCKET,
            option,
            (&raw const value).cast::<libc::c_void>(),
            len,
        )
    };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

/// One `sendfile` call moving up to `len` bytes of `file` from `*offset` to
/// `stream`. Advances `offset` and returns the bytes moved.
pub(crate) fn send_file(
    stream: &TcpStream,
    file: &File,
    offset: &mut u64,
    len: usize,
) -> io::Result<usize> {
    let mut off = libc::off_t::try_from(*offset)
        .map_err(|_overflow| io::Error::from(io::ErrorKind::InvalidInput))?;
    // SAFETY: both descriptors are owned by live handles and `off` is a valid
    // off_t the kernel updates in place.
    let sent = unsafe { libc::sendfile(stream.as_raw_fd(), file.as_raw_fd(), &mut off, len) };
    let sent = usize::try_from(sent).map_err(|_negative| io::Error::last_os_error())?;
    *offset = u64::try_from(off).unwrap_or(*offset);
    Ok(sent)
}
