//! Elevation is unavailable off Linux; every requested step fails.

use std::io;

fn unsupported() -> io::Error {
    io::Error::from(io::ErrorKind::Unsupported)
}

pub(crate) fn lock_memory() -> io::Result<()> {
    Err(unsupported())
}

pub(crate) fn clamp_fifo_priority(requested: i32) -> i32 {
    requested
}

pub(crate) fn set_fifo_scheduler(_priority: i32) -> io::Result<()> {
    Err(unsupported())
}

pub(crate) fn pin_process(_core: usize) -> io::Result<()> {
    Err(unsupported())
}
