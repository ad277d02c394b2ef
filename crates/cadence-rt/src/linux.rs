//! Linux process elevation calls.

#![expect(unsafe_code, reason = "mlockall and sched_* have no safe std wrapper")]

use std::io;
use std::mem;

pub(crate) fn lock_memory() -> io::Result<()> {
    // SAFETY: mlockall takes only flags and touches no caller memory.
    let rc = unsafe { libc::mlockall(libc::MCL_CURRENT | libc::MCL_FUTURE) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

pub(crate) fn clamp_fifo_priority(requested: i32) -> i32 {
    // SAFETY: pure query on a valid policy constant.
    let max = unsafe { libc::sched_get_priority_max(libc::SCHED_FIFO) };
    // SAFETY: pure query on a valid policy constant.
    let min = unsafe { libc::sched_get_priority_min(libc::SCHED_FIFO) };
    if max < 0 || min < 0 || min > max {
        return requested;
    }
    requested.clamp(min, max)
}

pub(crate) fn set_fifo_scheduler(priority: i32) -> io::Result<()> {
    let param = libc::sched_param {
        sched_priority: priority,
    };
    // SAFETY: `param` is a valid sched_param; pid 0 is the caller.
    let rc = unsafe { libc::sched_setscheduler(0, libc::SCHED_FIFO, &param) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}

pub(crate) fn pin_process(core: usize) -> io::Result<()> {
    if core >= usize::try_from(libc::CPU_SETSIZE).unwrap_or(0) {
        return Err(io::Error::from(io::ErrorKind::InvalidInput));
    }
    // SAFETY: all-zero is the empty cpu_set_t.
    let mut set: libc::cpu_set_t = unsafe { mem::zeroed() };
    // SAFETY: `core` is below CPU_SETSIZE, so the write stays inside `set`.
    unsafe { libc::CPU_SET(core, &mut set) };
    // SAFETY: `set` is initialized and the size matches its type.
    let rc = unsafe { libc::sched_setaffinity(0, mem::size_of::<libc::cpu_set_t>(), &set) };
    if rc != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(())
}
