//! Terminal output helpers

use anyhow::Error;
use colored::Colorize;

/// Print error in human-readable format
pub fn print_error_human(error: &Error) {
    eprintln!("{} {}", "Error:".red().bold(), error);

    let mut source = error.source();
    while let Some(err) = source {
        eprintln!("  {} {}", "Caused by:".yellow(), err);
        source = err.source();
    }
}

/// Human-readable byte rate.
pub fn format_rate(bytes_per_sec: u64) -> String {
    const UNITS: [&str; 4] = ["B/s", "KiB/s", "MiB/s", "GiB/s"];
    let mut value = bytes_per_sec;
    let mut fraction = 0;
    let mut unit = 0;
    while value >= 1024 && unit < UNITS.len() - 1 {
        fraction = (value % 1024) * 10 / 1024;
        value /= 1024;
        unit += 1;
    }
    let label = UNITS.get(unit).copied().unwrap_or("B/s");
    if unit == 0 {
        format!("{value} {label}")
    } else {
        format!("{value}.{fraction} {label}")
    }
}
