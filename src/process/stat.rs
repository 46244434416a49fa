//! Process state and start time parsing from /proc/<pid>/stat.
//!
//! This module provides functions to read the scheduler state (used to
//! detect zombie/dead entries) and the start time of a process. Field
//! extraction splits after the closing parenthesis of the comm field, so
//! executable names containing spaces or parentheses cannot shift fields.

use chrono::{DateTime, Duration, Utc};
use once_cell::sync::Lazy;
use std::fs;
use std::path::Path;
use tracing::debug;

/// Get system clock ticks per second (usually 100, but can vary).
fn get_clk_tck() -> f64 {
    #[cfg(unix)]
    {
        // SAFETY: sysconf is safe to call with _SC_CLK_TCK
        // Returns -1 on error, 0 if undefined - both are handled by the > 0 check
        unsafe {
            let tck = libc::sysconf(libc::_SC_CLK_TCK);
            if tck > 0 {
                return tck as f64;
            }
        }
    }
    // Fallback to common default for error cases or non-Unix platforms
    100.0
}

/// System clock ticks per second (for start time calculation).
pub static CLK_TCK: Lazy<f64> = Lazy::new(get_clk_tck);

/// Splits the stat line into the fields following the comm field.
///
/// The comm field is enclosed in parentheses and is the only stat field
/// that can contain spaces, so everything after the last `)` is a plain
/// whitespace-separated list starting with the state field.
fn fields_after_comm(content: &str) -> Option<Vec<&str>> {
    let rest = &content[content.rfind(')')? + 1..];
    let parts: Vec<&str> = rest.split_whitespace().collect();
    if parts.is_empty() {
        return None;
    }
    Some(parts)
}

/// Reads the scheduler state character from /proc/<pid>/stat (field 3).
///
/// Returns None if the stat file is gone or malformed, which callers treat
/// as "process no longer inspectable".
pub fn read_process_state(proc_path: &Path) -> Option<char> {
    let content = fs::read_to_string(proc_path.join("stat")).ok()?;
    let parts = fields_after_comm(&content)?;
    parts[0].chars().next()
}

/// True for states that mean the process has already exited.
///
/// `Z` is a zombie awaiting reap, `X`/`x` are dead states the kernel shows
/// transiently during teardown.
pub fn is_exited_state(state: char) -> bool {
    matches!(state, 'Z' | 'X' | 'x')
}

/// Parses the start time field from /proc/<pid>/stat (field 22, jiffies
/// since boot).
pub fn parse_start_time_jiffies(content: &str) -> Option<u64> {
    let parts = fields_after_comm(content)?;
    // Field 22 of the full line is index 19 after the comm field
    parts.get(19)?.parse().ok()
}

/// Reads the uptime seconds from the uptime file under `root`.
///
/// Format: "35423.71 137795.04" (uptime, idle).
pub fn read_uptime(root: &Path) -> Option<f64> {
    let content = match fs::read_to_string(root.join("uptime")) {
        Ok(c) => c,
        Err(e) => {
            debug!("Failed to read uptime: {}", e);
            return None;
        }
    };
    content.split_whitespace().next()?.parse().ok()
}

/// Reads the wall-clock start time of the process at `proc_path`.
///
/// The kernel records start time as jiffies since boot; this converts it
/// through the uptime file under `root` and anchors it to the current wall
/// clock. Returns None if the process exited in the meantime or either
/// file is malformed.
pub fn read_start_time(proc_path: &Path, root: &Path) -> Option<DateTime<Utc>> {
    let content = fs::read_to_string(proc_path.join("stat")).ok()?;
    let starttime_jiffies = parse_start_time_jiffies(&content)?;
    let uptime = read_uptime(root)?;

    // Process age = uptime - (starttime / HZ); negative ages (clock
    // granularity on very fresh processes) clamp to zero.
    let age_seconds = (uptime - starttime_jiffies as f64 / *CLK_TCK).max(0.0);
    Utc::now().checked_sub_signed(Duration::milliseconds((age_seconds * 1000.0) as i64))
}
