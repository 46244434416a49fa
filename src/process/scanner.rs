//! Process scanning utilities for discovering process entries in /proc.
//!
//! This module provides functions to scan a procfs root for process
//! directories and read the process name belonging to each entry.

use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// One live process captured at snapshot time.
///
/// The name is read eagerly during collection; everything else (state,
/// executable path, start time) is read on demand through `proc_path` and
/// may have become unavailable by then if the process exited in between.
#[derive(Debug, Clone)]
pub struct ProcessEntry {
    pub pid: u32,
    pub name: String,
    pub proc_path: PathBuf,
}

/// Takes a fresh snapshot of the process table under `root`.
///
/// Scans `root` for directories with numeric names and reads each process
/// name. Entries whose name cannot be read (process gone, or a kernel
/// thread hidden by permissions) are skipped. An unreadable root yields an
/// empty snapshot.
pub fn collect_process_entries(root: &Path) -> Vec<ProcessEntry> {
    let mut out = Vec::new();
    if let Ok(entries) = fs::read_dir(root) {
        for entry in entries.flatten() {
            let p = entry.path();
            let name = match p.file_name().and_then(|s| s.to_str()) {
                Some(v) => v,
                None => continue,
            };
            if !name.chars().all(|c| c.is_ascii_digit()) {
                continue;
            }
            let pid: u32 = match name.parse() {
                Ok(v) => v,
                Err(_) => continue,
            };
            match read_process_name(&p) {
                Some(proc_name) => out.push(ProcessEntry {
                    pid,
                    name: proc_name,
                    proc_path: p,
                }),
                None => debug!("Skipping pid {}: no readable name", pid),
            }
        }
    }
    out
}

/// Reads process name from comm file or extracts from cmdline.
pub fn read_process_name(proc_path: &Path) -> Option<String> {
    let comm = proc_path.join("comm");
    if let Ok(s) = fs::read_to_string(&comm) {
        let t = s.trim();
        if !t.is_empty() {
            return Some(t.into());
        }
    }

    let cmd = proc_path.join("cmdline");
    if let Ok(content) = fs::read(&cmd) {
        if !content.is_empty() {
            let parts: Vec<&str> = content
                .split(|&b| b == 0u8)
                .filter_map(|s| std::str::from_utf8(s).ok())
                .collect();
            if !parts.is_empty() {
                if let Some(name) = Path::new(parts[0]).file_name() {
                    return name.to_str().map(|s| s.to_string());
                }
            }
        }
    }
    None
}
