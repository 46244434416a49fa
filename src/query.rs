//! Point-in-time queries over the live process table.
//!
//! This module provides the `ProcessQuery` service: every call takes a
//! fresh snapshot of the process table under its procfs root and answers a
//! predicate or lookup with plain string matching. Nothing is cached
//! between calls, and no call mutates, starts, or stops a process.

use crate::known_apps;
use crate::process::scanner::{collect_process_entries, ProcessEntry};
use crate::process::stat::{is_exited_state, read_process_state, read_start_time};
use crate::publisher::{self, PublisherError};
use chrono::{DateTime, Utc};
use std::path::PathBuf;
use tracing::debug;

/// Errors raised by lookup operations that must report a missing process
/// explicitly instead of faulting.
#[derive(Debug, thiserror::Error)]
pub enum QueryError {
    #[error("no running process named {0:?}")]
    ProcessNotFound(String),
}

/// Stateless process table query service.
///
/// Holds only the procfs root path. The default root is `/proc`; tests and
/// containers with an alternate procfs mount inject their own via
/// [`ProcessQuery::with_root`].
#[derive(Debug, Clone)]
pub struct ProcessQuery {
    proc_root: PathBuf,
}

impl Default for ProcessQuery {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessQuery {
    /// Creates a query service over the system `/proc`.
    pub fn new() -> Self {
        Self {
            proc_root: PathBuf::from("/proc"),
        }
    }

    /// Creates a query service over an alternate procfs root.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            proc_root: root.into(),
        }
    }

    /// Takes a fresh snapshot of the process table.
    ///
    /// Enumeration order is whatever the kernel returns; callers must not
    /// rely on it.
    pub fn snapshot(&self) -> Vec<ProcessEntry> {
        collect_process_entries(&self.proc_root)
    }

    /// True if any live process's name equals `name`.
    ///
    /// Equality is ASCII case-insensitive, never locale-aware.
    pub fn is_app_running(&self, name: &str) -> bool {
        self.snapshot()
            .iter()
            .any(|e| e.name.eq_ignore_ascii_case(name))
    }

    /// Like [`is_app_running`](Self::is_app_running), but excludes entries
    /// whose process has already exited (zombie/dead state, or a stat file
    /// that vanished between enumeration and inspection).
    pub fn is_app_running_and_not_exited(&self, name: &str) -> bool {
        self.snapshot()
            .iter()
            .filter(|e| e.name.eq_ignore_ascii_case(name))
            .any(|e| match read_process_state(&e.proc_path) {
                Some(state) => !is_exited_state(state),
                None => false,
            })
    }

    /// True if at least one of `names` is running (logical OR).
    pub fn is_one_app_running(&self, names: &[&str]) -> bool {
        let snapshot = self.snapshot();
        names.iter().any(|name| {
            snapshot
                .iter()
                .any(|e| e.name.eq_ignore_ascii_case(name))
        })
    }

    /// True if any live process's name ends with one of `suffixes`
    /// (case-sensitive).
    pub fn is_one_app_running_ending_with(&self, suffixes: &[&str]) -> bool {
        self.snapshot()
            .iter()
            .any(|e| suffixes.iter().any(|s| e.name.ends_with(s)))
    }

    /// True if any live process's name contains `substring`
    /// (case-sensitive).
    pub fn is_any_app_running_with_name_containing(&self, substring: &str) -> bool {
        self.snapshot().iter().any(|e| e.name.contains(substring))
    }

    /// Name of the first process containing any of `needles`, in
    /// enumeration order. None if nothing matches.
    pub fn first_process_name_containing(&self, needles: &[&str]) -> Option<String> {
        self.snapshot()
            .into_iter()
            .find(|e| needles.iter().any(|n| e.name.contains(n)))
            .map(|e| e.name)
    }

    /// Name of the first process starting with any of `prefixes`.
    pub fn first_process_name_starting_with(&self, prefixes: &[&str]) -> Option<String> {
        self.snapshot()
            .into_iter()
            .find(|e| prefixes.iter().any(|p| e.name.starts_with(p)))
            .map(|e| e.name)
    }

    /// Name of the first process ending with any of `suffixes`.
    pub fn first_process_name_ending_with(&self, suffixes: &[&str]) -> Option<String> {
        self.snapshot()
            .into_iter()
            .find(|e| suffixes.iter().any(|s| e.name.ends_with(s)))
            .map(|e| e.name)
    }

    /// The process with `pid`, or None if it is not (or no longer) in the
    /// process table.
    pub fn process_by_id(&self, pid: u32) -> Option<ProcessEntry> {
        let proc_path = self.proc_root.join(pid.to_string());
        if !proc_path.is_dir() {
            return None;
        }
        crate::process::scanner::read_process_name(&proc_path).map(|name| ProcessEntry {
            pid,
            name,
            proc_path,
        })
    }

    /// All snapshot entries whose name equals `name` (case-insensitive).
    pub fn processes_by_name(&self, name: &str) -> Vec<ProcessEntry> {
        self.snapshot()
            .into_iter()
            .filter(|e| e.name.eq_ignore_ascii_case(name))
            .collect()
    }

    /// Start time of the first process matching `name`.
    ///
    /// Matches whose stat vanished mid-read (exit race) are skipped; if no
    /// readable match remains the result is
    /// [`QueryError::ProcessNotFound`].
    pub fn process_start_time(&self, name: &str) -> Result<DateTime<Utc>, QueryError> {
        for entry in self.processes_by_name(name) {
            if let Some(start) = read_start_time(&entry.proc_path, &self.proc_root) {
                return Ok(start);
            }
            debug!("pid {} matched {:?} but has no readable start time", entry.pid, name);
        }
        Err(QueryError::ProcessNotFound(name.to_string()))
    }

    /// Publisher (package vendor/maintainer) of the process with `pid`.
    ///
    /// Fails softly with a tagged reason; callers that only care about
    /// presence use `.ok()`.
    pub fn process_publisher(&self, pid: u32) -> Result<String, PublisherError> {
        publisher::process_publisher(&self.proc_root, pid)
    }

    /// True if the application registered under `label` in the known-apps
    /// table is running. Unknown labels are false.
    pub fn is_known_app_running(&self, label: &str) -> bool {
        match known_apps::known_process_name(label) {
            Some(process) => self.is_app_running(process),
            None => {
                debug!("Unknown application label {:?}", label);
                false
            }
        }
    }
}
