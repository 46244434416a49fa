//! Procquery Process Table Query Library
//!
//! This library answers point-in-time questions about the Linux process
//! table: is an application with a given name running, which process name
//! matches a pattern, and what is a process's start time or publisher.
//! Every call takes a fresh snapshot from /proc; nothing is cached and
//! nothing is mutated.
//!
//! # Features
//!
//! - **Name Predicates**: exact (case-insensitive), contains, prefix, and
//!   suffix matching over the live process table
//! - **Known-App Table**: named application predicates driven by a TOML
//!   table instead of per-application functions
//! - **Start Time Lookup**: wall-clock start time derived from
//!   /proc/<pid>/stat
//! - **Publisher Lookup**: best-effort package vendor resolution for a
//!   process's executable, with tagged failure reasons
//! - **Injectable Root**: queries run against any procfs root, so tests
//!   can supply a synthetic process table
//!
//! # Usage
//!
//! ```rust
//! use procquery::ProcessQuery;
//!
//! let query = ProcessQuery::new();
//!
//! if query.is_app_running("nginx") {
//!     println!("nginx is up");
//! }
//!
//! if let Some(name) = query.first_process_name_starting_with(&["postgres"]) {
//!     println!("found {}", name);
//! }
//!
//! // Named predicate from the known-apps table
//! let _ = query.is_known_app_running("chrome");
//! ```

pub mod known_apps;
pub mod process;
pub mod publisher;
pub mod query;

// Re-export main types for convenience
pub use process::scanner::ProcessEntry;
pub use publisher::PublisherError;
pub use query::{ProcessQuery, QueryError};
