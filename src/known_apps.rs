//! Known-application table for named convenience predicates.
//!
//! This module maps stable application labels (e.g. "pgadmin", "word") to
//! the process names those applications run under, using a configurable
//! mapping loaded from TOML files. The table is data, not logic: adding an
//! application means adding a row, not a function.

use ahash::AHashMap as HashMap;
use once_cell::sync::Lazy;
use serde::Deserialize;
use std::fs;
use std::path::Path;
use tracing::{info, warn};

/// Type alias for the known-apps map (lowercased label -> process name).
pub type KnownAppsMap = HashMap<String, String>;

/// Data structure for one application row from TOML.
#[derive(Deserialize)]
struct KnownApp {
    label: String,
    process: String,
}

/// Root structure for the known-apps configuration.
#[derive(Deserialize)]
struct KnownAppsConfig {
    apps: Vec<KnownApp>,
}

/// Helper: load application rows from TOML string into map.
///
/// Labels are stored lowercased; a later row with the same label overrides
/// an earlier one, which is what lets override files replace built-ins.
fn load_apps_from_str(content: &str, map: &mut KnownAppsMap) {
    let parsed: KnownAppsConfig = match toml::from_str(content) {
        Ok(c) => c,
        Err(e) => {
            warn!("Failed to parse known-apps TOML: {}", e);
            return;
        }
    };

    for app in parsed.apps {
        map.insert(app.label.to_ascii_lowercase(), app.process);
    }
}

/// Helper: load application rows from TOML file path (if exists).
fn load_apps_from_file(path: &str, map: &mut KnownAppsMap) {
    let p = Path::new(path);
    if !p.exists() {
        return;
    }
    match fs::read_to_string(p) {
        Ok(content) => {
            load_apps_from_str(&content, map);
            info!("Loaded additional known apps from {}", path);
        }
        Err(e) => {
            warn!("Failed to read known-apps file {}: {}", path, e);
        }
    }
}

/// Static known-apps table loaded from TOML file(s).
pub static KNOWN_APPS: Lazy<KnownAppsMap> = Lazy::new(|| {
    let mut map = HashMap::new();

    // 1) built-in applications from embedded file
    let content = include_str!("../data/known_apps.toml");
    load_apps_from_str(content, &mut map);

    // 2) optional system-wide additions
    load_apps_from_file("/etc/procquery/known_apps.toml", &mut map);

    // 3) optional additions in current working directory
    load_apps_from_file("./known_apps.toml", &mut map);

    map
});

/// Process name registered for `label`, matched case-insensitively.
pub fn known_process_name(label: &str) -> Option<&'static str> {
    KNOWN_APPS
        .get(&label.to_ascii_lowercase())
        .map(|s| s.as_str())
}

/// All registered labels, in no particular order.
pub fn known_labels() -> Vec<&'static str> {
    KNOWN_APPS.keys().map(|k| k.as_str()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    // -------------------------------------------------------------------------
    // Tests for load_apps_from_str
    // -------------------------------------------------------------------------

    #[test]
    fn test_load_apps_from_str() {
        let mut map = HashMap::new();
        load_apps_from_str(
            r#"
            [[apps]]
            label = "PgAdmin"
            process = "pgAdmin4"

            [[apps]]
            label = "chrome"
            process = "chrome"
            "#,
            &mut map,
        );

        assert_eq!(map.get("pgadmin").map(String::as_str), Some("pgAdmin4"));
        assert_eq!(map.get("chrome").map(String::as_str), Some("chrome"));
    }

    #[test]
    fn test_load_apps_later_row_overrides() {
        let mut map = HashMap::new();
        load_apps_from_str(
            r#"
            [[apps]]
            label = "vscode"
            process = "code"
            "#,
            &mut map,
        );
        load_apps_from_str(
            r#"
            [[apps]]
            label = "VSCode"
            process = "code-insiders"
            "#,
            &mut map,
        );

        assert_eq!(
            map.get("vscode").map(String::as_str),
            Some("code-insiders")
        );
    }

    #[test]
    fn test_load_apps_invalid_toml_leaves_map_untouched() {
        let mut map = HashMap::new();
        map.insert("chrome".to_string(), "chrome".to_string());
        load_apps_from_str("not valid toml [[[", &mut map);
        assert_eq!(map.len(), 1);
    }

    // -------------------------------------------------------------------------
    // Tests for the built-in table
    // -------------------------------------------------------------------------

    #[test]
    fn test_builtin_table_has_source_applications() {
        assert_eq!(known_process_name("ssms"), Some("Ssms"));
        assert_eq!(known_process_name("pgadmin"), Some("pgAdmin4"));
        assert_eq!(known_process_name("word"), Some("WINWORD"));
    }

    #[test]
    fn test_known_process_name_case_insensitive_label() {
        assert_eq!(known_process_name("Chrome"), known_process_name("chrome"));
    }

    #[test]
    fn test_unknown_label() {
        assert_eq!(known_process_name("definitely-not-registered"), None);
    }

    #[test]
    fn test_known_labels_nonempty() {
        assert!(known_labels().contains(&"chrome"));
    }
}
