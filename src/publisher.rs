//! Best-effort publisher lookup for a running process.
//!
//! This module resolves a process's executable through /proc/<pid>/exe and
//! asks the system package database who owns it, returning the vendor,
//! maintainer, or packager string as the process's publisher. On Linux,
//! executable provenance lives in the package database rather than in
//! metadata embedded in the binary.
//!
//! Every failure is a tagged [`PublisherError`] so callers can tell "no
//! such process" from "access denied" from "no vendor recorded"; callers
//! that only want presence use `.ok()`.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::debug;

// Absolute paths for package manager binaries - prevents PATH manipulation
mod paths {
    pub const DPKG: &str = "/usr/bin/dpkg";
    pub const DPKG_QUERY: &str = "/usr/bin/dpkg-query";
    pub const RPM: &str = "/usr/bin/rpm";
    pub const PACMAN: &str = "/usr/bin/pacman";
}

/// Reasons a publisher lookup can come back empty.
#[derive(Debug, thiserror::Error)]
pub enum PublisherError {
    #[error("no process with pid {0}")]
    NoSuchProcess(u32),

    #[error("access to the process executable was denied")]
    PermissionDenied,

    #[error("process executable is unavailable")]
    ExecutableUnavailable,

    #[error("no publisher recorded for the executable")]
    NoPublisherRecord,
}

/// Publisher of the process with `pid` under the procfs `root`.
pub fn process_publisher(root: &Path, pid: u32) -> Result<String, PublisherError> {
    let proc_path = root.join(pid.to_string());
    if !proc_path.is_dir() {
        return Err(PublisherError::NoSuchProcess(pid));
    }
    let exe = executable_path(&proc_path)?;
    package_vendor(&exe)
}

/// Resolves the executable behind a process directory via its exe link.
///
/// Reading the link of another user's process needs elevated privileges;
/// denial is reported as such, everything else (including the process
/// exiting mid-lookup) as unavailable.
pub fn executable_path(proc_path: &Path) -> Result<PathBuf, PublisherError> {
    match fs::read_link(proc_path.join("exe")) {
        Ok(p) => Ok(p),
        Err(e) if e.kind() == io::ErrorKind::PermissionDenied => {
            Err(PublisherError::PermissionDenied)
        }
        Err(e) => {
            debug!("Failed to resolve exe link under {:?}: {}", proc_path, e);
            Err(PublisherError::ExecutableUnavailable)
        }
    }
}

/// Vendor of the package owning `path`, trying the package managers
/// installed on this host in order of prevalence.
pub fn package_vendor(path: &Path) -> Result<String, PublisherError> {
    if Path::new(paths::RPM).exists() {
        if let Some(vendor) = query_rpm(path) {
            return Ok(vendor);
        }
    }
    if Path::new(paths::DPKG).exists() {
        if let Some(vendor) = query_dpkg(path) {
            return Ok(vendor);
        }
    }
    if Path::new(paths::PACMAN).exists() {
        if let Some(vendor) = query_pacman(path) {
            return Ok(vendor);
        }
    }
    Err(PublisherError::NoPublisherRecord)
}

// =============================================================================
// RPM (RHEL, Fedora, CentOS)
// =============================================================================

fn query_rpm(path: &Path) -> Option<String> {
    let path_str = path.to_str()?;

    // rpm -qf /path/to/file --qf '%{VENDOR}\n'
    let output = Command::new(paths::RPM)
        .args(["-qf", path_str, "--qf", "%{VENDOR}\n"])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    parse_rpm_vendor(&String::from_utf8_lossy(&output.stdout))
}

fn parse_rpm_vendor(stdout: &str) -> Option<String> {
    let line = stdout.trim();
    if line.is_empty() || line == "(none)" || line.contains("not owned") {
        return None;
    }
    Some(line.to_string())
}

// =============================================================================
// Debian/Ubuntu (dpkg)
// =============================================================================

fn query_dpkg(path: &Path) -> Option<String> {
    let path_str = path.to_str()?;

    // dpkg -S /path/to/file returns "package: /path/to/file"
    let output = Command::new(paths::DPKG)
        .args(["-S", path_str])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let name = parse_dpkg_owner(&String::from_utf8_lossy(&output.stdout))?;

    // dpkg-query -W -f '${Maintainer}\n' package
    let output = Command::new(paths::DPKG_QUERY)
        .args(["-W", "-f", "${Maintainer}\n", &name])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    parse_dpkg_maintainer(&String::from_utf8_lossy(&output.stdout))
}

/// Parse "package: /path" or "package, package2: /path" (diversion).
fn parse_dpkg_owner(stdout: &str) -> Option<String> {
    let line = stdout.trim();
    let pkg_part = line.split(':').next()?.trim();
    // Handle diversions - take first package
    let name = pkg_part.split(',').next()?.trim();
    if name.is_empty() {
        return None;
    }
    Some(name.to_string())
}

fn parse_dpkg_maintainer(stdout: &str) -> Option<String> {
    let line = stdout.trim();
    if line.is_empty() {
        return None;
    }
    Some(line.to_string())
}

// =============================================================================
// Arch Linux (pacman)
// =============================================================================

fn query_pacman(path: &Path) -> Option<String> {
    let path_str = path.to_str()?;

    // pacman -Qo /path/to/file
    // Output on success: "/path/to/file is owned by package_name version"
    let output = Command::new(paths::PACMAN)
        .args(["-Qo", path_str])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    let name = parse_pacman_owner(&String::from_utf8_lossy(&output.stdout))?;

    // pacman -Qi pkg_name - we only need the Packager line
    let output = Command::new(paths::PACMAN)
        .args(["-Qi", &name])
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    parse_pacman_packager(&String::from_utf8_lossy(&output.stdout))
}

/// Parse "/path/to/file is owned by package_name version".
fn parse_pacman_owner(stdout: &str) -> Option<String> {
    let line = stdout.trim();
    let marker = " is owned by ";
    let start = line.find(marker)?;
    line[start + marker.len()..]
        .split_whitespace()
        .next()
        .map(str::to_string)
}

/// Extract the Packager field from pacman -Qi output.
///
/// Official packagers (@archlinux.org) normalize to "Arch Linux".
fn parse_pacman_packager(stdout: &str) -> Option<String> {
    for line in stdout.lines() {
        if let Some(rest) = line.strip_prefix("Packager") {
            let packager = rest.trim_start_matches(|c| c == ' ' || c == ':').trim();
            if packager.is_empty() || packager == "Unknown Packager" {
                return None;
            }
            if packager.contains("@archlinux.org") {
                return Some("Arch Linux".to_string());
            }
            return Some(packager.to_string());
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    // -------------------------------------------------------------------------
    // Tests for executable_path
    // -------------------------------------------------------------------------

    #[test]
    fn test_executable_path_resolves_link() {
        let dir = tempdir().expect("Failed to create temp dir");
        std::os::unix::fs::symlink("/usr/bin/true", dir.path().join("exe"))
            .expect("Failed to create exe link");

        let exe = executable_path(dir.path()).expect("exe should resolve");
        assert_eq!(exe, PathBuf::from("/usr/bin/true"));
    }

    #[test]
    fn test_executable_path_missing_link() {
        let dir = tempdir().expect("Failed to create temp dir");
        assert!(matches!(
            executable_path(dir.path()),
            Err(PublisherError::ExecutableUnavailable)
        ));
    }

    // -------------------------------------------------------------------------
    // Tests for process_publisher
    // -------------------------------------------------------------------------

    #[test]
    fn test_process_publisher_no_such_process() {
        let root = tempdir().expect("Failed to create temp dir");
        assert!(matches!(
            process_publisher(root.path(), 424242),
            Err(PublisherError::NoSuchProcess(424242))
        ));
    }

    // -------------------------------------------------------------------------
    // Tests for output parsers
    // -------------------------------------------------------------------------

    #[test]
    fn test_parse_rpm_vendor() {
        assert_eq!(
            parse_rpm_vendor("Red Hat, Inc.\n"),
            Some("Red Hat, Inc.".to_string())
        );
        assert_eq!(parse_rpm_vendor("(none)\n"), None);
        assert_eq!(parse_rpm_vendor(""), None);
        assert_eq!(
            parse_rpm_vendor("file /usr/bin/foo is not owned by any package\n"),
            None
        );
    }

    #[test]
    fn test_parse_dpkg_owner() {
        assert_eq!(
            parse_dpkg_owner("coreutils: /usr/bin/true\n"),
            Some("coreutils".to_string())
        );
        // Diversion output lists several packages - first one wins
        assert_eq!(
            parse_dpkg_owner("dash, bash: /bin/sh\n"),
            Some("dash".to_string())
        );
        assert_eq!(parse_dpkg_owner(""), None);
    }

    #[test]
    fn test_parse_dpkg_maintainer() {
        assert_eq!(
            parse_dpkg_maintainer("Ubuntu Developers <ubuntu-devel-discuss@lists.ubuntu.com>\n"),
            Some("Ubuntu Developers <ubuntu-devel-discuss@lists.ubuntu.com>".to_string())
        );
        assert_eq!(parse_dpkg_maintainer("\n"), None);
    }

    #[test]
    fn test_parse_pacman_owner() {
        assert_eq!(
            parse_pacman_owner("/usr/bin/bash is owned by bash 5.2.026-2\n"),
            Some("bash".to_string())
        );
        assert_eq!(
            parse_pacman_owner("error: No package owns /usr/bin/foo\n"),
            None
        );
    }

    #[test]
    fn test_parse_pacman_packager() {
        let official = "Name            : bash\nPackager        : Some Dev <dev@archlinux.org>\n";
        assert_eq!(
            parse_pacman_packager(official),
            Some("Arch Linux".to_string())
        );

        let aur = "Name            : yay\nPackager        : Jane Builder <jane@example.com>\n";
        assert_eq!(
            parse_pacman_packager(aur),
            Some("Jane Builder <jane@example.com>".to_string())
        );

        let unknown = "Name            : local\nPackager        : Unknown Packager\n";
        assert_eq!(parse_pacman_packager(unknown), None);

        assert_eq!(parse_pacman_packager("Name : bash\n"), None);
    }
}
