//! Pre-run system checks: disk space, network, sudo, daily throttle,
//! reboot sentinel, and the process-exclusivity lock.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use chrono::Local;
use sysinfo::{Disks, Pid, System};

use crate::console::Console;
use crate::platform;
use crate::runner::{self, PROBE_TIMEOUT};

const LOCK_FILE: &str = "sysup.lock";
const PID_FILE: &str = "sysup.pid";
const DAILY_RUN_FILE: &str = "daily_run";
const REBOOT_SENTINEL: &str = "/var/run/reboot-required";
const NETWORK_PROBE_HOSTS: [&str; 2] = ["8.8.8.8", "1.1.1.1"];

const BYTES_PER_GB: f64 = (1024 * 1024 * 1024) as f64;

/// Free-space floor applied when the caller has no stronger opinion.
pub const MIN_FREE_SPACE_GB: f64 = 1.0;

/// Pre-flight checker; all checks are stateless except the daily-run marker
/// and the process lock, which live in `cache_dir`.
pub struct SystemChecker {
    console: Console,
    cache_dir: PathBuf,
}

impl SystemChecker {
    /// Create a checker, making sure the cache directory exists.
    pub fn new(console: Console, cache_dir: PathBuf) -> Result<Self> {
        fs::create_dir_all(&cache_dir)
            .with_context(|| format!("failed to create cache dir {}", cache_dir.display()))?;
        Ok(Self { console, cache_dir })
    }

    /// Check free space on the root filesystem. Probe errors fail closed.
    pub fn check_disk_space(&self, min_space_gb: f64) -> bool {
        match free_root_space_bytes() {
            Some(free) => self.evaluate_disk_space(free as f64 / BYTES_PER_GB, min_space_gb),
            None => {
                self.console.error("disk space check failed: no filesystems visible");
                false
            }
        }
    }

    fn evaluate_disk_space(&self, free_gb: f64, min_space_gb: f64) -> bool {
        if free_gb < min_space_gb {
            self.console.warning(&low_space_message(free_gb));
            return false;
        }
        self.console
            .info(&format!("disk space: {free_gb:.1}GB available"));
        true
    }

    /// Single-packet ping probes against public resolvers; first hit wins.
    pub fn check_network(&self) -> bool {
        for host in NETWORK_PROBE_HOSTS {
            let status = if platform::is_windows() {
                runner::run_status("ping", &["-n", "1", "-w", "1000", host], Duration::from_secs(3))
            } else {
                runner::run_status("ping", &["-c", "1", "-W", "3", host], PROBE_TIMEOUT)
            };
            if status.map(|status| status.success()).unwrap_or(false) {
                self.console.info("network connectivity: ok");
                return true;
            }
        }
        self.console.warning("network connectivity problems detected");
        false
    }

    /// Probe for passwordless sudo. Advisory; the orchestrator decides how
    /// hard to fail.
    pub fn check_sudo_available(&self) -> bool {
        match runner::run_status("sudo", &["-n", "true"], PROBE_TIMEOUT) {
            Ok(status) if status.success() => true,
            Ok(_) => {
                self.console
                    .warning("some operations need administrator privileges");
                false
            }
            Err(_) => false,
        }
    }

    /// Daily throttle: false when the marker already carries today's date.
    /// Rewrites the marker to today when the run is allowed to proceed.
    pub fn check_daily_run(&self) -> bool {
        let marker = self.cache_dir.join(DAILY_RUN_FILE);
        let today = Local::now().date_naive().to_string();

        if marker.exists() {
            match fs::read_to_string(&marker) {
                Ok(last_run) if last_run.trim() == today => {
                    self.console.info(&format!("already ran today: {today}"));
                    return false;
                }
                Ok(_) => {}
                Err(err) => {
                    // Unreadable marker counts as not-yet-run.
                    self.console
                        .warning(&format!("failed to read daily-run marker: {err}"));
                }
            }
        }

        if let Err(err) = fs::write(&marker, &today) {
            self.console
                .warning(&format!("failed to write daily-run marker: {err}"));
        }
        true
    }

    /// Debian-family reboot sentinel at its well-known path.
    pub fn check_reboot_required(&self) -> bool {
        self.check_reboot_required_at(Path::new(REBOOT_SENTINEL))
    }

    /// Sentinel-file check with an explicit path.
    pub fn check_reboot_required_at(&self, sentinel: &Path) -> bool {
        if !sentinel.exists() {
            return false;
        }
        self.console.warning("system reboot required");

        let pkgs_file = sentinel.with_extension("pkgs");
        if let Ok(raw) = fs::read_to_string(&pkgs_file) {
            self.console.info("packages requesting the reboot:");
            for pkg in raw.lines().filter(|line| !line.trim().is_empty()) {
                self.console.info(&format!("  - {pkg}"));
            }
        }
        true
    }

    /// Acquire the process lock, reclaiming stale or malformed lock files.
    /// Returns false when another live sysup process holds it.
    pub fn check_process_lock(&self) -> bool {
        let lock_file = self.cache_dir.join(LOCK_FILE);
        let pid_file = self.cache_dir.join(PID_FILE);

        if lock_file.exists() && pid_file.exists() {
            let recorded = fs::read_to_string(&pid_file)
                .ok()
                .and_then(|raw| raw.trim().parse::<u32>().ok());
            if let Some(pid) = recorded {
                if process_alive(pid) {
                    self.console
                        .error(&format!("sysup is already running (PID: {pid})"));
                    return false;
                }
            }
            // Dead owner or unparseable pid file: reclaim.
            let _ = fs::remove_file(&lock_file);
            let _ = fs::remove_file(&pid_file);
        }

        if let Err(err) = fs::write(&pid_file, std::process::id().to_string()) {
            self.console.error(&format!("failed to write pid file: {err}"));
            return false;
        }
        if let Err(err) = fs::write(&lock_file, "") {
            self.console
                .error(&format!("failed to write lock file: {err}"));
            return false;
        }
        true
    }

    /// Remove both lock files. Safe to call when they are already gone.
    pub fn cleanup_lock(&self) {
        let _ = fs::remove_file(self.cache_dir.join(LOCK_FILE));
        let _ = fs::remove_file(self.cache_dir.join(PID_FILE));
    }

    /// RAII handle that releases the lock on every exit path that unwinds
    /// or returns; a hard kill leaves a stale lock for the next run to
    /// reclaim.
    pub fn lock_guard(&self) -> LockGuard<'_> {
        LockGuard { checker: self }
    }
}

/// Releases the process lock when dropped.
pub struct LockGuard<'a> {
    checker: &'a SystemChecker,
}

impl Drop for LockGuard<'_> {
    fn drop(&mut self) {
        self.checker.cleanup_lock();
    }
}

fn low_space_message(free_gb: f64) -> String {
    format!("low disk space: {free_gb:.1}GB available")
}

/// Available bytes on the filesystem mounted at `/`, or on the first disk
/// sysinfo reports when nothing is mounted there (non-Unix layouts).
fn free_root_space_bytes() -> Option<u64> {
    let disks = Disks::new_with_refreshed_list();
    let root = Path::new("/");
    let mut fallback = None;
    for disk in disks.list() {
        if disk.mount_point() == root {
            return Some(disk.available_space());
        }
        fallback.get_or_insert(disk.available_space());
    }
    fallback
}

fn process_alive(pid: u32) -> bool {
    let mut system = System::new();
    system.refresh_process(Pid::from_u32(pid));
    system.process(Pid::from_u32(pid)).is_some()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn low_space_message_keeps_one_decimal() {
        assert_eq!(low_space_message(0.5), "low disk space: 0.5GB available");
        assert_eq!(low_space_message(12.04), "low disk space: 12.0GB available");
    }

    #[test]
    fn evaluate_disk_space_compares_against_threshold() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let checker =
            SystemChecker::new(Console, dir.path().to_path_buf()).expect("checker");
        assert!(!checker.evaluate_disk_space(0.5, 1.0));
        assert!(checker.evaluate_disk_space(10.0, 1.0));
    }

    #[test]
    fn own_process_is_alive_and_bogus_pid_is_not() {
        assert!(process_alive(std::process::id()));
        assert!(!process_alive(999_999_999));
    }
}
