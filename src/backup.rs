//! Package-list backups taken before a run.

use std::fs;
use std::path::PathBuf;
use std::time::Duration;

use chrono::Local;
use serde_json::json;

use crate::runner;

const LIST_TIMEOUT: Duration = Duration::from_secs(30);

type Collector = fn() -> Option<Vec<String>>;

const COLLECTORS: &[(&str, Collector)] = &[
    ("apt", apt_packages),
    ("snap", snap_packages),
    ("brew", brew_packages),
    ("npm", npm_packages),
    ("pipx", pipx_packages),
    ("cargo", cargo_packages),
    ("flatpak", flatpak_packages),
    ("gem", gem_packages),
];

/// Collects installed-package snapshots into timestamped JSON files.
pub struct BackupManager {
    backup_dir: PathBuf,
    enabled: bool,
}

impl BackupManager {
    pub fn new(backup_dir: PathBuf, enabled: bool) -> Self {
        if enabled {
            let _ = fs::create_dir_all(&backup_dir);
        }
        Self {
            backup_dir,
            enabled,
        }
    }

    /// Snapshot installed packages across managers.
    ///
    /// Returns the written file, or `None` when disabled or nothing could be
    /// written. Individual collector failures just drop that manager from
    /// the snapshot.
    pub fn create_backup(&self) -> Option<PathBuf> {
        if !self.enabled {
            return None;
        }

        let timestamp = Local::now().format("%Y%m%d_%H%M%S").to_string();
        let backup_file = self.backup_dir.join(format!("packages_{timestamp}.json"));

        let mut packages = serde_json::Map::new();
        for (key, collect) in COLLECTORS {
            if let Some(list) = collect() {
                if !list.is_empty() {
                    packages.insert((*key).to_string(), json!(list));
                }
            }
        }

        let payload = json!({ "timestamp": timestamp, "packages": packages });
        let rendered = serde_json::to_string_pretty(&payload).ok()?;
        fs::write(&backup_file, rendered).ok()?;
        Some(backup_file)
    }

    /// Backup files, newest first.
    pub fn list_backups(&self) -> Vec<PathBuf> {
        let Ok(entries) = fs::read_dir(&self.backup_dir) else {
            return Vec::new();
        };
        let mut backups: Vec<PathBuf> = entries
            .flatten()
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|name| name.to_str())
                    .is_some_and(|name| {
                        name.starts_with("packages_") && name.ends_with(".json")
                    })
            })
            .collect();
        backups.sort();
        backups.reverse();
        backups
    }

    /// Delete everything beyond the `keep_count` newest backups.
    pub fn cleanup_old_backups(&self, keep_count: usize) -> usize {
        let backups = self.list_backups();
        if backups.len() <= keep_count {
            return 0;
        }
        let mut deleted = 0;
        for backup_file in &backups[keep_count..] {
            if fs::remove_file(backup_file).is_ok() {
                deleted += 1;
            }
        }
        deleted
    }
}

fn capture(program: &str, args: &[&str]) -> Option<String> {
    let output = runner::run_output(program, args, LIST_TIMEOUT).ok()?;
    if !output.status.success() {
        return None;
    }
    Some(String::from_utf8_lossy(&output.stdout).to_string())
}

fn nonempty_lines(stdout: &str) -> Vec<String> {
    stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(str::to_string)
        .collect()
}

fn apt_packages() -> Option<Vec<String>> {
    let stdout = capture("dpkg", &["--get-selections"])?;
    Some(
        stdout
            .lines()
            .filter_map(|line| {
                let mut parts = line.split_whitespace();
                let name = parts.next()?;
                (parts.next()? == "install").then(|| name.to_string())
            })
            .collect(),
    )
}

fn snap_packages() -> Option<Vec<String>> {
    let stdout = capture("snap", &["list"])?;
    Some(
        stdout
            .lines()
            .skip(1)
            .filter_map(|line| line.split_whitespace().next().map(str::to_string))
            .collect(),
    )
}

fn brew_packages() -> Option<Vec<String>> {
    let stdout = capture("brew", &["list", "--formula"])?;
    Some(nonempty_lines(&stdout))
}

fn npm_packages() -> Option<Vec<String>> {
    let stdout = capture("npm", &["list", "-g", "--depth=0", "--json"])?;
    let data: serde_json::Value = serde_json::from_str(&stdout).ok()?;
    let deps = data.get("dependencies").and_then(|value| value.as_object());
    Some(
        deps.map(|object| object.keys().cloned().collect())
            .unwrap_or_default(),
    )
}

fn pipx_packages() -> Option<Vec<String>> {
    let stdout = capture("pipx", &["list", "--short"])?;
    Some(nonempty_lines(&stdout))
}

fn cargo_packages() -> Option<Vec<String>> {
    let stdout = capture("cargo", &["install", "--list"])?;
    // Top-level lines name the crate; indented lines list its binaries.
    Some(
        stdout
            .lines()
            .filter(|line| !line.is_empty() && !line.starts_with(' '))
            .filter_map(|line| line.split_whitespace().next().map(str::to_string))
            .collect(),
    )
}

fn flatpak_packages() -> Option<Vec<String>> {
    let stdout = capture("flatpak", &["list", "--app", "--columns=application"])?;
    Some(nonempty_lines(&stdout))
}

fn gem_packages() -> Option<Vec<String>> {
    let stdout = capture("gem", &["list", "--no-versions"])?;
    Some(nonempty_lines(&stdout))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_prefers_newest_and_prunes_the_rest() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let manager = BackupManager::new(dir.path().to_path_buf(), true);
        for stamp in ["20240101_000000", "20240102_000000", "20240103_000000"] {
            fs::write(dir.path().join(format!("packages_{stamp}.json")), "{}")
                .expect("write backup");
        }
        fs::write(dir.path().join("notes.txt"), "ignored").expect("write file");

        let backups = manager.list_backups();
        assert_eq!(backups.len(), 3);
        assert!(
            backups[0]
                .file_name()
                .and_then(|name| name.to_str())
                .is_some_and(|name| name.contains("20240103"))
        );

        assert_eq!(manager.cleanup_old_backups(1), 2);
        assert_eq!(manager.list_backups().len(), 1);
        assert_eq!(manager.cleanup_old_backups(1), 0);
    }

    #[test]
    fn disabled_manager_never_writes() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let manager = BackupManager::new(dir.path().join("backups"), false);
        assert!(manager.create_backup().is_none());
        assert!(!dir.path().join("backups").exists());
    }
}
