//! sysup configuration loaded from sysup.toml.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::platform;

#[derive(Debug, Default, Serialize, Deserialize)]
/// Top-level sysup.toml representation.
pub struct SysupConfig {
    #[serde(default)]
    pub updaters: UpdatersConfig,
    #[serde(default)]
    pub auto_run: AutoRunConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub backup: BackupConfig,
    #[serde(default)]
    pub notification: NotificationConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

#[derive(Debug, Serialize, Deserialize)]
/// Per-updater enable flags.
pub struct UpdatersConfig {
    #[serde(default = "default_true")]
    pub apt: bool,
    #[serde(default = "default_true")]
    pub snap: bool,
    #[serde(default)]
    pub flatpak: bool,
    #[serde(default = "default_true")]
    pub pipx: bool,
    #[serde(default = "default_true")]
    pub uv: bool,
    #[serde(default = "default_true")]
    pub npm: bool,
    #[serde(default = "default_true")]
    pub nvm: bool,
    #[serde(default = "default_true")]
    pub rustup: bool,
    #[serde(default = "default_true")]
    pub cargo: bool,
    #[serde(default)]
    pub gem: bool,
    #[serde(default = "default_true")]
    pub brew: bool,
    #[serde(default)]
    pub scoop: bool,
    #[serde(default)]
    pub firmware: bool,
}

impl Default for UpdatersConfig {
    fn default() -> Self {
        Self {
            apt: true,
            snap: true,
            flatpak: false,
            pipx: true,
            uv: true,
            npm: true,
            nvm: true,
            rustup: true,
            cargo: true,
            gem: false,
            brew: true,
            scoop: false,
            firmware: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
/// Supported auto-run modes for login-hook integration.
pub enum AutoRunMode {
    #[default]
    Disabled,
    Enabled,
    EnabledWithAuth,
}

#[derive(Debug, Default, Serialize, Deserialize)]
/// Auto-run settings.
pub struct AutoRunConfig {
    #[serde(default)]
    pub mode: AutoRunMode,
}

#[derive(Debug, Serialize, Deserialize)]
/// Log directory, retention and level.
pub struct LoggingConfig {
    #[serde(default = "default_log_dir")]
    pub dir: String,
    #[serde(default = "default_retention_days")]
    pub retention_days: u32,
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_log_dir(),
            retention_days: default_retention_days(),
            level: default_log_level(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
/// Package-list backup settings.
pub struct BackupConfig {
    #[serde(default = "default_backup_dir")]
    pub dir: String,
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for BackupConfig {
    fn default() -> Self {
        Self {
            dir: default_backup_dir(),
            enabled: true,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
/// Desktop notification settings.
pub struct NotificationConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_true")]
    pub on_success: bool,
    #[serde(default = "default_true")]
    pub on_error: bool,
    #[serde(default)]
    pub on_warning: bool,
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            on_success: true,
            on_error: true,
            on_warning: false,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
/// General run settings.
pub struct GeneralConfig {
    #[serde(default)]
    pub parallel_updates: bool,
    #[serde(default)]
    pub dry_run: bool,
    #[serde(default = "default_cache_dir")]
    pub cache_dir: String,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            parallel_updates: false,
            dry_run: false,
            cache_dir: default_cache_dir(),
        }
    }
}

impl SysupConfig {
    /// Load from an explicit path, the search path, or built-in defaults.
    pub fn load(config_path: Option<&Path>) -> Result<Self> {
        if let Some(path) = config_path {
            return Self::load_file(path);
        }
        for path in Self::search_paths() {
            if path.exists() {
                return Self::load_file(&path);
            }
        }
        Ok(Self::default())
    }

    /// Candidate config locations, most specific first.
    pub fn search_paths() -> Vec<PathBuf> {
        let mut paths = Vec::new();
        if let Some(home) = platform::home_dir() {
            paths.push(home.join(".config").join("sysup").join("sysup.toml"));
            paths.push(home.join(".sysup.toml"));
        }
        paths.push(PathBuf::from("/etc/sysup/sysup.toml"));
        paths
    }

    /// Location written by the setup wizard.
    pub fn default_path() -> Option<PathBuf> {
        platform::home_dir().map(|home| home.join(".config").join("sysup").join("sysup.toml"))
    }

    fn load_file(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read config at {}", path.display()))?;
        let config = toml::from_str(&raw)
            .with_context(|| format!("failed to parse {}", path.display()))?;
        Ok(config)
    }

    pub fn log_dir(&self) -> PathBuf {
        expand_user(&self.logging.dir)
    }

    pub fn backup_dir(&self) -> PathBuf {
        expand_user(&self.backup.dir)
    }

    pub fn cache_dir(&self) -> PathBuf {
        expand_user(&self.general.cache_dir)
    }

    /// Whether the named updater is enabled; unknown names are disabled.
    pub fn is_updater_enabled(&self, name: &str) -> bool {
        let updaters = &self.updaters;
        match name {
            "apt" => updaters.apt,
            "snap" => updaters.snap,
            "flatpak" => updaters.flatpak,
            "pipx" => updaters.pipx,
            "uv" => updaters.uv,
            "npm" => updaters.npm,
            "nvm" => updaters.nvm,
            "rustup" => updaters.rustup,
            "cargo" => updaters.cargo,
            "gem" => updaters.gem,
            "brew" => updaters.brew,
            "scoop" => updaters.scoop,
            "firmware" => updaters.firmware,
            _ => false,
        }
    }

    /// Set the enable flag for the named updater; unknown names are ignored.
    pub fn set_updater_enabled(&mut self, name: &str, enabled: bool) {
        let updaters = &mut self.updaters;
        match name {
            "apt" => updaters.apt = enabled,
            "snap" => updaters.snap = enabled,
            "flatpak" => updaters.flatpak = enabled,
            "pipx" => updaters.pipx = enabled,
            "uv" => updaters.uv = enabled,
            "npm" => updaters.npm = enabled,
            "nvm" => updaters.nvm = enabled,
            "rustup" => updaters.rustup = enabled,
            "cargo" => updaters.cargo = enabled,
            "gem" => updaters.gem = enabled,
            "brew" => updaters.brew = enabled,
            "scoop" => updaters.scoop = enabled,
            "firmware" => updaters.firmware = enabled,
            _ => {}
        }
    }
}

/// Expand a leading `~/` against the home directory.
pub fn expand_user(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = platform::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}

fn default_true() -> bool {
    true
}

fn default_log_dir() -> String {
    "~/.local/share/sysup".to_string()
}

fn default_retention_days() -> u32 {
    30
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_backup_dir() -> String {
    "~/.local/share/sysup/backups".to_string()
}

fn default_cache_dir() -> String {
    "~/.cache/sysup".to_string()
}
