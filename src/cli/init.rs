//! The interactive setup wizard behind `sysup init`.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};

use crate::config::{AutoRunMode, SysupConfig};
use crate::console::Console;
use crate::runner::{self, PROBE_TIMEOUT};

/// Config key, probed binary, and description for every known manager.
const MANAGER_PROBES: &[(&str, &str, &str)] = &[
    ("apt", "apt", "Debian/Ubuntu package manager"),
    ("snap", "snap", "Snap package manager"),
    ("flatpak", "flatpak", "Flatpak package manager"),
    ("pipx", "pipx", "Python CLI application manager"),
    ("uv", "uv", "Python package and project manager"),
    ("npm", "npm", "Node.js package manager"),
    ("nvm", "node", "Node.js version manager"),
    ("rustup", "rustup", "Rust toolchain manager"),
    ("cargo", "cargo", "Cargo package manager"),
    ("gem", "gem", "RubyGems package manager"),
    ("brew", "brew", "Homebrew package manager"),
    ("scoop", "scoop", "Scoop package manager"),
    ("firmware", "fwupdmgr", "firmware updates"),
];

enum ExistingAction {
    Continue,
    Keep,
    Reset,
}

/// Handle the init subcommand.
pub fn handle_init() -> Result<()> {
    let console = Console;
    console.section("sysup setup wizard");
    console.info("welcome! this wizard walks through the initial setup.");

    let existing = SysupConfig::search_paths().into_iter().find(|p| p.exists());
    let mut config = match &existing {
        Some(path) => match existing_config_action(console, path)? {
            ExistingAction::Continue => SysupConfig::load(Some(path.as_path()))?,
            ExistingAction::Keep => {
                console.success("keeping the current configuration; enjoy sysup!");
                return Ok(());
            }
            ExistingAction::Reset => {
                let backup = path.with_extension("toml.bak");
                fs::copy(path, &backup)
                    .with_context(|| format!("failed to back up {}", path.display()))?;
                console.info(&format!("saved the old configuration to {}", backup.display()));
                SysupConfig::default()
            }
        },
        None => SysupConfig::default(),
    };

    let detected = step_detect(console);
    step_run_mode(console, &mut config);
    step_select_updaters(console, &mut config, &detected);
    step_options(console, &mut config);
    step_write(console, &config)?;
    Ok(())
}

fn existing_config_action(console: Console, path: &Path) -> Result<ExistingAction> {
    console.warning(&format!("found an existing configuration: {}", path.display()));
    console.info("  1. continue setup (update the existing configuration)");
    console.info("  2. skip setup (keep the current configuration)");
    console.info("  3. reset (start over from the defaults)");

    Ok(match console.choose("selection", &["1", "2", "3"], "1").as_str() {
        "1" => ExistingAction::Continue,
        "2" => ExistingAction::Keep,
        _ => ExistingAction::Reset,
    })
}

/// Step 1: probe which package managers actually work here.
fn step_detect(console: Console) -> Vec<(&'static str, bool)> {
    console.section("step 1/5: detecting package managers");

    let detected: Vec<(&'static str, bool)> = MANAGER_PROBES
        .iter()
        .map(|(key, binary, _)| (*key, runner::command_exists(binary) && probe_runnable(binary)))
        .collect();

    let found: Vec<&str> = detected
        .iter()
        .filter(|(_, available)| *available)
        .map(|(key, _)| *key)
        .collect();
    if found.is_empty() {
        console.warning("no package managers found");
    } else {
        console.info("detected the following package managers:");
        for key in &found {
            console.info(&format!("  • {} ({})", key, describe_manager(key)));
        }
    }
    console.success("detection finished");
    detected
}

/// A binary on the PATH can still be broken; run it once to be sure.
fn probe_runnable(binary: &str) -> bool {
    runner::run_status(binary, &["--version"], PROBE_TIMEOUT)
        .map(|status| status.success())
        .unwrap_or(false)
}

fn describe_manager(key: &str) -> &'static str {
    MANAGER_PROBES
        .iter()
        .find(|(probe_key, _, _)| *probe_key == key)
        .map(|(_, _, description)| *description)
        .unwrap_or("")
}

/// Step 2: attended or unattended operation.
fn step_run_mode(console: Console, config: &mut SysupConfig) {
    console.section("step 2/5: choosing the run mode");
    console.info("  1. standard mode (interactive, manual runs)");
    console.info("  2. automatic mode (cron or login hook)");
    console.info("  3. skip (decide later)");

    config.auto_run.mode = match console.choose("selection", &["1", "2", "3"], "1").as_str() {
        "2" => AutoRunMode::Enabled,
        _ => AutoRunMode::Disabled,
    };
}

/// Step 3: which updaters to enable.
fn step_select_updaters(
    console: Console,
    config: &mut SysupConfig,
    detected: &[(&'static str, bool)],
) {
    console.section("step 3/5: selecting updaters");

    let available: Vec<&str> = detected
        .iter()
        .filter(|(_, found)| *found)
        .map(|(key, _)| *key)
        .collect();
    if available.is_empty() {
        console.warning("nothing detected; leaving the configured defaults in place");
        return;
    }

    if console.confirm_default("Enable all detected package managers?", true) {
        for (key, found) in detected {
            config.set_updater_enabled(key, *found);
        }
        return;
    }

    for key in available {
        let enabled = console.confirm_default(
            &format!("enable {} ({})?", key, describe_manager(key)),
            true,
        );
        config.set_updater_enabled(key, enabled);
    }
    for (key, found) in detected {
        if !found {
            config.set_updater_enabled(key, false);
        }
    }
}

/// Step 4: backup, notification, and parallelism options.
fn step_options(console: Console, config: &mut SysupConfig) {
    console.section("step 4/5: options");

    config.backup.enabled =
        console.confirm_default("Back up package lists before each run?", true);
    config.notification.enabled =
        console.confirm_default("Send desktop notifications?", true);
    config.general.parallel_updates =
        console.confirm_default("Run updaters in parallel?", false);
}

/// Step 5: write the configuration file.
fn step_write(console: Console, config: &SysupConfig) -> Result<()> {
    console.section("step 5/5: writing the configuration");

    let Some(path) = SysupConfig::default_path() else {
        bail!("cannot determine the configuration path (HOME is not set)");
    };
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create {}", parent.display()))?;
    }
    let rendered = toml::to_string_pretty(config).context("failed to render configuration")?;
    fs::write(&path, rendered)
        .with_context(|| format!("failed to write {}", path.display()))?;

    console.success(&format!("configuration written to {}", path.display()));
    console.info("run `sysup update` to bring the system up to date");
    Ok(())
}
