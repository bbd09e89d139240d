//! Updater units, one per external package manager.
//!
//! Return convention for `perform_update`: `true` covers both success and
//! "tool not installed, nothing to do"; `false` means the tool was available
//! but an update step failed. The orchestrator records an unavailable tool as
//! a skip before `perform_update` is ever called; the no-op `true` inside
//! `perform_update` only matters for direct callers that bypass the
//! availability pre-check. The two paths are intentionally distinct.

mod apt;
mod brew;
mod cargo;
mod firmware;
mod flatpak;
mod gem;
mod npm;
mod nvm;
mod pipx;
mod rustup;
mod scoop;
mod snap;
mod uv;

pub use apt::AptUpdater;
pub use brew::BrewUpdater;
pub use cargo::CargoUpdater;
pub use firmware::FirmwareUpdater;
pub use flatpak::FlatpakUpdater;
pub use gem::GemUpdater;
pub use npm::NpmUpdater;
pub use nvm::NvmUpdater;
pub use pipx::PipxUpdater;
pub use rustup::RustupUpdater;
pub use scoop::ScoopUpdater;
pub use snap::SnapUpdater;
pub use uv::UvUpdater;

use crate::config::SysupConfig;
use crate::console::Console;
use crate::runner::CommandRunner;

/// One integration unit wrapping a single package manager.
pub trait Updater: Send + Sync {
    /// Stable identifier used in configuration and statistics.
    fn key(&self) -> &'static str;

    /// Human-readable label.
    fn display_name(&self) -> &'static str;

    /// True only when the platform supports the tool and its binary resolves.
    fn is_available(&self) -> bool;

    /// Best-effort count of pending updates; `None` when unknown.
    fn pending_updates(&self) -> Option<u32> {
        None
    }

    /// Run the update action. See the module docs for the return convention.
    fn perform_update(&self) -> bool;
}

/// All known updaters in dispatch order.
pub fn all_updaters(console: Console, dry_run: bool) -> Vec<Box<dyn Updater>> {
    let cmd = CommandRunner::new(console, dry_run);
    vec![
        Box::new(AptUpdater::new(cmd)),
        Box::new(SnapUpdater::new(cmd)),
        Box::new(BrewUpdater::new(cmd)),
        Box::new(ScoopUpdater::new(cmd)),
        Box::new(NpmUpdater::new(cmd)),
        Box::new(PipxUpdater::new(cmd)),
        Box::new(UvUpdater::new(cmd)),
        Box::new(RustupUpdater::new(cmd)),
        Box::new(CargoUpdater::new(cmd)),
        Box::new(FlatpakUpdater::new(cmd)),
        Box::new(GemUpdater::new(cmd)),
        Box::new(NvmUpdater::new(cmd)),
        Box::new(FirmwareUpdater::new(cmd)),
    ]
}

/// Updaters enabled by the configuration, in declaration order.
pub fn enabled_updaters(config: &SysupConfig, console: Console) -> Vec<Box<dyn Updater>> {
    all_updaters(console, config.general.dry_run)
        .into_iter()
        .filter(|updater| config.is_updater_enabled(updater.key()))
        .collect()
}

/// Count listing lines after a header row; header-only or empty output is
/// zero pending updates, not unknown.
pub(crate) fn count_lines_after_header(stdout: &str) -> u32 {
    let lines: Vec<&str> = stdout
        .lines()
        .filter(|line| !line.trim().is_empty())
        .collect();
    lines.len().saturating_sub(1) as u32
}

/// Count non-empty listing lines.
pub(crate) fn count_nonempty_lines(stdout: &str) -> u32 {
    stdout.lines().filter(|line| !line.trim().is_empty()).count() as u32
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_only_listing_counts_as_zero() {
        assert_eq!(count_lines_after_header("Listing... Done\n"), 0);
        assert_eq!(count_lines_after_header(""), 0);
        assert_eq!(
            count_lines_after_header("Listing... Done\nfoo/stable 1.0 amd64\nbar/stable 2.0 amd64\n"),
            2
        );
    }

    #[test]
    fn nonempty_line_count_ignores_blanks() {
        assert_eq!(count_nonempty_lines(""), 0);
        assert_eq!(count_nonempty_lines("wget\n\ncurl\n"), 2);
    }

    #[test]
    fn registry_keys_are_unique_and_ordered() {
        let updaters = all_updaters(Console, true);
        let keys: Vec<&str> = updaters.iter().map(|updater| updater.key()).collect();
        assert_eq!(keys.first().copied(), Some("apt"));
        assert_eq!(keys.len(), 13);
        let mut deduped = keys.clone();
        deduped.sort_unstable();
        deduped.dedup();
        assert_eq!(deduped.len(), keys.len());
    }
}
