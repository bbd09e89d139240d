//! Homebrew package updater.

use super::{Updater, count_nonempty_lines};
use crate::runner::CommandRunner;

pub struct BrewUpdater {
    cmd: CommandRunner,
}

impl BrewUpdater {
    pub fn new(cmd: CommandRunner) -> Self {
        Self { cmd }
    }
}

impl Updater for BrewUpdater {
    fn key(&self) -> &'static str {
        "brew"
    }

    fn display_name(&self) -> &'static str {
        "Homebrew"
    }

    fn is_available(&self) -> bool {
        self.cmd.command_exists("brew")
    }

    fn pending_updates(&self) -> Option<u32> {
        let result = self
            .cmd
            .run_unchecked("brew", &["outdated", "--quiet"])
            .ok()?;
        if !result.success() {
            return None;
        }
        Some(count_nonempty_lines(&result.stdout))
    }

    fn perform_update(&self) -> bool {
        let console = self.cmd.console();
        let name = self.display_name();

        if !self.is_available() {
            console.info(&format!("{name} is not installed - skipping"));
            return true;
        }

        console.info(&format!("{name}: refreshing package lists..."));
        if self.cmd.run("brew", &["update"]).is_err() {
            return false;
        }
        console.success(&format!("{name} package lists refreshed"));

        let outdated = self.pending_updates().unwrap_or(0);
        console.info(&format!("outdated {name} packages: {outdated}"));

        if outdated > 0 {
            console.info(&format!("{name}: upgrading packages..."));
            if self.cmd.run("brew", &["upgrade"]).is_err() {
                return false;
            }
            console.success(&format!("{name} packages upgraded"));
        } else {
            console.info(&format!("all {name} packages are up to date"));
        }

        console.info(&format!("{name}: cleaning up..."));
        let _ = self.cmd.run_unchecked("brew", &["cleanup"]);

        console.success(&format!("{name} update finished"));
        true
    }
}
