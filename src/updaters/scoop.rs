//! Scoop package updater, Windows only.

use super::Updater;
use crate::platform;
use crate::runner::CommandRunner;

/// Updates Scoop itself, then every installed package.
pub struct ScoopUpdater {
    cmd: CommandRunner,
}

impl ScoopUpdater {
    pub fn new(cmd: CommandRunner) -> Self {
        Self { cmd }
    }
}

impl Updater for ScoopUpdater {
    fn key(&self) -> &'static str {
        "scoop"
    }

    fn display_name(&self) -> &'static str {
        "Scoop"
    }

    fn is_available(&self) -> bool {
        // Windows-only tool; no point probing the search path elsewhere.
        if !platform::is_windows() {
            return false;
        }
        self.cmd.command_exists("scoop")
    }

    fn perform_update(&self) -> bool {
        let console = self.cmd.console();
        let name = self.display_name();

        if !self.is_available() {
            console.info(&format!("{name} is not installed - skipping"));
            return true;
        }

        console.info(&format!("{name}: updating itself..."));
        if self.cmd.run("scoop", &["update"]).is_err() {
            return false;
        }

        console.info(&format!("{name}: updating packages..."));
        if self.cmd.run("scoop", &["update", "*"]).is_err() {
            return false;
        }

        console.info(&format!("{name}: cleaning up old versions..."));
        let _ = self.cmd.run_unchecked("scoop", &["cleanup", "*"]);

        console.success(&format!("{name} update finished"));
        true
    }
}
