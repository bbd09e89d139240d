//! Snap package updater.

use super::{Updater, count_lines_after_header};
use crate::runner::CommandRunner;

pub struct SnapUpdater {
    cmd: CommandRunner,
}

impl SnapUpdater {
    pub fn new(cmd: CommandRunner) -> Self {
        Self { cmd }
    }
}

impl Updater for SnapUpdater {
    fn key(&self) -> &'static str {
        "snap"
    }

    fn display_name(&self) -> &'static str {
        "Snap"
    }

    fn is_available(&self) -> bool {
        self.cmd.command_exists("snap")
    }

    fn pending_updates(&self) -> Option<u32> {
        let result = self.cmd.run_unchecked("snap", &["list"]).ok()?;
        if !result.success() {
            return None;
        }
        Some(count_lines_after_header(&result.stdout))
    }

    fn perform_update(&self) -> bool {
        let console = self.cmd.console();
        let name = self.display_name();

        if !self.is_available() {
            console.info(&format!("{name} is not installed - skipping"));
            return true;
        }

        let count = self.pending_updates().unwrap_or(0);
        console.info(&format!("{name} packages installed: {count}"));

        console.info(&format!("{name}: refreshing packages..."));
        if self.cmd.run("sudo", &["snap", "refresh"]).is_err() {
            return false;
        }
        console.success(&format!("{name} update finished"));
        true
    }
}
