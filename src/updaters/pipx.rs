//! pipx-managed application updater.

use super::Updater;
use crate::runner::CommandRunner;

pub struct PipxUpdater {
    cmd: CommandRunner,
}

impl PipxUpdater {
    pub fn new(cmd: CommandRunner) -> Self {
        Self { cmd }
    }
}

impl Updater for PipxUpdater {
    fn key(&self) -> &'static str {
        "pipx"
    }

    fn display_name(&self) -> &'static str {
        "pipx"
    }

    fn is_available(&self) -> bool {
        self.cmd.command_exists("pipx")
    }

    fn perform_update(&self) -> bool {
        let console = self.cmd.console();
        let name = self.display_name();

        if !self.is_available() {
            console.info(&format!("{name} is not installed - skipping"));
            return true;
        }

        console.info(&format!("{name}: upgrading packages..."));
        if self.cmd.run("pipx", &["upgrade-all"]).is_err() {
            return false;
        }
        console.success(&format!("{name} update finished"));
        true
    }
}
