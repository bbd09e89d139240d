//! npm global package updater.

use super::Updater;
use crate::platform;
use crate::runner::CommandRunner;

pub struct NpmUpdater {
    cmd: CommandRunner,
}

impl NpmUpdater {
    pub fn new(cmd: CommandRunner) -> Self {
        Self { cmd }
    }
}

impl Updater for NpmUpdater {
    fn key(&self) -> &'static str {
        "npm"
    }

    fn display_name(&self) -> &'static str {
        "npm"
    }

    fn is_available(&self) -> bool {
        self.cmd.command_exists("npm")
    }

    fn perform_update(&self) -> bool {
        let console = self.cmd.console();
        let name = self.display_name();

        if !self.is_available() {
            console.info(&format!("{name} is not installed - skipping"));
            return true;
        }

        console.info(&format!("{name}: updating global packages..."));
        // The PATH entry on Windows is a cmd wrapper.
        let program = if platform::is_windows() { "npm.cmd" } else { "npm" };
        if self.cmd.run(program, &["update", "-g"]).is_err() {
            return false;
        }
        console.success(&format!("{name} update finished"));
        true
    }
}
