//! uv tool updater.

use super::Updater;
use crate::runner::CommandRunner;

pub struct UvUpdater {
    cmd: CommandRunner,
}

impl UvUpdater {
    pub fn new(cmd: CommandRunner) -> Self {
        Self { cmd }
    }
}

impl Updater for UvUpdater {
    fn key(&self) -> &'static str {
        "uv"
    }

    fn display_name(&self) -> &'static str {
        "uv tool"
    }

    fn is_available(&self) -> bool {
        self.cmd.command_exists("uv")
    }

    fn perform_update(&self) -> bool {
        let console = self.cmd.console();
        let name = self.display_name();

        if !self.is_available() {
            console.info(&format!("{name} is not installed - skipping"));
            return true;
        }

        console.info(&format!("{name}: upgrading packages..."));
        if self.cmd.run("uv", &["tool", "upgrade", "--all"]).is_err() {
            return false;
        }
        console.success(&format!("{name} update finished"));
        true
    }
}
