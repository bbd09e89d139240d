//! RubyGems package updater.

use super::Updater;
use crate::platform;
use crate::runner::CommandRunner;

pub struct GemUpdater {
    cmd: CommandRunner,
}

impl GemUpdater {
    pub fn new(cmd: CommandRunner) -> Self {
        Self { cmd }
    }
}

impl Updater for GemUpdater {
    fn key(&self) -> &'static str {
        "gem"
    }

    fn display_name(&self) -> &'static str {
        "Gem"
    }

    fn is_available(&self) -> bool {
        self.cmd.command_exists("gem")
    }

    fn perform_update(&self) -> bool {
        let console = self.cmd.console();
        let name = self.display_name();

        if !self.is_available() {
            console.info(&format!("{name} is not installed - skipping"));
            return true;
        }

        console.info(&format!("{name}: updating packages..."));
        let program = if platform::is_windows() { "gem.cmd" } else { "gem" };
        if self.cmd.run(program, &["update"]).is_err() {
            return false;
        }
        console.success(&format!("{name} update finished"));
        true
    }
}
