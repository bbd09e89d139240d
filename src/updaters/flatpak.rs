//! Flatpak application updater.

use super::Updater;
use crate::runner::CommandRunner;

pub struct FlatpakUpdater {
    cmd: CommandRunner,
}

impl FlatpakUpdater {
    pub fn new(cmd: CommandRunner) -> Self {
        Self { cmd }
    }
}

impl Updater for FlatpakUpdater {
    fn key(&self) -> &'static str {
        "flatpak"
    }

    fn display_name(&self) -> &'static str {
        "Flatpak"
    }

    fn is_available(&self) -> bool {
        self.cmd.command_exists("flatpak")
    }

    fn perform_update(&self) -> bool {
        let console = self.cmd.console();
        let name = self.display_name();

        if !self.is_available() {
            console.info(&format!("{name} is not installed - skipping"));
            return true;
        }

        console.info(&format!("{name}: updating applications..."));
        if self.cmd.run("flatpak", &["update", "-y"]).is_err() {
            return false;
        }
        console.success(&format!("{name} update finished"));
        true
    }
}
