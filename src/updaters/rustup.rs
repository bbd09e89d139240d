//! Rust toolchain updater.

use super::Updater;
use crate::runner::CommandRunner;

pub struct RustupUpdater {
    cmd: CommandRunner,
}

impl RustupUpdater {
    pub fn new(cmd: CommandRunner) -> Self {
        Self { cmd }
    }
}

impl Updater for RustupUpdater {
    fn key(&self) -> &'static str {
        "rustup"
    }

    fn display_name(&self) -> &'static str {
        "Rustup"
    }

    fn is_available(&self) -> bool {
        self.cmd.command_exists("rustup")
    }

    fn perform_update(&self) -> bool {
        let console = self.cmd.console();
        let name = self.display_name();

        if !self.is_available() {
            console.info(&format!("{name} is not installed - skipping"));
            return true;
        }

        console.info(&format!("updating {name}..."));
        if self.cmd.run("rustup", &["update"]).is_err() {
            return false;
        }
        console.success(&format!("{name} update finished"));
        true
    }
}
