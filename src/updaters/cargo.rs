//! Cargo-installed binary updater via cargo-install-update.

use super::Updater;
use crate::runner::CommandRunner;

pub struct CargoUpdater {
    cmd: CommandRunner,
}

impl CargoUpdater {
    pub fn new(cmd: CommandRunner) -> Self {
        Self { cmd }
    }
}

impl Updater for CargoUpdater {
    fn key(&self) -> &'static str {
        "cargo"
    }

    fn display_name(&self) -> &'static str {
        "Cargo"
    }

    fn is_available(&self) -> bool {
        // cargo alone is enough; the install-update subcommand is checked
        // separately so its absence is a skip, not a failure.
        self.cmd.command_exists("cargo")
    }

    fn perform_update(&self) -> bool {
        let console = self.cmd.console();
        let name = self.display_name();

        if !self.is_available() {
            console.info(&format!("{name} is not installed - skipping"));
            return true;
        }

        if !self.cmd.command_exists("cargo-install-update") {
            console.info(&format!(
                "cargo-install-update is not installed - skipping {name} package updates"
            ));
            return true;
        }

        console.info(&format!("{name}: updating installed binaries..."));
        if self.cmd.run("cargo", &["install-update", "-a"]).is_err() {
            return false;
        }
        console.success(&format!("{name} update finished"));
        true
    }
}
