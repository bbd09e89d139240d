//! Firmware updater via fwupdmgr.

use super::Updater;
use crate::runner::CommandRunner;

/// fwupdmgr exits non-zero when no updates exist; that is not a failure.
pub struct FirmwareUpdater {
    cmd: CommandRunner,
}

impl FirmwareUpdater {
    pub fn new(cmd: CommandRunner) -> Self {
        Self { cmd }
    }
}

impl Updater for FirmwareUpdater {
    fn key(&self) -> &'static str {
        "firmware"
    }

    fn display_name(&self) -> &'static str {
        "Firmware"
    }

    fn is_available(&self) -> bool {
        self.cmd.command_exists("fwupdmgr")
    }

    fn perform_update(&self) -> bool {
        let console = self.cmd.console();
        let name = self.display_name();

        if !self.is_available() {
            console.info(&format!("{name} (fwupdmgr) is not installed - skipping"));
            return true;
        }

        console.info(&format!("{name}: refreshing metadata..."));
        if self.cmd.run_unchecked("fwupdmgr", &["refresh"]).is_err() {
            return false;
        }

        console.info(&format!("checking {name}..."));
        match self.cmd.run_unchecked("fwupdmgr", &["update", "-y"]) {
            Ok(result) if result.success() => {
                console.success(&format!("{name} update finished"));
                true
            }
            Ok(_) => {
                console.info(&format!("no {name} updates available"));
                true
            }
            Err(_) => false,
        }
    }
}
