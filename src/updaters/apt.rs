//! APT system package updater for Debian-family systems.

use super::{Updater, count_lines_after_header};
use crate::runner::CommandRunner;

/// Refreshes package lists, upgrades when anything is pending, then prunes.
pub struct AptUpdater {
    cmd: CommandRunner,
}

impl AptUpdater {
    pub fn new(cmd: CommandRunner) -> Self {
        Self { cmd }
    }
}

impl Updater for AptUpdater {
    fn key(&self) -> &'static str {
        "apt"
    }

    fn display_name(&self) -> &'static str {
        "APT"
    }

    fn is_available(&self) -> bool {
        self.cmd.command_exists("apt")
    }

    fn pending_updates(&self) -> Option<u32> {
        let result = self
            .cmd
            .run_unchecked("apt", &["list", "--upgradable"])
            .ok()?;
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

        console.info(&format!("{name}: refreshing package lists..."));
        if self.cmd.run("sudo", &["apt", "update"]).is_err() {
            return false;
        }
        console.success(&format!("{name} package lists refreshed"));

        let pending = self.pending_updates().unwrap_or(0);
        console.info(&format!("upgradable packages: {pending}"));

        if pending > 0 {
            console.info(&format!("{name}: upgrading packages..."));
            if self.cmd.run("sudo", &["apt", "upgrade", "-y"]).is_err() {
                return false;
            }
            console.success(&format!("{name} packages upgraded"));
        } else {
            console.info("nothing to upgrade");
        }

        console.info(&format!("{name}: removing unused packages..."));
        match self.cmd.run_unchecked("sudo", &["apt", "autoremove", "-y"]) {
            Ok(result) if result.success() => {
                console.success(&format!("{name} unused packages removed"));
            }
            _ => console.warning(&format!("{name} autoremove reported problems")),
        }

        let _ = self.cmd.run_unchecked("sudo", &["apt", "autoclean"]);

        console.success(&format!("{name} update finished"));
        true
    }
}
