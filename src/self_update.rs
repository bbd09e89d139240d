//! Self-update: upgrade the installed sysup binary, then re-exec once.
//!
//! The re-exec is the single process-replacement boundary in the program and
//! only runs directly after a successful upgrade.

use crate::console::Console;
use crate::runner::{self, DEFAULT_TIMEOUT};

pub struct SelfUpdater {
    console: Console,
}

impl SelfUpdater {
    pub fn new(console: Console) -> Self {
        Self { console }
    }

    /// Try to upgrade the installed binary. `true` when a new version landed.
    pub fn update_self(&self) -> bool {
        let output = match runner::run_output("cargo", &["install", "sysup"], DEFAULT_TIMEOUT) {
            Ok(output) => output,
            Err(err) => {
                tracing::debug!("self-update error: {err}");
                return false;
            }
        };
        if !output.status.success() {
            tracing::debug!(
                "self-update check failed: {}",
                String::from_utf8_lossy(&output.stderr).trim()
            );
            return false;
        }

        let combined = format!(
            "{}{}",
            String::from_utf8_lossy(&output.stdout),
            String::from_utf8_lossy(&output.stderr)
        );
        if combined.contains("Replaced package") || combined.contains("Installed package") {
            self.console.info("sysup was updated");
            true
        } else {
            tracing::debug!("sysup is already up to date");
            false
        }
    }

    /// Replace the current process with the updated binary, keeping argv.
    /// Returns only when the replacement failed.
    pub fn restart_self(&self) {
        self.console.info("re-running with the updated sysup...");
        let exe = match std::env::current_exe() {
            Ok(exe) => exe,
            Err(err) => {
                self.console.error(&format!("cannot locate own executable: {err}"));
                return;
            }
        };
        let args: Vec<String> = std::env::args().skip(1).collect();

        #[cfg(unix)]
        {
            use std::os::unix::process::CommandExt;
            let err = std::process::Command::new(&exe).args(&args).exec();
            self.console.error(&format!("failed to re-exec: {err}"));
        }

        #[cfg(not(unix))]
        {
            match std::process::Command::new(&exe).args(&args).status() {
                Ok(status) => std::process::exit(status.code().unwrap_or(0)),
                Err(err) => self.console.error(&format!("failed to restart: {err}")),
            }
        }
    }

    /// Upgrade and, on success, re-exec. Returns `false` when nothing
    /// changed; does not return at all when the re-exec goes through.
    pub fn check_and_update(&self) -> bool {
        if self.update_self() {
            self.restart_self();
            return true;
        }
        false
    }
}
