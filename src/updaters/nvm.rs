//! Node Version Manager updater.
//!
//! nvm is a shell function, not a binary, so availability is probed through
//! bash and the update itself is a `git pull` of the checkout in ~/.nvm.

use std::time::Duration;

use super::Updater;
use crate::platform;
use crate::runner::{self, CommandRunner, PROBE_TIMEOUT};

pub struct NvmUpdater {
    cmd: CommandRunner,
}

impl NvmUpdater {
    pub fn new(cmd: CommandRunner) -> Self {
        Self { cmd }
    }
}

impl Updater for NvmUpdater {
    fn key(&self) -> &'static str {
        "nvm"
    }

    fn display_name(&self) -> &'static str {
        "nvm"
    }

    fn is_available(&self) -> bool {
        let output = runner::run_output(
            "bash",
            &["-c", "source ~/.nvm/nvm.sh 2>/dev/null && command -v nvm"],
            PROBE_TIMEOUT,
        );
        match output {
            Ok(output) => {
                output.status.success()
                    && String::from_utf8_lossy(&output.stdout).trim() == "nvm"
            }
            Err(_) => false,
        }
    }

    fn perform_update(&self) -> bool {
        let console = self.cmd.console();
        let name = self.display_name();

        if !self.is_available() {
            console.info(&format!("{name} is not installed - skipping"));
            return true;
        }

        let Some(home) = platform::home_dir() else {
            console.warning(&format!("cannot locate the home directory for {name}"));
            return false;
        };
        let nvm_dir = home.join(".nvm");
        if !nvm_dir.join(".git").exists() {
            console.info(&format!("{name} is not a git checkout - skipping"));
            return true;
        }

        console.info(&format!("updating {name}..."));
        let dir = nvm_dir.to_string_lossy();
        let result = self.cmd.run_with(
            "git",
            &["-C", dir.as_ref(), "pull"],
            false,
            Duration::from_secs(60),
        );
        match result {
            Ok(result) if result.success() => {
                console.success(&format!("{name} update finished"));
                true
            }
            Ok(_) => {
                console.warning(&format!("{name} update reported problems"));
                false
            }
            Err(_) => false,
        }
    }
}
