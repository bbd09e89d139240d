//! WSL integration: auto-run hook management in the shell rc file.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result, bail};

use crate::config::AutoRunMode;
use crate::platform;

const MARKER_COMMENT: &str = "# sysup - automatic system updates";
const AUTO_RUN_LINE: &str = "sysup update --auto-run 2>/dev/null || true";

pub struct WslIntegration;

impl WslIntegration {
    /// True inside a WSL distribution.
    pub fn is_wsl() -> bool {
        fs::read_to_string("/proc/version")
            .map(|raw| raw.to_lowercase().contains("microsoft"))
            .unwrap_or(false)
    }

    /// Rc file of the login shell; bash when in doubt.
    pub fn shell_rc_file() -> Option<PathBuf> {
        let home = platform::home_dir()?;
        let shell = std::env::var("SHELL").unwrap_or_default();
        if shell.contains("zsh") {
            Some(home.join(".zshrc"))
        } else {
            Some(home.join(".bashrc"))
        }
    }

    /// Whether the auto-run block is already present.
    pub fn is_auto_run_configured(rc_file: &Path) -> bool {
        fs::read_to_string(rc_file)
            .map(|content| content.contains(AUTO_RUN_LINE))
            .unwrap_or(false)
    }

    /// Append the auto-run block; a no-op when it is already configured.
    pub fn add_auto_run(rc_file: &Path, mode: AutoRunMode) -> Result<()> {
        if Self::is_auto_run_configured(rc_file) {
            return Ok(());
        }

        let content = if rc_file.exists() {
            let backup = rc_file.with_extension("sysup.bak");
            fs::copy(rc_file, &backup)
                .with_context(|| format!("failed to back up {}", rc_file.display()))?;
            fs::read_to_string(rc_file)
                .with_context(|| format!("failed to read {}", rc_file.display()))?
        } else {
            String::new()
        };

        let mut block = String::from("\n");
        block.push_str(MARKER_COMMENT);
        block.push('\n');
        block.push_str("# runs once per login; the daily marker throttles repeats\n");
        if mode == AutoRunMode::Enabled {
            block.push_str("# sudo authentication is skipped\n");
        }
        block.push_str("if [ -z \"${SYSUP_RAN:-}\" ]; then\n");
        block.push_str("    export SYSUP_RAN=1\n");
        block.push_str(&format!("    {AUTO_RUN_LINE}\n"));
        block.push_str("fi\n");

        fs::write(rc_file, format!("{content}{block}"))
            .with_context(|| format!("failed to write {}", rc_file.display()))?;
        Ok(())
    }

    /// Remove the auto-run block inserted by `add_auto_run`.
    pub fn remove_auto_run(rc_file: &Path) -> Result<()> {
        if !rc_file.exists() {
            return Ok(());
        }
        let content = fs::read_to_string(rc_file)
            .with_context(|| format!("failed to read {}", rc_file.display()))?;

        let mut kept = Vec::new();
        let mut in_block = false;
        for line in content.lines() {
            if line.trim_start().starts_with(MARKER_COMMENT) {
                in_block = true;
                // Drop the blank separator the block was appended with.
                if kept.last().is_some_and(|last: &&str| last.trim().is_empty()) {
                    kept.pop();
                }
                continue;
            }
            if in_block {
                if line.trim() == "fi" {
                    in_block = false;
                }
                continue;
            }
            kept.push(line);
        }

        let mut rebuilt = kept.join("\n");
        if content.ends_with('\n') && !rebuilt.is_empty() {
            rebuilt.push('\n');
        }
        fs::write(rc_file, rebuilt)
            .with_context(|| format!("failed to write {}", rc_file.display()))?;
        Ok(())
    }

    /// Apply the chosen auto-run mode to the login shell rc file.
    pub fn setup(mode: AutoRunMode) -> Result<String> {
        let Some(rc_file) = Self::shell_rc_file() else {
            bail!("cannot determine the shell rc file");
        };
        match mode {
            AutoRunMode::Disabled => {
                Self::remove_auto_run(&rc_file)?;
                Ok(format!("auto-run removed from {}", rc_file.display()))
            }
            AutoRunMode::Enabled | AutoRunMode::EnabledWithAuth => {
                Self::add_auto_run(&rc_file, mode)?;
                Ok(format!("auto-run configured in {}", rc_file.display()))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_then_remove_round_trips_the_rc_file() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let rc_file = dir.path().join(".bashrc");
        fs::write(&rc_file, "export PATH=$PATH:~/bin\n").expect("write rc");

        WslIntegration::add_auto_run(&rc_file, AutoRunMode::EnabledWithAuth).expect("add");
        assert!(WslIntegration::is_auto_run_configured(&rc_file));
        assert!(rc_file.with_extension("sysup.bak").exists());

        // Adding again must not duplicate the block.
        WslIntegration::add_auto_run(&rc_file, AutoRunMode::EnabledWithAuth).expect("re-add");
        let content = fs::read_to_string(&rc_file).expect("read rc");
        assert_eq!(content.matches(AUTO_RUN_LINE).count(), 1);

        WslIntegration::remove_auto_run(&rc_file).expect("remove");
        let content = fs::read_to_string(&rc_file).expect("read rc");
        assert!(!content.contains("sysup update --auto-run"));
        assert!(content.contains("export PATH"));
    }

    #[test]
    fn remove_on_missing_file_is_a_no_op() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let rc_file = dir.path().join(".bashrc");
        WslIntegration::remove_auto_run(&rc_file).expect("remove");
        assert!(!rc_file.exists());
    }
}
