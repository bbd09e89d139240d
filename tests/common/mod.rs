//! Shared rule-based fake runner for integration tests.
#![allow(dead_code)]

use std::process::{ExitStatus, Output};
use std::sync::Mutex;
use std::time::Duration;

use sysup::runner::{CommandError, Runner};

#[derive(Default)]
pub struct TestRunner {
    rules: Mutex<Vec<Rule>>,
    commands: Mutex<Vec<String>>,
}

#[derive(Clone)]
struct Rule {
    contains: Vec<String>,
    status: i32,
    stdout: String,
    stderr: String,
}

impl Rule {
    fn matches(&self, cmd: &str) -> bool {
        self.contains.iter().all(|needle| cmd.contains(needle))
    }
}

impl TestRunner {
    pub fn add_rule(&self, contains: &[&str], status: i32, stdout: &str, stderr: &str) {
        self.rules.lock().expect("rules lock").push(Rule {
            contains: contains.iter().map(|s| s.to_string()).collect(),
            status,
            stdout: stdout.to_string(),
            stderr: stderr.to_string(),
        });
    }

    /// Every command line seen so far, in invocation order.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().expect("commands lock").clone()
    }

    pub fn saw_command(&self, needle: &str) -> bool {
        self.commands().iter().any(|cmd| cmd.contains(needle))
    }
}

impl Runner for TestRunner {
    fn output(
        &self,
        program: &str,
        args: &[&str],
        _timeout: Duration,
    ) -> Result<Output, CommandError> {
        let args_joined = args.iter().copied().collect::<Vec<&str>>().join(" ");
        let cmdline = format!("{} {}", program, args_joined);
        self.commands
            .lock()
            .expect("commands lock")
            .push(cmdline.clone());
        if let Some(rule) = self
            .rules
            .lock()
            .expect("rules lock")
            .iter()
            .find(|rule| rule.matches(&cmdline))
            .cloned()
        {
            return Ok(Output {
                status: exit_status(rule.status),
                stdout: rule.stdout.into_bytes(),
                stderr: rule.stderr.into_bytes(),
            });
        }
        Ok(Output {
            status: exit_status(0),
            stdout: Vec::new(),
            stderr: Vec::new(),
        })
    }
}

#[cfg(unix)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
pub fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}
