//! Explicit console handle threaded through the orchestrator.
//!
//! User-facing lines go to stdout; every message is mirrored into `tracing`
//! so the per-run log file keeps a full record of the session.

use std::io::{self, BufRead, Write};

#[derive(Clone, Copy, Debug, Default)]
/// Cheap-to-copy handle for user-facing output and prompts.
pub struct Console;

impl Console {
    /// Report a completed step.
    pub fn success(&self, message: &str) {
        println!("✓ {message}");
        tracing::info!("SUCCESS: {message}");
    }

    /// Report an informational message.
    pub fn info(&self, message: &str) {
        println!("ℹ {message}");
        tracing::info!("{message}");
    }

    /// Report a non-fatal problem.
    pub fn warning(&self, message: &str) {
        println!("⚠ {message}");
        tracing::warn!("{message}");
    }

    /// Report an error.
    pub fn error(&self, message: &str) {
        eprintln!("✗ {message}");
        tracing::error!("{message}");
    }

    /// Start a new titled section of output.
    pub fn section(&self, title: &str) {
        println!("\n=== {title} ===");
        tracing::info!("SECTION: {title}");
    }

    /// Report progress through a numbered sequence of steps.
    pub fn progress_step(&self, current: usize, total: usize, message: &str) {
        let percentage = if total == 0 {
            100
        } else {
            current * 100 / total
        };
        println!("step {current}/{total}: {message} ({percentage}%)");
        tracing::info!("STEP {current}/{total}: {message}");
    }

    /// Ask a yes/no question; empty or unreadable input counts as no.
    pub fn confirm(&self, prompt: &str) -> bool {
        self.confirm_default(prompt, false)
    }

    /// Ask a yes/no question with an explicit default for empty input.
    pub fn confirm_default(&self, prompt: &str, default: bool) -> bool {
        let hint = if default { "[Y/n]" } else { "[y/N]" };
        print!("{prompt} {hint}: ");
        let _ = io::stdout().flush();
        let mut line = String::new();
        if io::stdin().lock().read_line(&mut line).is_err() {
            return default;
        }
        match line.trim().to_lowercase().as_str() {
            "" => default,
            "y" | "yes" => true,
            _ => false,
        }
    }

    /// Ask for one of `choices`, returning `default` on empty input.
    pub fn choose(&self, prompt: &str, choices: &[&str], default: &str) -> String {
        loop {
            print!("{prompt} [{}] (default: {default}): ", choices.join("/"));
            let _ = io::stdout().flush();
            let mut line = String::new();
            if io::stdin().lock().read_line(&mut line).is_err() {
                return default.to_string();
            }
            let answer = line.trim();
            if answer.is_empty() {
                return default.to_string();
            }
            if choices.contains(&answer) {
                return answer.to_string();
            }
            println!("please answer one of: {}", choices.join(", "));
        }
    }
}
