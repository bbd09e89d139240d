//! Run statistics: per-updater outcomes, console summary, durable log block.

use std::collections::BTreeMap;
use std::fs;
use std::io::Write;
use std::path::Path;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use chrono::Local;

use crate::console::Console;

#[derive(Debug, Clone, PartialEq, Eq)]
/// Result of dispatching one updater.
pub enum RunOutcome {
    Success,
    Failure(String),
    Skipped(String),
}

/// Aggregated outcomes for one run.
///
/// `successes` keeps completion order; the reason maps are keyed by updater
/// name and hold one entry per dispatched-and-not-successful updater.
#[derive(Debug)]
pub struct UpdateStats {
    start: Instant,
    end: Option<Instant>,
    successes: Vec<String>,
    failures: BTreeMap<String, String>,
    skips: BTreeMap<String, String>,
}

impl Default for UpdateStats {
    fn default() -> Self {
        Self::new()
    }
}

impl UpdateStats {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
            end: None,
            successes: Vec::new(),
            failures: BTreeMap::new(),
            skips: BTreeMap::new(),
        }
    }

    pub fn record_success(&mut self, updater: &str) {
        self.successes.push(updater.to_string());
    }

    pub fn record_failure(&mut self, updater: &str, reason: &str) {
        self.failures
            .insert(updater.to_string(), reason.to_string());
    }

    pub fn record_skip(&mut self, updater: &str, reason: &str) {
        self.skips.insert(updater.to_string(), reason.to_string());
    }

    /// Set the end instant; later calls keep the first value.
    pub fn finish(&mut self) {
        if self.end.is_none() {
            self.end = Some(Instant::now());
        }
    }

    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    pub fn skip_count(&self) -> usize {
        self.skips.len()
    }

    /// Total outcomes recorded; equals the number of dispatched updaters.
    pub fn dispatched_count(&self) -> usize {
        self.success_count() + self.failure_count() + self.skip_count()
    }

    pub fn successes(&self) -> &[String] {
        &self.successes
    }

    pub fn failures(&self) -> &BTreeMap<String, String> {
        &self.failures
    }

    pub fn skips(&self) -> &BTreeMap<String, String> {
        &self.skips
    }

    pub fn duration(&self) -> Duration {
        self.end
            .unwrap_or_else(Instant::now)
            .duration_since(self.start)
    }

    /// Duration rendered as "3m07s" or "42s".
    pub fn duration_formatted(&self) -> String {
        let total = self.duration().as_secs();
        let minutes = total / 60;
        let seconds = total % 60;
        if minutes > 0 {
            format!("{minutes}m{seconds:02}s")
        } else {
            format!("{seconds}s")
        }
    }
}

/// Owns the run's statistics and renders them at the end.
pub struct StatsManager {
    console: Console,
    stats: UpdateStats,
}

impl StatsManager {
    pub fn new(console: Console) -> Self {
        Self {
            console,
            stats: UpdateStats::new(),
        }
    }

    pub fn stats(&self) -> &UpdateStats {
        &self.stats
    }

    /// Route one dispatch outcome into the aggregate.
    pub fn record(&mut self, updater: &str, outcome: RunOutcome) {
        match outcome {
            RunOutcome::Success => self.stats.record_success(updater),
            RunOutcome::Failure(reason) => self.stats.record_failure(updater, &reason),
            RunOutcome::Skipped(reason) => self.stats.record_skip(updater, &reason),
        }
    }

    /// Finalize and print the sectioned end-of-run summary.
    pub fn show_summary(&mut self) {
        self.stats.finish();
        let console = self.console;
        let stats = &self.stats;

        console.section("Update Summary");

        if stats.success_count() > 0 {
            console.success(&format!("succeeded: {}", stats.success_count()));
            for updater in stats.successes() {
                console.info(&format!("  ✓ {updater}"));
            }
        }

        if stats.failure_count() > 0 {
            console.error(&format!("failed: {}", stats.failure_count()));
            for (updater, reason) in stats.failures() {
                console.error(&format!("  ✗ {updater}: {reason}"));
            }
        }

        if stats.skip_count() > 0 {
            console.info(&format!("skipped: {}", stats.skip_count()));
            for (updater, reason) in stats.skips() {
                console.info(&format!("  - {updater}: {reason}"));
            }
        }

        console.info(&format!("duration: {}", stats.duration_formatted()));

        let attempted = stats.success_count() + stats.failure_count();
        if attempted == 0 {
            console.warning("no updates were executed");
        } else if stats.failure_count() == 0 {
            console.success("all updates completed successfully");
        } else {
            console.warning(&format!(
                "{} update(s) reported problems",
                stats.failure_count()
            ));
        }
    }

    /// Append this run's summary block to `update.log` in `log_dir`.
    pub fn save_to_log(&self, log_dir: &Path) -> Result<()> {
        fs::create_dir_all(log_dir)
            .with_context(|| format!("failed to create log dir {}", log_dir.display()))?;

        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S");
        let mut block = format!("=== Update Summary - {timestamp} ===\n");

        block.push_str(&format!("Success: {} items\n", self.stats.success_count()));
        for updater in self.stats.successes() {
            block.push_str(&format!("  SUCCESS: {updater}\n"));
        }

        block.push_str(&format!("Failed: {} items\n", self.stats.failure_count()));
        for (updater, reason) in self.stats.failures() {
            block.push_str(&format!("  FAILED: {updater} - {reason}\n"));
        }

        block.push_str(&format!("Skipped: {} items\n", self.stats.skip_count()));
        for (updater, reason) in self.stats.skips() {
            block.push_str(&format!("  SKIPPED: {updater} - {reason}\n"));
        }

        block.push_str(&format!(
            "Duration: {} seconds\n\n",
            self.stats.duration().as_secs()
        ));

        let log_file = log_dir.join("update.log");
        let mut file = fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&log_file)
            .with_context(|| format!("failed to open {}", log_file.display()))?;
        file.write_all(block.as_bytes())
            .with_context(|| format!("failed to append to {}", log_file.display()))?;
        Ok(())
    }
}
