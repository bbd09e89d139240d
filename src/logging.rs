//! Per-run file logging and retention.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use chrono::{Days, Local, NaiveDate};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

/// Initialize tracing with a per-run log file in `log_dir`.
///
/// Returns the appender guard; dropping it flushes buffered log lines, so the
/// caller must keep it alive for the duration of the run.
pub fn init(log_dir: &Path, level: &str, retention_days: u32) -> Result<WorkerGuard> {
    fs::create_dir_all(log_dir)
        .with_context(|| format!("failed to create log dir {}", log_dir.display()))?;
    rotate_logs(log_dir, retention_days);

    let log_path = log_dir.join(format!(
        "sysup_{}.log",
        Local::now().format("%Y%m%d_%H%M%S")
    ));
    let file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&log_path)
        .with_context(|| format!("failed to open log file {}", log_path.display()))?;

    let (non_blocking, guard) = tracing_appender::non_blocking(file);
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.to_lowercase()));
    // try_init: a second call in the same process (tests) is a no-op.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(non_blocking)
        .try_init();
    Ok(guard)
}

/// Delete per-run log files older than the retention window.
fn rotate_logs(log_dir: &Path, retention_days: u32) {
    let Ok(entries) = fs::read_dir(log_dir) else {
        return;
    };
    let cutoff = Local::now().date_naive() - Days::new(u64::from(retention_days));
    for entry in entries.flatten() {
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(date) = parse_log_date(name) else {
            continue;
        };
        if date < cutoff {
            let _ = fs::remove_file(entry.path());
        }
    }
}

/// Extract the date from a `sysup_YYYYMMDD_HHMMSS.log` file name.
fn parse_log_date(file_name: &str) -> Option<NaiveDate> {
    let rest = file_name.strip_prefix("sysup_")?.strip_suffix(".log")?;
    let (date_part, _) = rest.split_once('_')?;
    NaiveDate::parse_from_str(date_part, "%Y%m%d").ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_log_names() {
        assert_eq!(
            parse_log_date("sysup_20260102_080000.log"),
            NaiveDate::from_ymd_opt(2026, 1, 2)
        );
    }

    #[test]
    fn rejects_foreign_file_names() {
        assert_eq!(parse_log_date("update.log"), None);
        assert_eq!(parse_log_date("sysup_garbage.log"), None);
        assert_eq!(parse_log_date("sysup_20260102_080000.txt"), None);
    }

    #[test]
    fn rotation_removes_only_expired_logs() {
        let dir = tempfile::TempDir::new().expect("tempdir");
        let old = dir.path().join("sysup_20200101_000000.log");
        let fresh = dir.path().join(format!(
            "sysup_{}.log",
            Local::now().format("%Y%m%d_%H%M%S")
        ));
        let foreign = dir.path().join("update.log");
        for path in [&old, &fresh, &foreign] {
            fs::write(path, "x").expect("write");
        }

        rotate_logs(dir.path(), 30);

        assert!(!old.exists());
        assert!(fresh.exists());
        assert!(foreign.exists());
    }
}
