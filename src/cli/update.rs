//! The update orchestrator: preflight checks, updater dispatch, summary.

use std::collections::VecDeque;
use std::panic::{self, AssertUnwindSafe};
use std::path::PathBuf;
use std::sync::{Mutex, mpsc};
use std::thread;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use clap::Args;

use crate::backup::BackupManager;
use crate::checks::{MIN_FREE_SPACE_GB, SystemChecker};
use crate::config::{AutoRunMode, SysupConfig};
use crate::console::Console;
use crate::logging;
use crate::notify::Notifier;
use crate::runner;
use crate::self_update::SelfUpdater;
use crate::stats::{RunOutcome, StatsManager};
use crate::updaters::{self, Updater};
use crate::wsl::WslIntegration;

/// Fixed size of the worker pool in parallel mode.
const MAX_PARALLEL_WORKERS: usize = 4;

#[derive(Args, Debug)]
#[command(about = "Update the system and all enabled package managers")]
/// Update argument set.
pub struct UpdateArgs {
    #[arg(short = 'c', long, help = "Path to the configuration file")]
    pub config: Option<PathBuf>,
    #[arg(long, help = "Log planned commands without executing them")]
    pub dry_run: bool,
    #[arg(long, help = "Unattended mode: no prompts, sudo access required")]
    pub auto_run: bool,
    #[arg(long, help = "Run even if an update already ran today")]
    pub force: bool,
    #[arg(long = "list", help = "List updater availability and exit")]
    pub list: bool,
    #[arg(long, help = "Set up WSL auto-run integration")]
    pub setup_wsl: bool,
    #[arg(long, help = "Skip updating sysup itself")]
    pub no_self_update: bool,
    #[arg(short = 'v', long, help = "Verbose logging")]
    pub verbose: bool,
}

/// Handle the update subcommand.
pub fn handle_update(args: UpdateArgs) -> Result<()> {
    let mut config =
        SysupConfig::load(args.config.as_deref()).context("failed to load configuration")?;
    if args.dry_run {
        config.general.dry_run = true;
    }

    let level = if args.verbose {
        "debug"
    } else {
        config.logging.level.as_str()
    };
    let _log_guard = logging::init(&config.log_dir(), level, config.logging.retention_days)?;

    let console = Console;

    if !args.list && !args.setup_wsl && !args.no_self_update {
        SelfUpdater::new(console).check_and_update();
    }

    let checker = SystemChecker::new(console, config.cache_dir())?;
    if !checker.check_process_lock() {
        bail!("another sysup instance is already running");
    }
    let _lock = checker.lock_guard();

    if args.setup_wsl {
        return setup_wsl_integration(console);
    }
    if args.list {
        show_available_updaters(console, &config);
        return Ok(());
    }

    run_updates(console, &config, &checker, args.auto_run, args.force)
}

/// Interactive WSL auto-run setup.
fn setup_wsl_integration(console: Console) -> Result<()> {
    console.section("WSL integration setup");

    if !WslIntegration::is_wsl() {
        console.error("not running inside WSL");
        return Ok(());
    }
    console.info("WSL environment detected");

    if let Some(rc_file) = WslIntegration::shell_rc_file() {
        console.info(&format!("shell rc file: {}", rc_file.display()));
        if WslIntegration::is_auto_run_configured(&rc_file) {
            console.info("auto-run is already configured");
            if console.confirm("Remove the configuration?") {
                match WslIntegration::setup(AutoRunMode::Disabled) {
                    Ok(message) => console.success(&message),
                    Err(err) => console.error(&format!("{err:#}")),
                }
            }
            return Ok(());
        }
    }

    console.info("choose the auto-run mode:");
    console.info("  1. enable (skip sudo authentication)");
    console.info("  2. enable (with sudo authentication)");
    console.info("  3. cancel");
    let mode = match console.choose("selection", &["1", "2", "3"], "1").as_str() {
        "1" => AutoRunMode::Enabled,
        "2" => AutoRunMode::EnabledWithAuth,
        _ => {
            console.info("cancelled");
            return Ok(());
        }
    };

    match WslIntegration::setup(mode) {
        Ok(message) => {
            console.success(&message);
            console.info("auto-run takes effect at the next shell start");
        }
        Err(err) => console.error(&format!("{err:#}")),
    }
    Ok(())
}

/// Print every updater with its enabled/available status.
fn show_available_updaters(console: Console, config: &SysupConfig) {
    console.section("Available updaters");

    for updater in updaters::all_updaters(console, config.general.dry_run) {
        let enabled = config.is_updater_enabled(updater.key());
        let available = updater.is_available();
        let (mark, status) = if enabled && available {
            ("✓", "enabled")
        } else if !available {
            ("✗", "unavailable")
        } else {
            ("-", "disabled")
        };
        console.info(&format!("  {mark} {}: {status}", updater.display_name()));
    }
}

/// Main update flow once the lock is held.
fn run_updates(
    console: Console,
    config: &SysupConfig,
    checker: &SystemChecker,
    auto_run: bool,
    force: bool,
) -> Result<()> {
    if auto_run {
        console.section("automatic system update");
    } else {
        console.section("sysup system update");
    }

    let mut stats = StatsManager::new(console);

    // Daily throttle. Unattended runs stop here; attended runs may override.
    if !force && !checker.check_daily_run() {
        if auto_run || !console.confirm("Run again anyway?") {
            return Ok(());
        }
    }

    if config.backup.enabled {
        let backups = BackupManager::new(config.backup_dir(), true);
        if let Some(backup_file) = backups.create_backup() {
            if let Some(name) = backup_file.file_name() {
                console.info(&format!("backup created: {}", name.to_string_lossy()));
            }
            let deleted = backups.cleanup_old_backups(10);
            if deleted > 0 {
                console.info(&format!("removed {deleted} old backup(s)"));
            }
        }
    }

    console.section("system checks");

    if !checker.check_disk_space(MIN_FREE_SPACE_GB)
        && !auto_run
        && !console.confirm("Disk space is low; continue anyway?")
    {
        return Ok(());
    }

    if !checker.check_network()
        && !auto_run
        && !console.confirm("Network connectivity looks broken; continue anyway?")
    {
        return Ok(());
    }

    if !checker.check_sudo_available() {
        console.warning("administrator privileges are required");
        if auto_run {
            bail!("unattended mode requires passwordless sudo");
        }
    }

    console.section("package updates");

    let updaters = updaters::enabled_updaters(config, console);
    if updaters.is_empty() {
        console.warning("no updaters are enabled");
        return Ok(());
    }

    if config.general.parallel_updates {
        console.info("running updates in parallel...");
        run_parallel(&updaters, &mut stats, console);
    } else {
        run_sequential(&updaters, &mut stats, console);
    }

    if checker.check_reboot_required() {
        if !auto_run && console.confirm("Reboot now?") {
            console.info("rebooting in 5 seconds...");
            thread::sleep(Duration::from_secs(5));
            let _ = runner::run_status("sudo", &["reboot"], Duration::from_secs(30));
        } else {
            console.warning("reboot manually at your convenience");
        }
    }

    stats.show_summary();
    stats.save_to_log(&config.log_dir())?;

    console.success("system update complete");

    send_notification(config, &stats);
    Ok(())
}

/// Dispatch one updater: availability gate, update action, panic fence.
pub fn dispatch_updater(updater: &dyn Updater) -> RunOutcome {
    if !updater.is_available() {
        return RunOutcome::Skipped("unavailable".to_string());
    }
    match panic::catch_unwind(AssertUnwindSafe(|| updater.perform_update())) {
        Ok(true) => RunOutcome::Success,
        Ok(false) => RunOutcome::Failure("update failed".to_string()),
        Err(payload) => RunOutcome::Failure(panic_message(payload.as_ref())),
    }
}

fn panic_message(payload: &(dyn std::any::Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unexpected updater panic".to_string()
    }
}

/// Run updaters one at a time in declaration order.
pub fn run_sequential(updaters: &[Box<dyn Updater>], stats: &mut StatsManager, console: Console) {
    let total = updaters.len();
    for (index, updater) in updaters.iter().enumerate() {
        console.progress_step(
            index + 1,
            total,
            &format!("updating {}", updater.display_name()),
        );
        let outcome = dispatch_updater(updater.as_ref());
        stats.record(updater.key(), outcome);
    }
}

/// Run updaters on a bounded worker pool.
///
/// Outcomes arrive in completion order, which is not an ordering guarantee;
/// only this thread touches the statistics while workers merely execute.
pub fn run_parallel(updaters: &[Box<dyn Updater>], stats: &mut StatsManager, console: Console) {
    let total = updaters.len();
    let queue: Mutex<VecDeque<&dyn Updater>> =
        Mutex::new(updaters.iter().map(|updater| updater.as_ref()).collect());
    let (tx, rx) = mpsc::channel::<(&'static str, RunOutcome)>();

    thread::scope(|scope| {
        for _ in 0..MAX_PARALLEL_WORKERS.min(total) {
            let tx = tx.clone();
            let queue = &queue;
            scope.spawn(move || {
                loop {
                    let job = queue.lock().expect("work queue poisoned").pop_front();
                    let Some(updater) = job else { break };
                    let outcome = dispatch_updater(updater);
                    if tx.send((updater.key(), outcome)).is_err() {
                        break;
                    }
                }
            });
        }
        drop(tx);

        for (done, (key, outcome)) in rx.iter().enumerate() {
            console.progress_step(done + 1, total, &format!("{key} finished"));
            stats.record(key, outcome);
        }
    });
}

fn send_notification(config: &SysupConfig, stats: &StatsManager) {
    if !config.notification.enabled || !Notifier::is_available() {
        return;
    }
    let success_count = stats.stats().success_count();
    let failure_count = stats.stats().failure_count();

    if failure_count > 0 && config.notification.on_error {
        Notifier::send_error(
            "sysup",
            &format!("update finished: {success_count} succeeded, {failure_count} failed"),
        );
    } else if success_count > 0 && config.notification.on_success {
        Notifier::send_success(
            "sysup",
            &format!("system update complete ({success_count} updated)"),
        );
    }
}
