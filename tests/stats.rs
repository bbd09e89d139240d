use sysup::console::Console;
use sysup::stats::{RunOutcome, StatsManager, UpdateStats};
use tempfile::TempDir;

#[test]
fn counts_track_every_recorded_outcome() {
    let mut stats = UpdateStats::new();
    stats.record_success("apt");
    stats.record_success("brew");
    stats.record_failure("npm", "update failed");
    stats.record_skip("scoop", "unavailable");

    assert_eq!(stats.success_count(), 2);
    assert_eq!(stats.failure_count(), 1);
    assert_eq!(stats.skip_count(), 1);
    assert_eq!(stats.dispatched_count(), 4);
    assert_eq!(stats.successes(), ["apt", "brew"]);
    assert_eq!(
        stats.failures().get("npm").map(String::as_str),
        Some("update failed")
    );
    assert_eq!(
        stats.skips().get("scoop").map(String::as_str),
        Some("unavailable")
    );
}

#[test]
fn manager_routes_outcomes_into_the_right_buckets() {
    let mut manager = StatsManager::new(Console);
    manager.record("apt", RunOutcome::Success);
    manager.record("npm", RunOutcome::Failure("update failed".to_string()));
    manager.record("brew", RunOutcome::Skipped("unavailable".to_string()));

    assert_eq!(manager.stats().success_count(), 1);
    assert_eq!(manager.stats().failure_count(), 1);
    assert_eq!(manager.stats().skip_count(), 1);
    assert_eq!(manager.stats().dispatched_count(), 3);
}

#[test]
fn saved_log_block_lists_every_outcome() {
    let dir = TempDir::new().expect("tempdir");

    let mut manager = StatsManager::new(Console);
    manager.record("apt", RunOutcome::Success);
    manager.record("rustup", RunOutcome::Success);
    manager.record("npm", RunOutcome::Failure("update failed".to_string()));
    manager.record("brew", RunOutcome::Skipped("unavailable".to_string()));
    manager.show_summary();
    manager.save_to_log(dir.path()).expect("save log");

    let log = std::fs::read_to_string(dir.path().join("update.log")).expect("read log");
    assert!(log.starts_with("=== Update Summary - "));
    assert!(log.contains("Success: 2 items"));
    assert!(log.contains("  SUCCESS: apt"));
    assert!(log.contains("  SUCCESS: rustup"));
    assert!(log.contains("Failed: 1 items"));
    assert!(log.contains("  FAILED: npm - update failed"));
    assert!(log.contains("Skipped: 1 items"));
    assert!(log.contains("  SKIPPED: brew - unavailable"));
    assert!(log.contains("Duration: "));
    assert!(log.ends_with("\n\n"));
}

#[test]
fn saving_twice_appends_a_second_block() {
    let dir = TempDir::new().expect("tempdir");

    let mut manager = StatsManager::new(Console);
    manager.record("apt", RunOutcome::Success);
    manager.show_summary();
    manager.save_to_log(dir.path()).expect("first save");
    manager.save_to_log(dir.path()).expect("second save");

    let log = std::fs::read_to_string(dir.path().join("update.log")).expect("read log");
    assert_eq!(log.matches("=== Update Summary - ").count(), 2);
}

#[test]
fn empty_run_still_renders_a_complete_block() {
    let dir = TempDir::new().expect("tempdir");

    let mut manager = StatsManager::new(Console);
    manager.show_summary();
    manager.save_to_log(dir.path()).expect("save log");

    let log = std::fs::read_to_string(dir.path().join("update.log")).expect("read log");
    assert!(log.contains("Success: 0 items"));
    assert!(log.contains("Failed: 0 items"));
    assert!(log.contains("Skipped: 0 items"));
}
