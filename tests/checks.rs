mod common;

use std::fs;
use std::sync::Arc;

use common::TestRunner;
use sysup::checks::SystemChecker;
use sysup::console::Console;
use sysup::runner::set_runner_for_tests;
use tempfile::TempDir;

fn checker_in(dir: &TempDir) -> SystemChecker {
    SystemChecker::new(Console, dir.path().to_path_buf()).expect("checker")
}

#[test]
fn new_creates_the_cache_dir() {
    let dir = TempDir::new().expect("tempdir");
    let cache_dir = dir.path().join("nested").join("cache");
    SystemChecker::new(Console, cache_dir.clone()).expect("checker");
    assert!(cache_dir.is_dir());
}

#[test]
fn daily_run_throttles_the_second_call() {
    let dir = TempDir::new().expect("tempdir");
    let checker = checker_in(&dir);

    assert!(checker.check_daily_run());
    assert!(!checker.check_daily_run());
}

#[test]
fn daily_run_proceeds_across_a_date_boundary() {
    let dir = TempDir::new().expect("tempdir");
    let checker = checker_in(&dir);

    fs::write(dir.path().join("daily_run"), "2020-01-01").expect("write marker");
    assert!(checker.check_daily_run());

    let marker = fs::read_to_string(dir.path().join("daily_run")).expect("read marker");
    assert_ne!(marker.trim(), "2020-01-01");
}

#[test]
fn corrupt_daily_marker_counts_as_not_yet_run() {
    let dir = TempDir::new().expect("tempdir");
    let checker = checker_in(&dir);

    fs::write(dir.path().join("daily_run"), "not a date at all").expect("write marker");
    assert!(checker.check_daily_run());
}

#[test]
fn process_lock_acquires_on_a_clean_dir() {
    let dir = TempDir::new().expect("tempdir");
    let checker = checker_in(&dir);

    assert!(checker.check_process_lock());
    assert!(dir.path().join("sysup.lock").exists());
    let pid = fs::read_to_string(dir.path().join("sysup.pid")).expect("read pid");
    assert_eq!(pid.trim(), std::process::id().to_string());
}

#[test]
fn process_lock_reclaims_a_stale_pid() {
    let dir = TempDir::new().expect("tempdir");
    let checker = checker_in(&dir);

    fs::write(dir.path().join("sysup.pid"), "999999999").expect("write pid");
    fs::write(dir.path().join("sysup.lock"), "").expect("write lock");

    assert!(checker.check_process_lock());
    let pid = fs::read_to_string(dir.path().join("sysup.pid")).expect("read pid");
    assert_eq!(pid.trim(), std::process::id().to_string());
    assert!(dir.path().join("sysup.lock").exists());
}

#[test]
fn process_lock_reclaims_a_malformed_pid_file() {
    let dir = TempDir::new().expect("tempdir");
    let checker = checker_in(&dir);

    fs::write(dir.path().join("sysup.pid"), "definitely-not-a-pid").expect("write pid");
    fs::write(dir.path().join("sysup.lock"), "").expect("write lock");

    assert!(checker.check_process_lock());
}

#[test]
fn process_lock_refuses_a_live_owner() {
    let dir = TempDir::new().expect("tempdir");
    let checker = checker_in(&dir);

    // Our own pid is as live as it gets.
    fs::write(dir.path().join("sysup.pid"), std::process::id().to_string()).expect("write pid");
    fs::write(dir.path().join("sysup.lock"), "").expect("write lock");

    assert!(!checker.check_process_lock());
}

#[test]
fn cleanup_lock_is_idempotent() {
    let dir = TempDir::new().expect("tempdir");
    let checker = checker_in(&dir);

    assert!(checker.check_process_lock());
    checker.cleanup_lock();
    checker.cleanup_lock();

    assert!(!dir.path().join("sysup.lock").exists());
    assert!(!dir.path().join("sysup.pid").exists());
}

#[test]
fn lock_guard_releases_on_drop() {
    let dir = TempDir::new().expect("tempdir");
    let checker = checker_in(&dir);

    assert!(checker.check_process_lock());
    {
        let _guard = checker.lock_guard();
        assert!(dir.path().join("sysup.lock").exists());
    }
    assert!(!dir.path().join("sysup.lock").exists());
    assert!(!dir.path().join("sysup.pid").exists());
}

#[test]
fn reboot_check_reads_the_sentinel_and_package_list() {
    let dir = TempDir::new().expect("tempdir");
    let checker = checker_in(&dir);

    let sentinel = dir.path().join("reboot-required");
    assert!(!checker.check_reboot_required_at(&sentinel));

    fs::write(&sentinel, "*** System restart required ***\n").expect("write sentinel");
    fs::write(
        dir.path().join("reboot-required.pkgs"),
        "linux-image-generic\nlibc6\n",
    )
    .expect("write pkgs");
    assert!(checker.check_reboot_required_at(&sentinel));
}

#[test]
fn network_check_fails_when_every_probe_fails() {
    let runner = Arc::new(TestRunner::default());
    runner.add_rule(&["ping"], 2, "", "");
    let _guard = set_runner_for_tests(runner.clone());

    let dir = TempDir::new().expect("tempdir");
    let checker = checker_in(&dir);

    assert!(!checker.check_network());
    assert!(runner.saw_command("8.8.8.8"));
    assert!(runner.saw_command("1.1.1.1"));
}

#[test]
fn network_check_stops_at_the_first_reachable_host() {
    let runner = Arc::new(TestRunner::default());
    let _guard = set_runner_for_tests(runner.clone());

    let dir = TempDir::new().expect("tempdir");
    let checker = checker_in(&dir);

    assert!(checker.check_network());
    assert!(runner.saw_command("8.8.8.8"));
    assert!(!runner.saw_command("1.1.1.1"));
}

#[test]
fn sudo_check_reflects_the_probe_status() {
    let dir = TempDir::new().expect("tempdir");
    let checker = checker_in(&dir);

    {
        let runner = Arc::new(TestRunner::default());
        let _guard = set_runner_for_tests(runner.clone());
        assert!(checker.check_sudo_available());
        assert!(runner.saw_command("sudo -n true"));
    }

    {
        let denied = Arc::new(TestRunner::default());
        denied.add_rule(&["sudo -n true"], 1, "", "sudo: a password is required");
        let _guard = set_runner_for_tests(denied);
        assert!(!checker.check_sudo_available());
    }
}
