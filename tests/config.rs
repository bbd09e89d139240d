use sysup::config::{AutoRunMode, SysupConfig, expand_user};

#[test]
fn parse_empty_config_yields_defaults() {
    let cfg: SysupConfig = toml::from_str("").expect("parse config");

    assert!(cfg.updaters.apt);
    assert!(cfg.updaters.snap);
    assert!(cfg.updaters.npm);
    assert!(cfg.updaters.rustup);
    assert!(cfg.updaters.cargo);
    assert!(cfg.updaters.brew);
    assert!(!cfg.updaters.flatpak);
    assert!(!cfg.updaters.gem);
    assert!(!cfg.updaters.scoop);
    assert!(!cfg.updaters.firmware);

    assert_eq!(cfg.auto_run.mode, AutoRunMode::Disabled);
    assert_eq!(cfg.logging.retention_days, 30);
    assert_eq!(cfg.logging.level, "info");
    assert!(cfg.backup.enabled);
    assert!(cfg.notification.enabled);
    assert!(cfg.notification.on_success);
    assert!(cfg.notification.on_error);
    assert!(!cfg.notification.on_warning);
    assert!(!cfg.general.parallel_updates);
    assert!(!cfg.general.dry_run);
}

#[test]
fn parse_config_with_overrides() {
    let raw = r#"
[updaters]
apt = false
flatpak = true

[auto_run]
mode = "enabled_with_auth"

[logging]
level = "debug"
retention_days = 7

[general]
parallel_updates = true
dry_run = true
"#;
    let cfg: SysupConfig = toml::from_str(raw).expect("parse config");

    assert!(!cfg.updaters.apt);
    assert!(cfg.updaters.flatpak);
    // Untouched sections keep their defaults.
    assert!(cfg.updaters.snap);
    assert!(cfg.backup.enabled);

    assert_eq!(cfg.auto_run.mode, AutoRunMode::EnabledWithAuth);
    assert_eq!(cfg.logging.level, "debug");
    assert_eq!(cfg.logging.retention_days, 7);
    assert!(cfg.general.parallel_updates);
    assert!(cfg.general.dry_run);
}

#[test]
fn unknown_updater_names_are_disabled() {
    let cfg = SysupConfig::default();
    assert!(cfg.is_updater_enabled("apt"));
    assert!(!cfg.is_updater_enabled("slackpkg"));
    assert!(!cfg.is_updater_enabled(""));
}

#[test]
fn set_updater_enabled_round_trips() {
    let mut cfg = SysupConfig::default();
    cfg.set_updater_enabled("gem", true);
    cfg.set_updater_enabled("apt", false);
    assert!(cfg.is_updater_enabled("gem"));
    assert!(!cfg.is_updater_enabled("apt"));
}

#[test]
fn load_reads_an_explicit_path() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let path = dir.path().join("sysup.toml");
    std::fs::write(&path, "[general]\ndry_run = true\n").expect("write config");

    let cfg = SysupConfig::load(Some(&path)).expect("load config");
    assert!(cfg.general.dry_run);
}

#[test]
fn load_rejects_malformed_toml() {
    let dir = tempfile::TempDir::new().expect("tempdir");
    let path = dir.path().join("sysup.toml");
    std::fs::write(&path, "updaters = nonsense\n").expect("write config");

    assert!(SysupConfig::load(Some(&path)).is_err());
}

#[test]
fn config_serializes_and_parses_back() {
    let mut cfg = SysupConfig::default();
    cfg.set_updater_enabled("firmware", true);
    cfg.general.parallel_updates = true;

    let rendered = toml::to_string_pretty(&cfg).expect("render config");
    let reparsed: SysupConfig = toml::from_str(&rendered).expect("reparse config");

    assert!(reparsed.is_updater_enabled("firmware"));
    assert!(reparsed.general.parallel_updates);
    assert_eq!(reparsed.auto_run.mode, AutoRunMode::Disabled);
}

#[test]
fn expand_user_handles_tilde_prefix_only() {
    let expanded = expand_user("~/.cache/sysup");
    assert!(!expanded.to_string_lossy().starts_with('~'));
    assert_eq!(
        expand_user("/etc/sysup"),
        std::path::PathBuf::from("/etc/sysup")
    );
}
