use notealarm_core::config::{self, Config, ConfigError, NotifierKind};
use notealarm_core::SchedulerOptions;
use std::path::{Path, PathBuf};
use std::time::Duration;

fn write_config(dir: &Path, body: &str) -> PathBuf {
    let path = dir.join("notealarm.toml");
    std::fs::write(&path, body).unwrap();
    path
}

#[test]
fn empty_file_yields_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "");

    let loaded = config::load(&path).unwrap();

    assert_eq!(loaded, Config::default());
    assert_eq!(loaded.alerts.tick_interval_secs, 300);
    assert_eq!(loaded.notifier.kind, NotifierKind::Desktop);
    assert_eq!(loaded.storage.db_path, PathBuf::from("notealarm.sqlite3"));
}

#[test]
fn full_file_overrides_every_section() {
    let dir = tempfile::tempdir().unwrap();
    let log_dir = dir.path().join("logs");
    let body = format!(
        r#"
[storage]
db_path = "/var/lib/notealarm/notes.db"

[alerts]
tick_interval_secs = 60
dispatch_timeout_secs = 5

[notifier]
kind = "log"
app_name = "deadlines"

[logging]
level = "warn"
dir = "{}"
"#,
        log_dir.display()
    );
    let path = write_config(dir.path(), &body);

    let loaded = config::load(&path).unwrap();

    assert_eq!(
        loaded.storage.db_path,
        PathBuf::from("/var/lib/notealarm/notes.db")
    );
    assert_eq!(loaded.notifier.kind, NotifierKind::Log);
    assert_eq!(loaded.notifier.app_name, "deadlines");
    assert_eq!(loaded.logging.level, "warn");
    assert_eq!(loaded.logging.dir, Some(log_dir));

    let options = SchedulerOptions::from(&loaded.alerts);
    assert_eq!(options.tick_interval, Duration::from_secs(60));
    assert_eq!(options.dispatch_timeout, Duration::from_secs(5));
}

#[test]
fn zero_tick_interval_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = write_config(dir.path(), "[alerts]\ntick_interval_secs = 0\n");

    let err = config::load(&path).unwrap_err();
    assert!(matches!(err, ConfigError::Validation(message) if message.contains("tick_interval_secs")));
}

#[test]
fn unknown_level_and_relative_log_dir_are_rejected() {
    let dir = tempfile::tempdir().unwrap();

    let path = write_config(dir.path(), "[logging]\nlevel = \"chatty\"\n");
    assert!(matches!(
        config::load(&path).unwrap_err(),
        ConfigError::Validation(_)
    ));

    let path = write_config(dir.path(), "[logging]\ndir = \"logs\"\n");
    assert!(matches!(
        config::load(&path).unwrap_err(),
        ConfigError::Validation(message) if message.contains("absolute")
    ));
}

#[test]
fn unknown_keys_and_bad_syntax_fail_to_parse() {
    let dir = tempfile::tempdir().unwrap();

    let path = write_config(dir.path(), "[alerts]\ntick_every = 5\n");
    assert!(matches!(
        config::load(&path).unwrap_err(),
        ConfigError::Parse { .. }
    ));

    let path = write_config(dir.path(), "[alerts\n");
    assert!(matches!(
        config::load(&path).unwrap_err(),
        ConfigError::Parse { .. }
    ));
}

#[test]
fn missing_file_reports_read_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = config::load(&dir.path().join("absent.toml")).unwrap_err();
    assert!(matches!(err, ConfigError::Read { .. }));
}
