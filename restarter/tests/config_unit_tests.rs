//! Unit tests for configuration parsing and validation
//!
//! These tests verify that restart configs are parsed correctly and that
//! invalid schedules are rejected before a scheduler is started.

mod common;

use common::fixtures::*;
use restarter::config::{DeferralPolicy, RestartConfig};
use restarter::errors::ConfigError;
use restarter::ConfigManager;
use std::fs;
use std::time::Duration;
use tempfile::TempDir;

#[test]
fn test_parse_full_config() {
    let restart_toml = r#"
daily_restart_time = "4:30 am"
warning_seconds = 300
high_visibility = false
testing_mode = false
timezone = "Europe/Berlin"
grace_delay_seconds = 15
stop_timeout_seconds = 120
deferral_policy = "shift_daily_time"
status_messages = false
ignore_patterns = ["Running AutoCompaction"]

[server]
command = "./bedrock_server"
working_dir = "/srv/bedrock"

[[protected_jobs]]
name = "backup"
lock_file = "/srv/bedrock/backup.lock"

[messages]
restart_abort = "Busy, retrying in {0} minutes"
    "#;

    let config: RestartConfig = toml::from_str(restart_toml).unwrap();

    assert_eq!(config.daily_restart_time, "4:30 am");
    assert_eq!(config.warning_seconds, 300);
    assert!(!config.high_visibility);
    assert_eq!(config.timezone.as_deref(), Some("Europe/Berlin"));
    assert_eq!(config.deferral_policy, DeferralPolicy::ShiftDailyTime);
    assert_eq!(config.ignore_patterns, vec!["Running AutoCompaction".to_string()]);

    let server = config.server.as_ref().unwrap();
    assert_eq!(server.command, "./bedrock_server");
    assert!(server.args.is_empty());
    assert_eq!(server.working_dir.as_deref(), Some("/srv/bedrock"));

    assert_eq!(config.protected_jobs.len(), 1);
    assert_eq!(config.protected_jobs[0].name, "backup");

    // Only the overridden template changes
    assert_eq!(config.messages.restart_abort, "Busy, retrying in {0} minutes");
    assert_eq!(config.messages.minutes_word, "minutes");

    let schedule = config.schedule_config().unwrap();
    assert_eq!(schedule.daily_time.to_string(), "04:30:00");
    assert_eq!(schedule.warning_lead, Duration::from_secs(300));
    assert_eq!(schedule.retry_delay(), Duration::from_secs(600));
    assert_eq!(schedule.grace_delay, Duration::from_secs(15));
    assert_eq!(schedule.stop_timeout, Duration::from_secs(120));
}

#[test]
fn test_defaults_for_empty_config() {
    let config: RestartConfig = toml::from_str("").unwrap();

    assert_eq!(config.daily_restart_time, "12:00");
    assert_eq!(config.warning_seconds, 600);
    assert!(config.high_visibility);
    assert!(!config.testing_mode);
    assert!(config.status_messages);
    assert_eq!(config.grace_delay_seconds, 10);
    assert_eq!(config.stop_timeout_seconds, 300);
    assert_eq!(config.deferral_policy, DeferralPolicy::KeepDailyTime);
    assert_eq!(config.ignore_patterns.len(), 2);
    assert!(config.server.is_none());
    assert!(config.protected_jobs.is_empty());
    assert_eq!(
        config.messages.restart_one_warn,
        "The server will restart in {0} {1}"
    );
}

#[test]
fn test_invalid_time_rejected() {
    let err = ConfigManager::from_toml(r#"daily_restart_time = "25:00""#).unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[test]
fn test_zero_warning_rejected() {
    let err = ConfigManager::from_toml("warning_seconds = 0").unwrap_err();
    match err {
        ConfigError::InvalidValue { field, .. } => assert_eq!(field, "warning_seconds"),
        other => panic!("expected invalid value, got {:?}", other),
    }
}

#[test]
fn test_warning_longer_than_a_day_rejected() {
    let err = ConfigManager::from_toml("warning_seconds = 86401").unwrap_err();
    match err {
        ConfigError::InvalidValue { field, .. } => assert_eq!(field, "warning_seconds"),
        other => panic!("expected invalid value, got {:?}", other),
    }

    let err = ConfigManager::from_toml("warning_seconds = 9223372036854775807").unwrap_err();
    assert!(matches!(err, ConfigError::InvalidValue { .. }));
}

#[test]
fn test_one_day_warning_accepted() {
    let manager = ConfigManager::from_toml("warning_seconds = 86400").unwrap();
    let schedule = manager.schedule();
    assert_eq!(schedule.warning_lead, Duration::from_secs(86_400));
    assert_eq!(schedule.retry_delay(), Duration::from_secs(172_800));
}

#[test]
fn test_unknown_timezone_rejected() {
    let err = ConfigManager::from_toml(r#"timezone = "Mars/Olympus""#).unwrap_err();
    match err {
        ConfigError::InvalidValue { field, .. } => assert_eq!(field, "timezone"),
        other => panic!("expected invalid value, got {:?}", other),
    }
}

#[test]
fn test_malformed_toml_is_parse_error() {
    let err = ConfigManager::from_toml("warning_seconds = \"soon\"").unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[test]
fn test_unknown_deferral_policy_rejected() {
    let err = ConfigManager::from_toml(r#"deferral_policy = "whenever""#).unwrap_err();
    assert!(matches!(err, ConfigError::ParseError { .. }));
}

#[tokio::test]
async fn test_config_manager_loads_file() {
    let file = TestConfigBuilder::new()
        .daily_restart_time("03:15")
        .warning_seconds(900)
        .protected_job("render", "/tmp/render.lock")
        .write();

    let manager = ConfigManager::new(file.path_string()).await.unwrap();
    let config = manager.get_current_config();

    assert_eq!(config.daily_restart_time, "03:15");
    assert_eq!(config.protected_jobs[0].name, "render");
    assert_eq!(manager.schedule().warning_lead, Duration::from_secs(900));
    assert_eq!(manager.schedule().daily_time_label, "03:15");
}

#[tokio::test]
async fn test_config_manager_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("missing.toml");

    let err = ConfigManager::new(path.to_string_lossy().to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, ConfigError::LoadFailed { .. }));
}

#[tokio::test]
async fn test_config_manager_rejects_invalid_file() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("restart.toml");
    fs::write(&path, "daily_restart_time = \"noon\"\n").unwrap();

    let result = ConfigManager::new(path.to_string_lossy().to_string()).await;
    assert!(result.is_err());
}
