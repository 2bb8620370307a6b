// File: restarter/src/config/mod.rs
pub mod manager;
pub mod properties;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use manager::ConfigManager;

use crate::constants::schedule::MAX_WARNING_SECONDS;
use crate::constants::{defaults, restart};
use crate::errors::ConfigError;
use crate::scheduler::timing::{parse_time_of_day, ScheduleZone};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RestartConfig {
    #[serde(default = "default_daily_restart_time")]
    pub daily_restart_time: String,
    #[serde(default = "default_warning_seconds")]
    pub warning_seconds: u64,
    #[serde(default = "default_true")]
    pub high_visibility: bool,
    #[serde(default)]
    pub testing_mode: bool,
    pub timezone: Option<String>,
    #[serde(default = "default_grace_delay")]
    pub grace_delay_seconds: u64,
    #[serde(default = "default_stop_timeout")]
    pub stop_timeout_seconds: u64,
    #[serde(default)]
    pub deferral_policy: DeferralPolicy,
    #[serde(default = "default_true")]
    pub status_messages: bool,
    #[serde(default = "default_ignore_patterns")]
    pub ignore_patterns: Vec<String>,
    // Only the daemon binary needs a command to spawn
    pub server: Option<ServerCommandConfig>,
    #[serde(default)]
    pub protected_jobs: Vec<ProtectedJobConfig>,
    #[serde(default)]
    pub messages: MessageTemplates,
}

fn default_daily_restart_time() -> String {
    defaults::DAILY_RESTART_TIME.to_string()
}

fn default_warning_seconds() -> u64 {
    defaults::WARNING_SECONDS
}

fn default_true() -> bool {
    true
}

fn default_grace_delay() -> u64 {
    restart::GRACE_DELAY_SECONDS
}

fn default_stop_timeout() -> u64 {
    restart::STOP_TIMEOUT_SECONDS
}

fn default_ignore_patterns() -> Vec<String> {
    vec![
        "No targets matched selector".to_string(),
        "command successfully executed".to_string(),
    ]
}

/// How the cycle after a deferred restart is anchored.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeferralPolicy {
    /// Next cycle runs at the configured daily time again
    #[default]
    KeepDailyTime,
    /// Next cycle runs one day after the deferred restart actually happened
    ShiftDailyTime,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerCommandConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
    pub working_dir: Option<String>,
    pub properties_file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtectedJobConfig {
    pub name: String,
    pub lock_file: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageTemplates {
    pub restart_one_warn: String,
    pub restart_min_warn: String,
    pub restart_sec_title: String,
    pub restart_sec_subtitle: String,
    pub restart_abort: String,
    pub restart_msg: String,
    pub minutes_word: String,
    pub seconds_word: String,
    pub log_load: String,
    pub log_unload: String,
    pub log_restart: String,
}

impl Default for MessageTemplates {
    fn default() -> Self {
        Self {
            restart_one_warn: "The server will restart in {0} {1}".to_string(),
            restart_min_warn: "§c§lLess than {0} min to scheduled restart!".to_string(),
            restart_sec_title: "§c{0}".to_string(),
            restart_sec_subtitle: "§c§lseconds until restart".to_string(),
            restart_abort:
                "An important process is still running, can't restart. Trying again in {0} minutes"
                    .to_string(),
            restart_msg: "§6{0} is going down for a scheduled restart".to_string(),
            minutes_word: "minutes".to_string(),
            seconds_word: "seconds".to_string(),
            log_load: "Scheduler loaded, next restart in {0} minutes, at {1}".to_string(),
            log_unload: "Scheduler unloaded".to_string(),
            log_restart: "Waiting {0} seconds before starting the server".to_string(),
        }
    }
}

/// Validated, typed view of the schedule settings.
#[derive(Debug, Clone)]
pub struct ScheduleConfig {
    pub daily_time: NaiveTime,
    pub daily_time_label: String,
    pub warning_lead: Duration,
    pub high_visibility: bool,
    pub testing_mode: bool,
    pub zone: ScheduleZone,
    pub grace_delay: Duration,
    pub stop_timeout: Duration,
    pub deferral_policy: DeferralPolicy,
    pub status_messages: bool,
    pub ignore_patterns: Vec<String>,
}

impl ScheduleConfig {
    /// Delay before a deferred restart is retried
    pub fn retry_delay(&self) -> Duration {
        self.warning_lead
            .saturating_mul(crate::constants::schedule::DEFERRAL_LEAD_MULTIPLIER)
    }
}

impl RestartConfig {
    pub fn schedule_config(&self) -> Result<ScheduleConfig, ConfigError> {
        let daily_time = parse_time_of_day(&self.daily_restart_time)?;
        let zone = ScheduleZone::parse(self.timezone.as_deref())?;

        if self.warning_seconds == 0 {
            return Err(ConfigError::InvalidValue {
                field: "warning_seconds".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.warning_seconds > MAX_WARNING_SECONDS {
            return Err(ConfigError::InvalidValue {
                field: "warning_seconds".to_string(),
                reason: format!("must be at most {} (one day)", MAX_WARNING_SECONDS),
            });
        }

        Ok(ScheduleConfig {
            daily_time,
            daily_time_label: self.daily_restart_time.trim().to_string(),
            warning_lead: Duration::from_secs(self.warning_seconds),
            high_visibility: self.high_visibility,
            testing_mode: self.testing_mode,
            zone,
            grace_delay: Duration::from_secs(self.grace_delay_seconds),
            stop_timeout: Duration::from_secs(self.stop_timeout_seconds),
            deferral_policy: self.deferral_policy,
            status_messages: self.status_messages,
            ignore_patterns: self
                .ignore_patterns
                .iter()
                .filter(|p| !p.is_empty())
                .cloned()
                .collect(),
        })
    }
}

impl Default for RestartConfig {
    fn default() -> Self {
        Self {
            daily_restart_time: default_daily_restart_time(),
            warning_seconds: default_warning_seconds(),
            high_visibility: true,
            testing_mode: false,
            timezone: None,
            grace_delay_seconds: default_grace_delay(),
            stop_timeout_seconds: default_stop_timeout(),
            deferral_policy: DeferralPolicy::default(),
            status_messages: true,
            ignore_patterns: default_ignore_patterns(),
            server: None,
            protected_jobs: Vec::new(),
            messages: MessageTemplates::default(),
        }
    }
}
