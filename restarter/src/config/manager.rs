// File: restarter/src/config/manager.rs
use super::{RestartConfig, ScheduleConfig};
use crate::errors::ConfigError;
use std::sync::Arc;
use tokio::fs;
use tracing::info;

#[derive(Debug)]
pub struct ConfigManager {
    current_config: Arc<RestartConfig>,
    schedule: ScheduleConfig,
}

impl ConfigManager {
    pub async fn new(config_path: String) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(&config_path)
            .await
            .map_err(|e| ConfigError::LoadFailed {
                path: config_path.clone(),
                reason: e.to_string(),
            })?;

        let manager = Self::from_toml(&content)?;
        info!(
            "Loaded restart config from {}: daily at {}, {}s warning, {} mode",
            config_path,
            manager.schedule.daily_time_label,
            manager.schedule.warning_lead.as_secs(),
            if manager.schedule.high_visibility { "high-visibility" } else { "normal" }
        );
        Ok(manager)
    }

    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: RestartConfig = toml::from_str(content).map_err(|e| ConfigError::ParseError {
            reason: e.to_string(),
        })?;
        Self::from_config(config)
    }

    pub fn from_config(config: RestartConfig) -> Result<Self, ConfigError> {
        let schedule = config.schedule_config()?;
        Ok(Self {
            current_config: Arc::new(config),
            schedule,
        })
    }

    pub fn get_current_config(&self) -> Arc<RestartConfig> {
        self.current_config.clone()
    }

    pub fn schedule(&self) -> &ScheduleConfig {
        &self.schedule
    }
}
