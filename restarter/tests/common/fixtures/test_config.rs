//! Test configuration builder for creating restart configs programmatically

use restarter::config::{DeferralPolicy, ProtectedJobConfig};
use restarter::RestartConfig;
use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

/// Builder for restart configurations. Defaults to UTC and testing mode so
/// scenarios can schedule restarts close to the clock origin.
pub struct TestConfigBuilder {
    config: RestartConfig,
}

impl TestConfigBuilder {
    pub fn new() -> Self {
        let config = RestartConfig {
            daily_restart_time: "11:00".to_string(),
            warning_seconds: 600,
            testing_mode: true,
            timezone: Some("UTC".to_string()),
            ..RestartConfig::default()
        };
        Self { config }
    }

    pub fn daily_restart_time(mut self, time: &str) -> Self {
        self.config.daily_restart_time = time.to_string();
        self
    }

    pub fn warning_seconds(mut self, seconds: u64) -> Self {
        self.config.warning_seconds = seconds;
        self
    }

    pub fn high_visibility(mut self, enabled: bool) -> Self {
        self.config.high_visibility = enabled;
        self
    }

    pub fn testing_mode(mut self, enabled: bool) -> Self {
        self.config.testing_mode = enabled;
        self
    }

    pub fn grace_delay_seconds(mut self, seconds: u64) -> Self {
        self.config.grace_delay_seconds = seconds;
        self
    }

    pub fn stop_timeout_seconds(mut self, seconds: u64) -> Self {
        self.config.stop_timeout_seconds = seconds;
        self
    }

    pub fn deferral_policy(mut self, policy: DeferralPolicy) -> Self {
        self.config.deferral_policy = policy;
        self
    }

    pub fn status_messages(mut self, enabled: bool) -> Self {
        self.config.status_messages = enabled;
        self
    }

    pub fn protected_job(mut self, name: &str, lock_file: &str) -> Self {
        self.config.protected_jobs.push(ProtectedJobConfig {
            name: name.to_string(),
            lock_file: lock_file.to_string(),
        });
        self
    }

    pub fn build(self) -> Arc<RestartConfig> {
        Arc::new(self.config)
    }

    /// Write the config as TOML into a temp directory
    pub fn write(self) -> TestConfigFile {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("restart.toml");
        let content = toml::to_string(&self.config).expect("Failed to serialize config");
        fs::write(&path, content).expect("Failed to write restart.toml");
        TestConfigFile {
            _temp_dir: temp_dir,
            path,
        }
    }
}

impl Default for TestConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Config file on disk; removed when dropped
pub struct TestConfigFile {
    _temp_dir: TempDir,
    pub path: PathBuf,
}

impl TestConfigFile {
    pub fn path_string(&self) -> String {
        self.path.to_string_lossy().to_string()
    }
}
