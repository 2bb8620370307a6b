//! Custom error types for the restart coordinator
//!
//! Provides structured error handling with context for configuration and
//! restart transition failures.

use std::fmt;

use crate::hooks::Hook;

/// Main error type for the restart coordinator
#[derive(Debug)]
pub enum RestartError {
    /// Configuration-related errors
    Config(ConfigError),

    /// The scheduler is no longer running
    SchedulerStopped,
}

/// Configuration error variants
#[derive(Debug)]
pub enum ConfigError {
    /// Failed to load configuration file
    LoadFailed { path: String, reason: String },

    /// Invalid configuration value
    InvalidValue { field: String, reason: String },

    /// Configuration parsing error
    ParseError { reason: String },
}

/// Restart transition error variants, one per failing step
#[derive(Debug)]
pub enum ExecutorError {
    /// A lifecycle hook subscriber failed
    HookFailed { hook: Hook, reason: String },

    /// The stop command could not be delivered
    StopFailed { reason: String },

    /// Waiting for the process to exit failed
    ExitWaitFailed { reason: String },

    /// The process did not exit within the stop timeout
    ExitTimeout { seconds: u64 },

    /// Releasing the old process failed
    CloseFailed { reason: String },

    /// The new process instance did not start
    StartFailed { reason: String },
}

impl ExecutorError {
    /// True when the failure happened after the server had already exited,
    /// so an exit notification for it may still be in flight.
    pub fn server_stopped(&self) -> bool {
        matches!(
            self,
            ExecutorError::CloseFailed { .. }
                | ExecutorError::StartFailed { .. }
                | ExecutorError::HookFailed {
                    hook: Hook::StartingUp,
                    ..
                }
        )
    }
}

impl fmt::Display for RestartError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RestartError::Config(e) => write!(f, "Configuration error: {}", e),
            RestartError::SchedulerStopped => write!(f, "Restart scheduler is not running"),
        }
    }
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::LoadFailed { path, reason } => {
                write!(f, "Failed to load config from '{}': {}", path, reason)
            }
            ConfigError::InvalidValue { field, reason } => {
                write!(f, "Invalid value for '{}': {}", field, reason)
            }
            ConfigError::ParseError { reason } => {
                write!(f, "Failed to parse config: {}", reason)
            }
        }
    }
}

impl fmt::Display for ExecutorError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecutorError::HookFailed { hook, reason } => {
                write!(f, "Hook {} subscriber failed: {}", hook, reason)
            }
            ExecutorError::StopFailed { reason } => {
                write!(f, "Failed to send stop command: {}", reason)
            }
            ExecutorError::ExitWaitFailed { reason } => {
                write!(f, "Failed waiting for server exit: {}", reason)
            }
            ExecutorError::ExitTimeout { seconds } => {
                write!(f, "Server did not exit within {}s", seconds)
            }
            ExecutorError::CloseFailed { reason } => {
                write!(f, "Failed to release server process: {}", reason)
            }
            ExecutorError::StartFailed { reason } => {
                write!(f, "Server failed to start: {}", reason)
            }
        }
    }
}

impl std::error::Error for RestartError {}
impl std::error::Error for ConfigError {}
impl std::error::Error for ExecutorError {}

impl From<ConfigError> for RestartError {
    fn from(err: ConfigError) -> Self {
        RestartError::Config(err)
    }
}
