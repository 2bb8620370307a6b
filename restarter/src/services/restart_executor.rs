// File: restarter/src/services/restart_executor.rs
//! The restart transition: stop, wait, grace delay, start
//!
//! Steps run strictly in order and none is retried. The first failing step
//! aborts the sequence and is reported to the scheduler, which leaves the
//! server down rather than trying again.

use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::{info, instrument};

use crate::config::MessageTemplates;
use crate::constants::restart::STOP_COMMAND;
use crate::errors::ExecutorError;
use crate::hooks::{Hook, HookRegistry};
use crate::process::ServerProcess;
use crate::services::notifier::{format_template, Notifier};
use crate::watchdog::Watchdog;

pub struct RestartExecutor {
    process: Arc<dyn ServerProcess>,
    watchdog: Arc<dyn Watchdog>,
    hooks: HookRegistry,
    notifier: Notifier,
    templates: Arc<MessageTemplates>,
    settings: ExecutorSettings,
}

#[derive(Debug, Clone)]
pub struct ExecutorSettings {
    pub grace_delay: Duration,
    pub stop_timeout: Duration,
    /// Announce the restart to players with this world name, if set
    pub announce_world: Option<String>,
}

impl RestartExecutor {
    pub fn new(
        process: Arc<dyn ServerProcess>,
        watchdog: Arc<dyn Watchdog>,
        hooks: HookRegistry,
        templates: Arc<MessageTemplates>,
        settings: ExecutorSettings,
    ) -> Self {
        let notifier = Notifier::new(process.clone());
        Self {
            process,
            watchdog,
            hooks,
            notifier,
            templates,
            settings,
        }
    }

    #[instrument(skip(self))]
    pub async fn execute(&self) -> Result<(), ExecutorError> {
        self.fire(Hook::GoingDown).await?;

        if let Some(world) = &self.settings.announce_world {
            if !self.templates.restart_msg.is_empty() {
                let message = format_template(&self.templates.restart_msg, &[world]);
                self.notifier.broadcast_best_effort(&message).await;
            }
        }

        self.watchdog.disable();
        if let Err(e) = self.cycle_process().await {
            // Crash detection stays armed for whatever state the server is left in
            self.watchdog.enable();
            return Err(e);
        }
        self.watchdog.enable();

        self.fire(Hook::StartingUp).await?;
        info!("Scheduled restart complete");
        Ok(())
    }

    /// Stop, wait for exit, release, grace delay, start.
    async fn cycle_process(&self) -> Result<(), ExecutorError> {
        self.process
            .send_input(STOP_COMMAND)
            .await
            .map_err(|e| ExecutorError::StopFailed {
                reason: e.to_string(),
            })?;

        match timeout(self.settings.stop_timeout, self.process.wait_for_exit()).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                return Err(ExecutorError::ExitWaitFailed {
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                return Err(ExecutorError::ExitTimeout {
                    seconds: self.settings.stop_timeout.as_secs(),
                })
            }
        }

        self.process
            .close()
            .await
            .map_err(|e| ExecutorError::CloseFailed {
                reason: e.to_string(),
            })?;

        let grace = self.settings.grace_delay.as_secs();
        info!("{}", format_template(&self.templates.log_restart, &[&grace]));
        sleep(self.settings.grace_delay).await;

        self.process
            .start()
            .await
            .map_err(|e| ExecutorError::StartFailed {
                reason: e.to_string(),
            })?;
        Ok(())
    }

    async fn fire(&self, hook: Hook) -> Result<(), ExecutorError> {
        self.hooks
            .invoke(hook)
            .await
            .map_err(|e| ExecutorError::HookFailed {
                hook,
                reason: e.to_string(),
            })
    }
}
