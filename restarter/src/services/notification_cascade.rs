// File: restarter/src/services/notification_cascade.rs
//! Notification cascade: player-facing warnings counting down to a restart
//!
//! Two presentation modes:
//!
//! - **High visibility**: after `remaining - lead` a one-second tick drives a
//!   countdown. Minute warnings go to the action bar on whole-minute ticks;
//!   the last ten seconds show a title and subtitle every second.
//! - **Normal**: after `remaining - lead` a single chat broadcast announces
//!   the lead time.
//!
//! Every [`arm`](NotificationCascade::arm) returns a fresh [`CascadeHandle`];
//! dropping or cancelling it stops that countdown, which is how a re-arm
//! supersedes the previous one.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{interval_at, sleep, Instant};
use tracing::{debug, info, warn};

use crate::config::MessageTemplates;
use crate::constants::countdown::{
    MINUTE_BOUNDARY_WINDOW_MS, SECONDS_BAND_MS, SECONDS_UNIT_MAX, TICK_INTERVAL, TICK_MS,
};
use crate::services::notifier::{format_template, Notifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CountdownNotice {
    /// "less than N minutes"
    MinuteWarning { minutes: u64 },
    /// Title + subtitle pair for the final seconds
    SecondsLeft { seconds: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TickOutcome {
    Emit(CountdownNotice),
    Quiet,
    Finished,
}

/// Remaining time of one high-visibility countdown.
#[derive(Debug, Clone)]
pub struct Countdown {
    ms_remaining: u64,
}

impl Countdown {
    pub fn new(ms_remaining: u64) -> Self {
        Self { ms_remaining }
    }

    pub fn ms_remaining(&self) -> u64 {
        self.ms_remaining
    }

    pub fn tick(&mut self) -> TickOutcome {
        self.ms_remaining = self.ms_remaining.saturating_sub(TICK_MS);
        let ms = self.ms_remaining;

        if ms < TICK_MS {
            TickOutcome::Finished
        } else if ms <= SECONDS_BAND_MS {
            TickOutcome::Emit(CountdownNotice::SecondsLeft {
                seconds: ms.div_ceil(1_000),
            })
        } else if ms % 60_000 < MINUTE_BOUNDARY_WINDOW_MS {
            TickOutcome::Emit(CountdownNotice::MinuteWarning {
                minutes: ms.div_ceil(60_000),
            })
        } else {
            TickOutcome::Quiet
        }
    }
}

/// Amount and unit for the normal-mode announcement.
pub fn describe_lead(seconds: u64) -> (String, LeadUnit) {
    if seconds <= SECONDS_UNIT_MAX {
        (seconds.to_string(), LeadUnit::Seconds)
    } else {
        ((seconds as f64 / 60.0).to_string(), LeadUnit::Minutes)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LeadUnit {
    Seconds,
    Minutes,
}

pub struct CascadeHandle {
    task: JoinHandle<()>,
    cancelled: Arc<AtomicBool>,
}

impl CascadeHandle {
    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::SeqCst);
        self.task.abort();
    }
}

impl Drop for CascadeHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

#[derive(Clone)]
pub struct NotificationCascade {
    notifier: Notifier,
    templates: Arc<MessageTemplates>,
    high_visibility: bool,
    lead: Duration,
}

impl NotificationCascade {
    pub fn new(
        notifier: Notifier,
        templates: Arc<MessageTemplates>,
        high_visibility: bool,
        lead: Duration,
    ) -> Self {
        Self {
            notifier,
            templates,
            high_visibility,
            lead,
        }
    }

    /// Arms a countdown ending `remaining` from now. `on_countdown_start` runs
    /// once the lead window opens.
    pub fn arm<F>(&self, remaining: Duration, on_countdown_start: F) -> CascadeHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let cancelled = Arc::new(AtomicBool::new(false));
        let cascade = self.clone();
        let flag = cancelled.clone();

        let coarse = remaining.saturating_sub(self.lead);
        let window = remaining.min(self.lead);
        debug!(
            "Arming {} cascade: {}s until warnings, {}s window",
            if self.high_visibility { "high-visibility" } else { "normal" },
            coarse.as_secs(),
            window.as_secs()
        );

        let task = tokio::spawn(async move {
            sleep(coarse).await;
            if flag.load(Ordering::SeqCst) {
                return;
            }
            on_countdown_start();

            if cascade.high_visibility {
                cascade.run_countdown(window, &flag).await;
            } else {
                cascade.announce_lead(window).await;
            }
        });

        CascadeHandle { task, cancelled }
    }

    async fn run_countdown(&self, window: Duration, cancelled: &AtomicBool) {
        let mut countdown = Countdown::new(window.as_millis() as u64);
        let mut ticker = interval_at(Instant::now() + TICK_INTERVAL, TICK_INTERVAL);
        info!("Restart countdown started: {}s left", window.as_secs());

        loop {
            ticker.tick().await;
            if cancelled.load(Ordering::SeqCst) {
                return;
            }

            match countdown.tick() {
                TickOutcome::Finished => break,
                TickOutcome::Quiet => {}
                TickOutcome::Emit(notice) => self.emit(notice).await,
            }
        }
        debug!("Restart countdown finished");
    }

    async fn emit(&self, notice: CountdownNotice) {
        let result = match notice {
            CountdownNotice::MinuteWarning { minutes } => {
                let text = format_template(&self.templates.restart_min_warn, &[&minutes]);
                self.notifier.actionbar(&text).await
            }
            CountdownNotice::SecondsLeft { seconds } => {
                let subtitle = &self.templates.restart_sec_subtitle;
                let title = &self.templates.restart_sec_title;
                let mut result = Ok(());
                if !subtitle.is_empty() {
                    let text = format_template(subtitle, &[&seconds]);
                    result = self.notifier.actionbar(&text).await;
                }
                if !title.is_empty() {
                    let text = format_template(title, &[&seconds]);
                    let title_result = self.notifier.title(&text).await;
                    result = result.and(title_result);
                }
                result
            }
        };

        if let Err(e) = result {
            warn!("Failed to deliver countdown notice {:?}: {}", notice, e);
        }
    }

    async fn announce_lead(&self, window: Duration) {
        // Round so a window of 599.9s still reads as 10 minutes
        let seconds = (window.as_millis() as u64 + 500) / 1_000;
        let (amount, unit) = describe_lead(seconds);
        let unit_word = match unit {
            LeadUnit::Seconds => &self.templates.seconds_word,
            LeadUnit::Minutes => &self.templates.minutes_word,
        };
        let message = format_template(&self.templates.restart_one_warn, &[&amount, unit_word]);
        info!("{}", message);
        self.notifier.broadcast_best_effort(&message).await;
    }
}
