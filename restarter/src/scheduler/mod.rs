//! Daily restart scheduling for the managed server
//!
//! This module owns the single answer to "when does the next restart happen"
//! and drives the full daily cycle:
//! - Next-occurrence computation with day rollover and a minimum advance notice
//! - Countdown warnings through the notification cascade
//! - Deferral while a protected job (backup, render) is running
//! - The stop/wait/start transition and the hooks around it
//! - Teardown when the server exits outside a planned restart or crash recovery
//!
//! # State machine
//!
//! ```text
//! Idle ──arm──► CountdownArmed ──lead window──► Ticking ──trigger──┬─► ExecutingRestart ──ok──► CountdownArmed
//!                     ▲                                            │            └──err──► Halted ──stable──► CountdownArmed
//!                     │                                            └─► Deferred (busy) ──► Ticking ──trigger──► ...
//! any state ──unload / unexpected exit / crash limit──► Stopped
//! ```
//!
//! All transitions happen inside one actor task; timers, process exits and
//! watchdog signals only post commands to it.
//!
//! # Configuration
//!
//! ```toml
//! daily_restart_time = "04:00"
//! warning_seconds = 600
//! high_visibility = true
//! deferral_policy = "keep_daily_time"
//! ```

pub mod operations;
pub mod state;
pub mod timing;

pub use operations::{HostContext, RestartScheduler, SchedulerHandle};
pub use state::ScheduleState;

use chrono::{DateTime, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Idle,
    CountdownArmed,
    Ticking,
    ExecutingRestart,
    Deferred,
    /// The last restart failed; waiting for the watchdog to report a stable server
    Halted,
    Stopped,
}

#[derive(Debug, Clone, Serialize)]
pub struct SchedulerStatus {
    pub phase: Phase,
    pub next_restart: DateTime<Utc>,
    pub restarting: bool,
    pub crashing: bool,
    pub deferrals: u32,
    pub cycle: u64,
}
