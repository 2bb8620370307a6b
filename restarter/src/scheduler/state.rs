//! Mutable schedule state owned by the scheduler actor.

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleState {
    next_restart: DateTime<Utc>,
    restarting: bool,
    /// A planned exit whose notification has not been seen yet
    planned_exit: bool,
    crashing: bool,
    deferrals: u32,
}

impl ScheduleState {
    pub fn new(next_restart: DateTime<Utc>) -> Self {
        Self {
            next_restart,
            restarting: false,
            planned_exit: false,
            crashing: false,
            deferrals: 0,
        }
    }

    pub fn next_restart(&self) -> DateTime<Utc> {
        self.next_restart
    }

    pub fn is_restarting(&self) -> bool {
        self.restarting
    }

    pub fn is_crashing(&self) -> bool {
        self.crashing
    }

    /// Deferrals since the last successful restart
    pub fn deferrals(&self) -> u32 {
        self.deferrals
    }

    pub fn begin_restart(&mut self) {
        self.restarting = true;
        self.planned_exit = true;
    }

    /// Ends the transition. When the server went down during it, the planned
    /// exit stays claimable until its notification arrives.
    pub fn end_restart(&mut self, server_stopped: bool) {
        self.restarting = false;
        if !server_stopped {
            self.planned_exit = false;
        }
    }

    /// Consumes the planned exit of the current restart, if any.
    pub fn claim_planned_exit(&mut self) -> bool {
        if self.restarting || self.planned_exit {
            self.planned_exit = false;
            return true;
        }
        false
    }

    pub fn mark_crashing(&mut self, crashing: bool) {
        if self.crashing != crashing {
            debug!("Crash flag changed: {} -> {}", self.crashing, crashing);
        }
        self.crashing = crashing;
    }

    /// Moves the pending restart back by `delay` from its current instant.
    pub fn defer(&mut self, delay: Duration) -> DateTime<Utc> {
        self.next_restart += delay;
        self.deferrals += 1;
        self.next_restart
    }

    /// Starts a new daily cycle at `instant`.
    pub fn schedule(&mut self, instant: DateTime<Utc>) {
        self.next_restart = instant;
        self.deferrals = 0;
    }

    /// True when an exit of the managed process was neither planned nor a known crash.
    pub fn exit_is_unexpected(&self) -> bool {
        !self.restarting && !self.crashing
    }
}
