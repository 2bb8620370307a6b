//! Starts a scheduler wired to mocks, on a clock anchored at a fixed origin

use chrono::{DateTime, TimeZone, Utc};
use restarter::{
    AnchoredClock, BusyGate, Hook, HostContext, JobFlag, RestartConfig, RestartScheduler,
    SchedulerHandle, SchedulerStatus,
};
use std::sync::Arc;

use super::event_log::{Event, EventLog};
use super::mock_server::MockServer;
use super::mock_watchdog::MockWatchdog;

pub const WORLD_NAME: &str = "Test World";

/// 2024-03-01 10:00:00 UTC
pub fn origin() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap()
}

pub struct Harness {
    pub log: EventLog,
    pub server: Arc<MockServer>,
    pub watchdog: Arc<MockWatchdog>,
    pub backup: Arc<JobFlag>,
    pub clock: AnchoredClock,
    pub handle: SchedulerHandle,
}

impl Harness {
    /// Initializes a scheduler and subscribes recording handlers to both hooks.
    pub async fn start(config: Arc<RestartConfig>) -> Self {
        let log = EventLog::new();
        let server = Arc::new(MockServer::new(log.clone()));
        let watchdog = Arc::new(MockWatchdog::new(log.clone()));
        let backup = Arc::new(JobFlag::new("backup"));
        let clock = AnchoredClock::new(origin());

        let handle = RestartScheduler::initialize(HostContext {
            config,
            process: server.clone(),
            watchdog: watchdog.clone(),
            gate: BusyGate::new().with_job(backup.clone()),
            clock: Arc::new(clock),
            world_name: WORLD_NAME.to_string(),
        })
        .await
        .expect("Failed to initialize scheduler");

        for hook in Hook::ALL {
            let hook_log = log.clone();
            handle
                .register_hook(hook, move |hook| {
                    hook_log.push(Event::Hook(hook));
                    Ok(())
                })
                .await;
        }

        Self {
            log,
            server,
            watchdog,
            backup,
            clock,
            handle,
        }
    }

    pub async fn status(&self) -> SchedulerStatus {
        self.handle.status().await.expect("Scheduler stopped")
    }

    /// Wall-clock instant `seconds` after the origin
    pub fn at(&self, seconds: i64) -> DateTime<Utc> {
        origin() + chrono::Duration::seconds(seconds)
    }
}

/// Sleeps on the paused tokio clock until `seconds` after the origin.
pub async fn advance_to(harness: &Harness, seconds: u64) {
    let target = harness.at(seconds as i64);
    let now = restarter::Clock::now(&harness.clock);
    if let Ok(remaining) = (target - now).to_std() {
        tokio::time::sleep(remaining).await;
    }
}
