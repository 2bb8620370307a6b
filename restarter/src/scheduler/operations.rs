// File: restarter/src/scheduler/operations.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, oneshot, watch};
use tokio::task::JoinHandle;
use tokio::time::{sleep, sleep_until, Instant};
use tracing::{debug, error, info, instrument, warn};
use uuid::Uuid;

use super::{Phase, ScheduleState, SchedulerStatus};
use crate::clock::Clock;
use crate::config::{DeferralPolicy, MessageTemplates, RestartConfig, ScheduleConfig};
use crate::constants::defaults::COMMAND_QUEUE_CAPACITY;
use crate::constants::restart::EXIT_SETTLE;
use crate::errors::{ExecutorError, RestartError};
use crate::hooks::{Hook, HookRegistry};
use crate::process::{ProcessExit, ServerProcess};
use crate::services::notifier::format_template;
use crate::services::{
    BusyGate, CascadeHandle, ExecutorSettings, NotificationCascade, Notifier, RestartExecutor,
};
use crate::watchdog::{Watchdog, WatchdogSignal};

/// Everything the scheduler needs from its host.
pub struct HostContext {
    pub config: Arc<RestartConfig>,
    pub process: Arc<dyn ServerProcess>,
    pub watchdog: Arc<dyn Watchdog>,
    pub gate: BusyGate,
    pub clock: Arc<dyn Clock>,
    pub world_name: String,
}

enum Command {
    Trigger { cycle: u64 },
    CountdownStarted { cycle: u64 },
    RestartFinished { result: Result<(), ExecutorError> },
    ProcessExited(ProcessExit),
    ExitSettled { seq: u64, exit: ProcessExit },
    Watchdog(WatchdogSignal),
    Status(oneshot::Sender<SchedulerStatus>),
    Unload(oneshot::Sender<()>),
}

/// Cloneable handle to a running scheduler.
#[derive(Clone)]
pub struct SchedulerHandle {
    commands: mpsc::Sender<Command>,
    hooks: HookRegistry,
    stopped: watch::Receiver<bool>,
}

impl SchedulerHandle {
    pub async fn register_hook<F>(&self, hook: Hook, callback: F)
    where
        F: Fn(Hook) -> Result<()> + Send + Sync + 'static,
    {
        self.hooks.register(hook, callback).await;
    }

    pub async fn status(&self) -> Result<SchedulerStatus, RestartError> {
        let (tx, rx) = oneshot::channel();
        self.commands
            .send(Command::Status(tx))
            .await
            .map_err(|_| RestartError::SchedulerStopped)?;
        rx.await.map_err(|_| RestartError::SchedulerStopped)
    }

    /// Cancels every pending timer and stops the scheduler. Unloading a
    /// stopped scheduler is a no-op.
    pub async fn unload(&self) {
        let (tx, rx) = oneshot::channel();
        if self.commands.send(Command::Unload(tx)).await.is_ok() {
            let _ = rx.await;
        }
    }

    pub fn is_running(&self) -> bool {
        !*self.stopped.borrow()
    }

    /// Resolves once the scheduler has torn itself down.
    pub async fn stopped(&self) {
        let mut stopped = self.stopped.clone();
        let _ = stopped.wait_for(|stopped| *stopped).await;
    }

    pub async fn process_exited(&self, exit: ProcessExit) {
        let _ = self.commands.send(Command::ProcessExited(exit)).await;
    }

    pub async fn watchdog_signal(&self, signal: WatchdogSignal) {
        let _ = self.commands.send(Command::Watchdog(signal)).await;
    }
}

pub struct RestartScheduler {
    schedule: ScheduleConfig,
    templates: Arc<MessageTemplates>,
    notifier: Notifier,
    gate: BusyGate,
    clock: Arc<dyn Clock>,
    cascade: NotificationCascade,
    executor: Arc<RestartExecutor>,
    state: ScheduleState,
    phase: Phase,
    cycle: u64,
    cycle_id: Uuid,
    exit_seq: u64,
    trigger: Option<JoinHandle<()>>,
    countdown: Option<CascadeHandle>,
    settle: Option<JoinHandle<()>>,
    commands: mpsc::Sender<Command>,
    stopped: watch::Sender<bool>,
}

impl RestartScheduler {
    /// Validates the schedule, arms the first cycle and starts the scheduler task.
    #[instrument(skip(ctx))]
    pub async fn initialize(ctx: HostContext) -> Result<SchedulerHandle, RestartError> {
        let schedule = ctx.config.schedule_config()?;
        let templates = Arc::new(ctx.config.messages.clone());

        for pattern in &schedule.ignore_patterns {
            ctx.process.add_ignore_pattern(pattern);
        }

        let hooks = HookRegistry::new();
        let notifier = Notifier::new(ctx.process.clone());
        let cascade = NotificationCascade::new(
            notifier.clone(),
            templates.clone(),
            schedule.high_visibility,
            schedule.warning_lead,
        );
        let executor = Arc::new(RestartExecutor::new(
            ctx.process.clone(),
            ctx.watchdog.clone(),
            hooks.clone(),
            templates.clone(),
            ExecutorSettings {
                grace_delay: schedule.grace_delay,
                stop_timeout: schedule.stop_timeout,
                announce_world: schedule.status_messages.then(|| ctx.world_name.clone()),
            },
        ));

        let (commands, receiver) = mpsc::channel(COMMAND_QUEUE_CAPACITY);
        let (stopped, stopped_rx) = watch::channel(false);

        forward(ctx.process.exit_events(), commands.clone(), Command::ProcessExited);
        forward(ctx.watchdog.signals(), commands.clone(), Command::Watchdog);

        let now = ctx.clock.now();
        let first = schedule
            .zone
            .next_restart(now, schedule.daily_time, schedule.testing_mode);

        let mut scheduler = Self {
            schedule,
            templates,
            notifier,
            gate: ctx.gate,
            clock: ctx.clock,
            cascade,
            executor,
            state: ScheduleState::new(first),
            phase: Phase::Idle,
            cycle: 0,
            cycle_id: Uuid::new_v4(),
            exit_seq: 0,
            trigger: None,
            countdown: None,
            settle: None,
            commands: commands.clone(),
            stopped,
        };

        scheduler.arm_cycle(Phase::CountdownArmed);

        let minutes = (first - now).num_minutes();
        info!(
            "{}",
            format_template(
                &scheduler.templates.log_load,
                &[&minutes, &scheduler.schedule.daily_time_label]
            )
        );

        tokio::spawn(scheduler.run(receiver));

        Ok(SchedulerHandle {
            commands,
            hooks,
            stopped: stopped_rx,
        })
    }

    async fn run(mut self, mut receiver: mpsc::Receiver<Command>) {
        while let Some(command) = receiver.recv().await {
            match command {
                Command::Trigger { cycle } => self.on_trigger(cycle).await,
                Command::CountdownStarted { cycle } => self.on_countdown_started(cycle),
                Command::RestartFinished { result } => self.on_restart_finished(result),
                Command::ProcessExited(exit) => self.on_process_exited(exit),
                Command::ExitSettled { seq, exit } => self.on_exit_settled(seq, exit),
                Command::Watchdog(signal) => self.on_watchdog(signal),
                Command::Status(reply) => {
                    let _ = reply.send(self.status());
                }
                Command::Unload(ack) => {
                    self.teardown("unload requested");
                    let _ = ack.send(());
                }
            }

            if self.phase == Phase::Stopped {
                break;
            }
        }
        self.stopped.send_replace(true);
    }

    fn status(&self) -> SchedulerStatus {
        SchedulerStatus {
            phase: self.phase,
            next_restart: self.state.next_restart(),
            restarting: self.state.is_restarting(),
            crashing: self.state.is_crashing(),
            deferrals: self.state.deferrals(),
            cycle: self.cycle,
        }
    }

    /// Replaces the trigger and the countdown with ones aimed at `state.next_restart`.
    fn arm_cycle(&mut self, phase: Phase) {
        if self.state.is_restarting() {
            warn!("Refusing to arm a restart while one is in progress");
            return;
        }
        self.cancel_timers();
        self.cycle += 1;
        let cycle = self.cycle;

        let remaining = until(self.state.next_restart(), self.clock.now());
        let deadline = Instant::now() + remaining;

        let commands = self.commands.clone();
        self.trigger = Some(tokio::spawn(async move {
            sleep_until(deadline).await;
            let _ = commands.send(Command::Trigger { cycle }).await;
        }));

        let commands = self.commands.clone();
        self.countdown = Some(self.cascade.arm(remaining, move || {
            if commands.try_send(Command::CountdownStarted { cycle }).is_err() {
                debug!("Scheduler queue unavailable for countdown start of cycle {}", cycle);
            }
        }));

        self.phase = phase;
        debug!(
            "Cycle {} armed for {} ({}s from now)",
            cycle,
            self.state.next_restart(),
            remaining.as_secs()
        );
    }

    fn on_countdown_started(&mut self, cycle: u64) {
        if cycle == self.cycle && matches!(self.phase, Phase::CountdownArmed | Phase::Deferred) {
            self.phase = Phase::Ticking;
        }
    }

    async fn on_trigger(&mut self, cycle: u64) {
        if cycle != self.cycle {
            debug!("Ignoring stale trigger for cycle {}", cycle);
            return;
        }
        self.trigger = None;

        if self.state.is_restarting() {
            warn!("Restart trigger fired while a restart is in progress, ignoring");
            return;
        }

        let busy = self.gate.busy_jobs();
        if busy.is_empty() {
            self.begin_restart();
        } else {
            self.defer(&busy).await;
        }
    }

    fn begin_restart(&mut self) {
        self.cancel_timers();
        self.state.begin_restart();
        self.phase = Phase::ExecutingRestart;
        self.cycle_id = Uuid::new_v4();
        info!(
            "Executing scheduled restart (cycle_id: {}, deferrals: {})",
            self.cycle_id,
            self.state.deferrals()
        );

        let executor = self.executor.clone();
        let commands = self.commands.clone();
        tokio::spawn(async move {
            let result = executor.execute().await;
            if commands
                .send(Command::RestartFinished { result })
                .await
                .is_err()
            {
                warn!("Restart finished after the scheduler stopped");
            }
        });
    }

    async fn defer(&mut self, busy: &[String]) {
        let delay = self.schedule.retry_delay();
        let minutes = delay.as_secs() as f64 / 60.0;
        let message = format_template(&self.templates.restart_abort, &[&minutes]);
        warn!("{} (busy: {})", message, busy.join(", "));
        self.notifier.broadcast_best_effort(&message).await;

        let step = match chrono::Duration::from_std(delay) {
            Ok(step) => step,
            Err(e) => {
                error!("Retry delay of {}s is out of range: {}", delay.as_secs(), e);
                self.teardown("retry delay out of range");
                return;
            }
        };
        let next = self.state.defer(step);
        info!(
            "Restart deferred to {} (deferral #{})",
            next,
            self.state.deferrals()
        );
        self.arm_cycle(Phase::Deferred);
    }

    fn on_restart_finished(&mut self, result: Result<(), ExecutorError>) {
        let server_stopped = match &result {
            Ok(()) => true,
            Err(e) => e.server_stopped(),
        };
        self.state.end_restart(server_stopped);

        match result {
            Ok(()) => {
                let next = self.next_cycle_instant();
                self.state.schedule(next);
                self.arm_cycle(Phase::CountdownArmed);
                info!(
                    "Restart cycle {} complete, next restart at {}",
                    self.cycle_id, next
                );
            }
            Err(e) => {
                error!(
                    "Scheduled restart failed (cycle_id: {}): {}. Server left down until it is recovered",
                    self.cycle_id, e
                );
                self.phase = Phase::Halted;
            }
        }
    }

    fn next_cycle_instant(&self) -> DateTime<Utc> {
        let executed = self.state.next_restart();
        match self.schedule.deferral_policy {
            DeferralPolicy::ShiftDailyTime => executed + chrono::Duration::days(1),
            DeferralPolicy::KeepDailyTime => {
                let candidate = self.schedule.zone.next_restart(
                    self.clock.now(),
                    self.schedule.daily_time,
                    self.schedule.testing_mode,
                );
                if candidate <= executed {
                    candidate + chrono::Duration::days(1)
                } else {
                    candidate
                }
            }
        }
    }

    fn on_process_exited(&mut self, exit: ProcessExit) {
        // The exit may be reported after the restart that caused it has finished
        if self.state.claim_planned_exit() {
            debug!("Server exit during planned restart (code {:?})", exit.code);
            return;
        }

        // Give the watchdog a moment to flag a crash before judging the exit.
        self.exit_seq += 1;
        let seq = self.exit_seq;
        let commands = self.commands.clone();
        if let Some(previous) = self.settle.replace(tokio::spawn(async move {
            sleep(EXIT_SETTLE).await;
            let _ = commands.send(Command::ExitSettled { seq, exit }).await;
        })) {
            previous.abort();
        }
    }

    fn on_exit_settled(&mut self, seq: u64, exit: ProcessExit) {
        if seq != self.exit_seq {
            return;
        }
        self.settle = None;

        if !self.state.exit_is_unexpected() {
            info!(
                "Server exit (code {:?}) covered by restart or crash recovery",
                exit.code
            );
            return;
        }
        let busy = self.gate.busy_jobs();
        if !busy.is_empty() {
            warn!(
                "Server exited (code {:?}) while {} in progress, keeping schedule",
                exit.code,
                busy.join(", ")
            );
            return;
        }

        error!("Server exited unexpectedly (code {:?})", exit.code);
        self.teardown("unexpected server exit");
    }

    fn on_watchdog(&mut self, signal: WatchdogSignal) {
        match signal {
            WatchdogSignal::CrashDetected => {
                warn!("Watchdog detected a server crash");
                self.state.mark_crashing(true);
            }
            WatchdogSignal::LimitReached => {
                if self.state.is_restarting() {
                    warn!("Watchdog crash limit reached during a planned restart, ignoring");
                } else {
                    error!("Watchdog crash limit reached");
                    self.teardown("watchdog crash limit reached");
                }
            }
            WatchdogSignal::StabilityRestored => {
                self.state.mark_crashing(false);
                if self.phase == Phase::Halted {
                    info!("Server stable again, resuming the daily schedule");
                    let next = self.schedule.zone.next_restart(
                        self.clock.now(),
                        self.schedule.daily_time,
                        self.schedule.testing_mode,
                    );
                    self.state.schedule(next);
                    self.arm_cycle(Phase::CountdownArmed);
                }
            }
        }
    }

    fn cancel_timers(&mut self) {
        if let Some(trigger) = self.trigger.take() {
            trigger.abort();
        }
        if let Some(countdown) = self.countdown.take() {
            countdown.cancel();
        }
    }

    fn teardown(&mut self, reason: &str) {
        if self.phase == Phase::Stopped {
            return;
        }
        self.cancel_timers();
        if let Some(settle) = self.settle.take() {
            settle.abort();
        }
        self.phase = Phase::Stopped;
        self.stopped.send_replace(true);
        info!("{} ({})", self.templates.log_unload, reason);
    }
}

fn until(instant: DateTime<Utc>, now: DateTime<Utc>) -> Duration {
    (instant - now).to_std().unwrap_or(Duration::ZERO)
}

fn forward<T, F>(mut events: broadcast::Receiver<T>, commands: mpsc::Sender<Command>, wrap: F)
where
    T: Clone + Send + 'static,
    F: Fn(T) -> Command + Send + 'static,
{
    tokio::spawn(async move {
        loop {
            match events.recv().await {
                Ok(event) => {
                    if commands.send(wrap(event)).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(missed)) => {
                    warn!("Scheduler missed {} collaborator events", missed);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });
}
