//! Scripted server process for testing
//!
//! Records console input in the shared [`EventLog`] and behaves like a server
//! that exits as soon as it receives `stop`.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use restarter::{ProcessExit, ServerProcess};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;
use tokio::sync::{broadcast, watch};

use super::event_log::{Event, EventLog};

pub struct MockServer {
    log: EventLog,
    running: watch::Sender<bool>,
    exits: broadcast::Sender<ProcessExit>,
    fail_start: AtomicBool,
    exit_on_stop: AtomicBool,
    reject_input: AtomicBool,
    ignore_patterns: Mutex<Vec<String>>,
}

impl MockServer {
    /// A server that is already running
    pub fn new(log: EventLog) -> Self {
        let (running, _) = watch::channel(true);
        let (exits, _) = broadcast::channel(16);
        Self {
            log,
            running,
            exits,
            fail_start: AtomicBool::new(false),
            exit_on_stop: AtomicBool::new(true),
            reject_input: AtomicBool::new(false),
            ignore_patterns: Mutex::new(Vec::new()),
        }
    }

    pub fn fail_next_start(&self) {
        self.fail_start.store(true, Ordering::SeqCst);
    }

    /// Keep running after `stop`, so the stop wait times out
    pub fn ignore_stop(&self) {
        self.exit_on_stop.store(false, Ordering::SeqCst);
    }

    /// Make every console write fail
    pub fn reject_input(&self) {
        self.reject_input.store(true, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        *self.running.borrow()
    }

    /// Simulates the process dying outside any planned restart
    pub fn crash(&self, code: i32) {
        self.exit(Some(code));
    }

    pub fn ignore_patterns(&self) -> Vec<String> {
        self.ignore_patterns.lock().unwrap().clone()
    }

    fn exit(&self, code: Option<i32>) {
        self.running.send_replace(false);
        let _ = self.exits.send(ProcessExit { code });
    }
}

#[async_trait]
impl ServerProcess for MockServer {
    async fn send_input(&self, line: &str) -> Result<()> {
        if self.reject_input.load(Ordering::SeqCst) {
            return Err(anyhow!("console closed"));
        }
        self.log.push(Event::Input(line.to_string()));
        if line == "stop" && self.exit_on_stop.load(Ordering::SeqCst) {
            self.exit(Some(0));
        }
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        if self.fail_start.swap(false, Ordering::SeqCst) {
            return Err(anyhow!("executable not found"));
        }
        self.log.push(Event::Start);
        self.running.send_replace(true);
        Ok(())
    }

    async fn wait_for_exit(&self) -> Result<()> {
        let mut running = self.running.subscribe();
        running.wait_for(|running| !*running).await?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        self.log.push(Event::Close);
        Ok(())
    }

    fn add_ignore_pattern(&self, pattern: &str) {
        self.ignore_patterns.lock().unwrap().push(pattern.to_string());
    }

    fn exit_events(&self) -> broadcast::Receiver<ProcessExit> {
        self.exits.subscribe()
    }
}
