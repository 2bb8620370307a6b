// File: restarter/src/process/child.rs
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::process::Stdio;
use std::sync::{Arc, RwLock as StdRwLock};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{ChildStdin, Command as AsyncCommand};
use tokio::sync::{broadcast, watch, Mutex};
use tracing::{debug, error, info, warn};

use super::{ProcessExit, ServerProcess};
use crate::config::ServerCommandConfig;

/// Runs the server as a child process with its console on piped stdin/stdout.
pub struct ChildServer {
    command: ServerCommandConfig,
    stdin: Mutex<Option<ChildStdin>>,
    running: watch::Sender<bool>,
    exits: broadcast::Sender<ProcessExit>,
    ignore_patterns: Arc<StdRwLock<Vec<String>>>,
}

impl ChildServer {
    pub fn new(command: ServerCommandConfig) -> Self {
        let (running, _) = watch::channel(false);
        let (exits, _) = broadcast::channel(16);
        Self {
            command,
            stdin: Mutex::new(None),
            running,
            exits,
            ignore_patterns: Arc::new(StdRwLock::new(Vec::new())),
        }
    }

    pub fn is_running(&self) -> bool {
        *self.running.borrow()
    }
}

fn is_ignored(patterns: &StdRwLock<Vec<String>>, line: &str) -> bool {
    match patterns.read() {
        Ok(patterns) => patterns.iter().any(|p| line.contains(p.as_str())),
        Err(_) => false,
    }
}

#[async_trait]
impl ServerProcess for ChildServer {
    async fn send_input(&self, line: &str) -> Result<()> {
        let mut guard = self.stdin.lock().await;
        let stdin = guard
            .as_mut()
            .ok_or_else(|| anyhow!("Server is not running, dropped input: {}", line))?;

        stdin.write_all(line.as_bytes()).await?;
        stdin.write_all(b"\n").await?;
        stdin.flush().await?;
        debug!("Sent to server: {}", line);
        Ok(())
    }

    async fn start(&self) -> Result<()> {
        if self.is_running() {
            return Err(anyhow!("Server {} is already running", self.command.command));
        }

        info!("Starting server: {} {:?}", self.command.command, self.command.args);

        let mut command = AsyncCommand::new(&self.command.command);
        command
            .args(&self.command.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.command.working_dir {
            command.current_dir(dir);
        }

        let mut child = command
            .spawn()
            .map_err(|e| anyhow!("Failed to spawn {}: {}", self.command.command, e))?;

        let stdin = child
            .stdin
            .take()
            .ok_or_else(|| anyhow!("Server stdin was not captured"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| anyhow!("Server stdout was not captured"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| anyhow!("Server stderr was not captured"))?;

        *self.stdin.lock().await = Some(stdin);
        self.running.send_replace(true);

        let patterns = self.ignore_patterns.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                if !is_ignored(&patterns, &line) {
                    info!(target: "server", "{}", line);
                }
            }
        });

        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                warn!(target: "server", "{}", line);
            }
        });

        let running = self.running.clone();
        let exits = self.exits.clone();
        tokio::spawn(async move {
            let code = match child.wait().await {
                Ok(status) => status.code(),
                Err(e) => {
                    error!("Failed waiting on server process: {}", e);
                    None
                }
            };
            info!("Server process exited with code {:?}", code);
            running.send_replace(false);
            // No subscribers is fine
            let _ = exits.send(ProcessExit { code });
        });

        Ok(())
    }

    async fn wait_for_exit(&self) -> Result<()> {
        let mut running = self.running.subscribe();
        running
            .wait_for(|running| !*running)
            .await
            .map_err(|e| anyhow!("Exit watch closed: {}", e))?;
        Ok(())
    }

    async fn close(&self) -> Result<()> {
        if self.is_running() {
            return Err(anyhow!("Cannot release a server that is still running"));
        }
        self.stdin.lock().await.take();
        debug!("Released server process handles");
        Ok(())
    }

    fn add_ignore_pattern(&self, pattern: &str) {
        if let Ok(mut patterns) = self.ignore_patterns.write() {
            patterns.push(pattern.to_string());
        }
    }

    fn exit_events(&self) -> broadcast::Receiver<ProcessExit> {
        self.exits.subscribe()
    }
}
