//! Boundary to the managed server process
//!
//! The scheduler only issues commands through [`ServerProcess`]; supervision
//! and stdout handling belong to the implementation. [`ChildServer`] is the
//! implementation the daemon uses.

pub mod child;

pub use child::ChildServer;

use anyhow::Result;
use async_trait::async_trait;
use tokio::sync::broadcast;

/// Emitted whenever the managed process terminates, for any reason.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    pub code: Option<i32>,
}

#[async_trait]
pub trait ServerProcess: Send + Sync {
    /// Writes one console line to the server.
    async fn send_input(&self, line: &str) -> Result<()>;

    async fn start(&self) -> Result<()>;

    /// Resolves once the current instance has exited.
    async fn wait_for_exit(&self) -> Result<()>;

    /// Releases handles held for an exited instance.
    async fn close(&self) -> Result<()>;

    fn add_ignore_pattern(&self, pattern: &str);

    fn exit_events(&self) -> broadcast::Receiver<ProcessExit>;
}
