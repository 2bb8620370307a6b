//! Lifecycle hooks other components can subscribe to
//!
//! Subscribers are trusted in-process extensions. Invocation is synchronous and
//! in registration order; a failing subscriber stops the dispatch and its error
//! is returned to the caller.

use anyhow::Result;
use serde::Serialize;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Hook {
    GoingDown,
    StartingUp,
}

impl Hook {
    pub const ALL: [Hook; 2] = [Hook::GoingDown, Hook::StartingUp];

    pub fn name(&self) -> &'static str {
        match self {
            Hook::GoingDown => "GOING_DOWN",
            Hook::StartingUp => "STARTING_UP",
        }
    }
}

impl fmt::Display for Hook {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

pub type HookHandler = Arc<dyn Fn(Hook) -> Result<()> + Send + Sync>;

#[derive(Clone, Default)]
pub struct HookRegistry {
    subscribers: Arc<RwLock<HashMap<Hook, Vec<HookHandler>>>>,
}

impl HookRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn register<F>(&self, hook: Hook, callback: F)
    where
        F: Fn(Hook) -> Result<()> + Send + Sync + 'static,
    {
        let mut subscribers = self.subscribers.write().await;
        subscribers.entry(hook).or_default().push(Arc::new(callback));
        debug!("Registered subscriber for hook {}", hook);
    }

    pub async fn invoke(&self, hook: Hook) -> Result<()> {
        // Snapshot the list so subscribers may register further hooks.
        let handlers: Vec<HookHandler> = {
            let subscribers = self.subscribers.read().await;
            match subscribers.get(&hook) {
                Some(handlers) => handlers.clone(),
                None => return Ok(()),
            }
        };

        debug!("Invoking hook {} on {} subscribers", hook, handlers.len());
        for handler in handlers {
            handler(hook)?;
        }
        Ok(())
    }

    pub async fn subscriber_count(&self, hook: Hook) -> usize {
        let subscribers = self.subscribers.read().await;
        subscribers.get(&hook).map_or(0, Vec::len)
    }
}
