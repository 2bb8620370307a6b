// File: restarter/src/services/notifier.rs
//! Renders message templates and delivers them to players through the server console.

use anyhow::Result;
use serde_json::json;
use std::fmt::Display;
use std::sync::Arc;
use tracing::warn;

use crate::process::ServerProcess;

/// Substitutes `{0}`, `{1}`, ... with the matching argument. Unknown indices
/// and unbalanced braces are kept verbatim.
pub fn format_template(template: &str, args: &[&dyn Display]) -> String {
    let mut out = String::with_capacity(template.len() + 16);
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        let substituted = after.find('}').and_then(|close| {
            let index = after[..close].parse::<usize>().ok()?;
            let arg = args.get(index)?;
            Some((arg.to_string(), close))
        });

        match substituted {
            Some((value, close)) => {
                out.push_str(&value);
                rest = &after[close + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

/// Builds the raw-text broadcast command. Double quotes are swapped for single
/// quotes so the message can never break out of the JSON text field.
pub fn tellraw_command(message: &str) -> String {
    let payload = json!({ "rawtext": [{ "text": message.replace('"', "'") }] });
    format!("tellraw @a {}", payload)
}

pub fn title_command(text: &str) -> String {
    format!("title @a title {}", text)
}

pub fn actionbar_command(text: &str) -> String {
    format!("title @a actionbar {}", text)
}

#[derive(Clone)]
pub struct Notifier {
    process: Arc<dyn ServerProcess>,
}

impl Notifier {
    pub fn new(process: Arc<dyn ServerProcess>) -> Self {
        Self { process }
    }

    pub async fn broadcast(&self, message: &str) -> Result<()> {
        self.process.send_input(&tellraw_command(message)).await
    }

    pub async fn title(&self, text: &str) -> Result<()> {
        self.process.send_input(&title_command(text)).await
    }

    pub async fn actionbar(&self, text: &str) -> Result<()> {
        self.process.send_input(&actionbar_command(text)).await
    }

    /// Broadcast that only logs on failure; countdown messages are never retried.
    pub async fn broadcast_best_effort(&self, message: &str) {
        if let Err(e) = self.broadcast(message).await {
            warn!("Failed to deliver broadcast '{}': {}", message, e);
        }
    }
}
