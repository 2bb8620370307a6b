// File: restarter/src/config/properties.rs
//! Reads the world name out of the managed server's `server.properties`.

use std::path::Path;
use tokio::fs;
use tracing::{debug, warn};

use crate::constants::defaults;

pub async fn read_level_name(path: impl AsRef<Path>) -> String {
    let path = path.as_ref();
    match fs::read_to_string(path).await {
        Ok(content) => parse_level_name(&content).unwrap_or_else(|| {
            debug!("No level-name in {}, using default", path.display());
            defaults::WORLD_NAME.to_string()
        }),
        Err(e) => {
            warn!("Could not read {}: {}", path.display(), e);
            defaults::WORLD_NAME.to_string()
        }
    }
}

pub fn parse_level_name(content: &str) -> Option<String> {
    content
        .lines()
        .filter_map(|line| line.strip_prefix("level-name="))
        .map(str::trim)
        .find(|name| !name.is_empty())
        .map(str::to_string)
}
