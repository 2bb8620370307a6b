// File: restarter/src/main.rs
use anyhow::{anyhow, Result};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::{fmt, EnvFilter};

use restarter::config::properties::read_level_name;
use restarter::constants::{defaults, restart::STOP_COMMAND};
use restarter::{
    BusyGate, ChildServer, ConfigManager, HostContext, LockFileJob, RestartScheduler,
    ServerProcess, SystemClock, WatchdogSwitch,
};

#[tokio::main]
async fn main() -> Result<()> {
    let env_filter = EnvFilter::from_default_env()
        .add_directive("restarter=info".parse()?)
        .add_directive("server=info".parse()?);

    fmt().with_env_filter(env_filter).init();

    info!("Starting scheduled restart daemon");

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| defaults::CONFIG_PATH.to_string());
    let config_manager = ConfigManager::new(config_path).await?;
    let config = config_manager.get_current_config();

    let server_config = config
        .server
        .clone()
        .ok_or_else(|| anyhow!("No [server] section configured, nothing to manage"))?;

    let properties_path = match &server_config.properties_file {
        Some(path) => PathBuf::from(path),
        None => server_config
            .working_dir
            .as_deref()
            .map(PathBuf::from)
            .unwrap_or_default()
            .join("server.properties"),
    };
    let world_name = read_level_name(&properties_path).await;
    info!("Managing world '{}'", world_name);

    let server = Arc::new(ChildServer::new(server_config));
    server.start().await?;

    let watchdog = Arc::new(WatchdogSwitch::new());

    let mut gate = BusyGate::new();
    for job in &config.protected_jobs {
        gate = gate.with_job(Arc::new(LockFileJob::new(&job.name, &job.lock_file)));
    }
    info!("Busy gate watching {} protected jobs", gate.job_count());

    let handle = RestartScheduler::initialize(HostContext {
        config: config.clone(),
        process: server.clone(),
        watchdog,
        gate,
        clock: Arc::new(SystemClock),
        world_name,
    })
    .await?;

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            if let Err(e) = result {
                error!("Failed to listen for shutdown signal: {}", e);
            }
            info!("Shutdown requested");
            handle.unload().await;

            if server.is_running() {
                if let Err(e) = server.send_input(STOP_COMMAND).await {
                    warn!("Failed to stop server cleanly: {}", e);
                } else if let Err(e) = server.wait_for_exit().await {
                    warn!("Failed waiting for server shutdown: {}", e);
                }
            }
        }
        _ = handle.stopped() => {
            warn!("Scheduler stopped, leaving the server as it is");
        }
    }

    Ok(())
}
