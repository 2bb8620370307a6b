// File: restarter/src/watchdog.rs
//! Boundary to the crash watchdog
//!
//! Crash detection lives outside this crate. The scheduler only toggles the
//! watchdog around a planned restart and listens to its signals.

use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;
use tracing::{debug, info};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatchdogSignal {
    /// The watchdog saw the server crash and is recovering it
    CrashDetected,
    /// The watchdog gave up after too many crashes
    LimitReached,
    /// The server has been stable again since the last crash
    StabilityRestored,
}

pub trait Watchdog: Send + Sync {
    fn enable(&self);
    fn disable(&self);
    fn signals(&self) -> broadcast::Receiver<WatchdogSignal>;
}

/// Enable flag plus a signal channel that an external crash detector feeds.
pub struct WatchdogSwitch {
    enabled: AtomicBool,
    signals: broadcast::Sender<WatchdogSignal>,
}

impl WatchdogSwitch {
    pub fn new() -> Self {
        let (signals, _) = broadcast::channel(16);
        Self {
            enabled: AtomicBool::new(true),
            signals,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Publishes a signal; signals raised while disabled are dropped.
    pub fn report(&self, signal: WatchdogSignal) -> bool {
        if !self.is_enabled() {
            debug!("Watchdog disabled, dropping {:?}", signal);
            return false;
        }
        let _ = self.signals.send(signal);
        true
    }
}

impl Default for WatchdogSwitch {
    fn default() -> Self {
        Self::new()
    }
}

impl Watchdog for WatchdogSwitch {
    fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
        info!("Watchdog enabled");
    }

    fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        info!("Watchdog disabled");
    }

    fn signals(&self) -> broadcast::Receiver<WatchdogSignal> {
        self.signals.subscribe()
    }
}
