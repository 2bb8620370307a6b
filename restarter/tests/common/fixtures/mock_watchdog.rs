//! Watchdog double that records toggles and lets tests raise signals

use restarter::{Watchdog, WatchdogSignal};
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::broadcast;

use super::event_log::{Event, EventLog};

pub struct MockWatchdog {
    log: EventLog,
    enabled: AtomicBool,
    signals: broadcast::Sender<WatchdogSignal>,
}

impl MockWatchdog {
    pub fn new(log: EventLog) -> Self {
        let (signals, _) = broadcast::channel(16);
        Self {
            log,
            enabled: AtomicBool::new(true),
            signals,
        }
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.load(Ordering::SeqCst)
    }

    /// Like a real watchdog, a disabled mock swallows its signals.
    pub fn raise(&self, signal: WatchdogSignal) -> bool {
        if !self.is_enabled() {
            return false;
        }
        let _ = self.signals.send(signal);
        true
    }
}

impl Watchdog for MockWatchdog {
    fn enable(&self) {
        self.enabled.store(true, Ordering::SeqCst);
        self.log.push(Event::WatchdogEnabled);
    }

    fn disable(&self) {
        self.enabled.store(false, Ordering::SeqCst);
        self.log.push(Event::WatchdogDisabled);
    }

    fn signals(&self) -> broadcast::Receiver<WatchdogSignal> {
        self.signals.subscribe()
    }
}
