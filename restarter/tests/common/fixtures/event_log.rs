//! Shared, ordered record of everything the collaborators saw

use restarter::Hook;
use std::sync::{Arc, Mutex};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    Input(String),
    Start,
    Close,
    WatchdogEnabled,
    WatchdogDisabled,
    Hook(Hook),
}

#[derive(Clone, Default)]
pub struct EventLog {
    events: Arc<Mutex<Vec<Event>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }

    pub fn snapshot(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn clear(&self) {
        self.events.lock().unwrap().clear();
    }

    /// Console lines, in order
    pub fn inputs(&self) -> Vec<String> {
        self.snapshot()
            .into_iter()
            .filter_map(|event| match event {
                Event::Input(line) => Some(line),
                _ => None,
            })
            .collect()
    }

    pub fn inputs_starting_with(&self, prefix: &str) -> Vec<String> {
        self.inputs()
            .into_iter()
            .filter(|line| line.starts_with(prefix))
            .collect()
    }

    pub fn broadcasts(&self) -> Vec<String> {
        self.inputs_starting_with("tellraw @a ")
    }

    pub fn hooks(&self) -> Vec<Hook> {
        self.snapshot()
            .into_iter()
            .filter_map(|event| match event {
                Event::Hook(hook) => Some(hook),
                _ => None,
            })
            .collect()
    }

    pub fn count(&self, event: &Event) -> usize {
        self.snapshot().iter().filter(|e| *e == event).count()
    }

    /// Index of the first matching event
    pub fn position(&self, event: &Event) -> Option<usize> {
        self.snapshot().iter().position(|e| e == event)
    }

    /// Lifecycle events only, dropping countdown and broadcast traffic
    pub fn lifecycle(&self) -> Vec<Event> {
        self.snapshot()
            .into_iter()
            .filter(|event| match event {
                Event::Input(line) => line == "stop",
                _ => true,
            })
            .collect()
    }
}
