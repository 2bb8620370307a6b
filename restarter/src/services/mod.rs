// File: restarter/src/services/mod.rs
pub mod busy_gate;
pub mod notification_cascade;
pub mod notifier;
pub mod restart_executor;

pub use busy_gate::{BusyGate, JobFlag, LockFileJob, ProtectedJob};
pub use notification_cascade::{CascadeHandle, NotificationCascade};
pub use notifier::Notifier;
pub use restart_executor::{ExecutorSettings, RestartExecutor};
