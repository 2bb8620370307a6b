pub mod clock;
pub mod config;
pub mod constants;
pub mod errors;
pub mod hooks;
pub mod process;
pub mod scheduler;
pub mod services;
pub mod watchdog;

// Re-export commonly used types
pub use clock::{AnchoredClock, Clock, SystemClock};
pub use config::{ConfigManager, RestartConfig};
pub use errors::{ConfigError, ExecutorError, RestartError};
pub use hooks::{Hook, HookRegistry};
pub use process::{ChildServer, ProcessExit, ServerProcess};
pub use scheduler::{HostContext, Phase, RestartScheduler, SchedulerHandle, SchedulerStatus};
pub use services::{BusyGate, JobFlag, LockFileJob, ProtectedJob};
pub use watchdog::{Watchdog, WatchdogSignal, WatchdogSwitch};
