//! Central repository for scheduling constants and default values
//!
//! Organized by concern so the timing rules of the restart cycle live in a
//! single place.

use std::time::Duration;

/// Daily schedule constants
pub mod schedule {
    /// Minimum distance between startup and the first restart, unless testing mode is on
    pub const MIN_ADVANCE_NOTICE_MINUTES: i64 = 480;

    /// A deferred restart is retried after this many multiples of the warning lead time
    pub const DEFERRAL_LEAD_MULTIPLIER: u32 = 2;

    /// Longest accepted warning lead time, one day
    pub const MAX_WARNING_SECONDS: u64 = 86_400;
}

/// Countdown cascade constants
pub mod countdown {
    use super::Duration;

    /// Interval of the high-visibility countdown tick
    pub const TICK_INTERVAL: Duration = Duration::from_secs(1);

    /// Milliseconds removed from the countdown on every tick
    pub const TICK_MS: u64 = 1_000;

    /// At or below this many milliseconds the countdown switches to per-second titles
    pub const SECONDS_BAND_MS: u64 = 10_500;

    /// Minute warnings fire when the remainder is within this window of a whole minute
    pub const MINUTE_BOUNDARY_WINDOW_MS: u64 = 1_000;

    /// Lead times up to this many seconds are announced in seconds rather than minutes
    pub const SECONDS_UNIT_MAX: u64 = 119;
}

/// Restart transition constants
pub mod restart {
    /// Console command that asks the server to shut down gracefully
    pub const STOP_COMMAND: &str = "stop";

    /// Default pause between process exit and the next start (seconds)
    pub const GRACE_DELAY_SECONDS: u64 = 10;

    /// Default upper bound for the wait on a stopping server (seconds)
    pub const STOP_TIMEOUT_SECONDS: u64 = 300;

    /// Pause before an exit event is evaluated, so a racing crash signal is seen first
    pub const EXIT_SETTLE: std::time::Duration = std::time::Duration::from_secs(1);
}

/// Default configuration values
pub mod defaults {
    /// Default configuration file location
    pub const CONFIG_PATH: &str = "config/restart.toml";

    /// Default daily restart time
    pub const DAILY_RESTART_TIME: &str = "12:00";

    /// Default warning lead time in seconds
    pub const WARNING_SECONDS: u64 = 600;

    /// World name used when server.properties cannot be read
    pub const WORLD_NAME: &str = "Bedrock level";

    /// Queue depth of the scheduler command channel
    pub const COMMAND_QUEUE_CAPACITY: usize = 64;
}
