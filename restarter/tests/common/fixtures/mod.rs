//! This module provides reusable test utilities:
//! - A scripted server process that records every console line
//! - A controllable watchdog
//! - Test configuration builders
//! - A harness that starts a scheduler on a paused clock

// Allow unused code in test fixtures - not every test uses every helper
#![allow(dead_code)]
#![allow(unused_imports)]

pub mod event_log;
pub mod harness;
pub mod mock_server;
pub mod mock_watchdog;
pub mod test_config;

// Re-export commonly used items
pub use event_log::{Event, EventLog};
pub use harness::{advance_to, origin, Harness, WORLD_NAME};
pub use mock_server::MockServer;
pub use mock_watchdog::MockWatchdog;
pub use test_config::TestConfigBuilder;
