//! Test-support utilities shared across the workspace's test suites.

pub mod log;

pub use log::{TestGuard, TestLogEntry, TestLogger, TestPhase, init_global_test_logging};
