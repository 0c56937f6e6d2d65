//! Structured test logging for CI debugging.
//!
//! Provides JSONL output for test execution so failed CI runs can be
//! diagnosed from artifacts alone.
//!
//! # Global JSONL Logging
//!
//! For automatic JSONL output from all tests without code changes, call
//! `init_global_test_logging()` once in your test setup:
//!
//! ```ignore
//! use tqi_common::testing::init_global_test_logging;
//!
//! #[ctor::ctor]
//! fn setup() {
//!     init_global_test_logging();
//! }
//! ```

use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::PathBuf;
use std::sync::{Mutex, Once};
use std::time::Instant;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;

/// Test execution phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TestPhase {
    /// Test initialization.
    Setup,
    /// Main test execution.
    Execute,
    /// Result verification.
    Verify,
    /// Resource cleanup.
    Teardown,
}

impl std::fmt::Display for TestPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Setup => write!(f, "setup"),
            Self::Execute => write!(f, "execute"),
            Self::Verify => write!(f, "verify"),
            Self::Teardown => write!(f, "teardown"),
        }
    }
}

static GLOBAL_LOGGING_INIT: Once = Once::new();

/// Initialize global JSONL logging for all tests.
///
/// Sets up a tracing subscriber that writes JSON events to
/// `target/test-logs/all_tests.jsonl` and a compact human-readable layer to
/// the test writer. Safe to call multiple times; initialization happens once.
///
/// # Environment Variables
///
/// - `TQI_TEST_LOG_FILE`: override the log file path
/// - `TQI_TEST_LOG_LEVEL`: level filter for workspace crates (default `info`)
pub fn init_global_test_logging() {
    GLOBAL_LOGGING_INIT.call_once(|| {
        let log_file = create_global_log_file();

        let file_layer = log_file.map(|file| {
            tracing_subscriber::fmt::layer()
                .json()
                .with_writer(Mutex::new(file))
                .with_span_events(FmtSpan::CLOSE)
                .with_current_span(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true)
        });

        let stderr_layer = tracing_subscriber::fmt::layer()
            .with_test_writer()
            .with_target(true)
            .with_level(true)
            .compact();

        let level = std::env::var("TQI_TEST_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let filter =
            tracing_subscriber::EnvFilter::try_new(format!("tqi_common={level},tqi_engine={level}"))
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

        let subscriber = tracing_subscriber::registry()
            .with(filter)
            .with(file_layer)
            .with(stderr_layer);

        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}

fn create_global_log_file() -> Option<std::fs::File> {
    if let Ok(custom_path) = std::env::var("TQI_TEST_LOG_FILE") {
        if let Some(parent) = PathBuf::from(&custom_path).parent() {
            let _ = std::fs::create_dir_all(parent);
        }
        return std::fs::File::create(&custom_path).ok();
    }

    let log_dir = find_target_dir().join("test-logs");
    let _ = std::fs::create_dir_all(&log_dir);
    std::fs::File::create(log_dir.join("all_tests.jsonl")).ok()
}

/// Find the target directory by searching up from the current dir.
fn find_target_dir() -> PathBuf {
    if let Ok(target_dir) = std::env::var("CARGO_TARGET_DIR") {
        return PathBuf::from(target_dir);
    }

    let mut cwd = std::env::current_dir().unwrap_or_default();
    loop {
        let target = cwd.join("target");
        if target.is_dir() {
            return target;
        }
        if !cwd.pop() {
            return PathBuf::from("target");
        }
    }
}

/// A structured log entry for test execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestLogEntry {
    /// ISO-8601 timestamp.
    pub timestamp: String,
    /// Name of the test.
    pub test_name: String,
    /// Current phase of test execution.
    pub phase: TestPhase,
    /// Log message.
    pub message: String,
    /// Optional structured data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
    /// Duration since test start in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u64>,
}

impl TestLogEntry {
    pub fn new(test_name: &str, phase: TestPhase, message: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Utc::now().to_rfc3339(),
            test_name: test_name.to_string(),
            phase,
            message: message.into(),
            data: None,
            duration_ms: None,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }

    #[must_use]
    pub fn with_duration(mut self, duration_ms: u64) -> Self {
        self.duration_ms = Some(duration_ms);
        self
    }
}

/// Structured test logger that writes JSONL output.
///
/// Creates one log file per test in `target/test-logs/` for post-mortem
/// debugging.
pub struct TestLogger {
    test_name: String,
    start_time: Instant,
    log_file: Option<Mutex<std::fs::File>>,
}

impl TestLogger {
    pub fn for_test(test_name: &str) -> Self {
        let log_file = Self::create_log_file(test_name).ok();

        let logger = Self {
            test_name: test_name.to_string(),
            start_time: Instant::now(),
            log_file: log_file.map(Mutex::new),
        };

        logger.log(TestPhase::Setup, "TEST START");

        logger
    }

    fn create_log_file(test_name: &str) -> std::io::Result<std::fs::File> {
        let log_dir = find_target_dir().join("test-logs");
        std::fs::create_dir_all(&log_dir)?;

        let safe_name = test_name.replace("::", "_").replace(['/', '\\'], "_");
        std::fs::File::create(log_dir.join(format!("{safe_name}.jsonl")))
    }

    /// Log a message for a specific phase.
    pub fn log(&self, phase: TestPhase, message: impl Into<String>) {
        let duration_ms = self.start_time.elapsed().as_millis() as u64;
        let entry = TestLogEntry::new(&self.test_name, phase, message).with_duration(duration_ms);

        self.write_entry(&entry);
    }

    /// Log a message with structured data.
    pub fn log_with_data(
        &self,
        phase: TestPhase,
        message: impl Into<String>,
        data: serde_json::Value,
    ) {
        let duration_ms = self.start_time.elapsed().as_millis() as u64;
        let entry = TestLogEntry::new(&self.test_name, phase, message)
            .with_duration(duration_ms)
            .with_data(data);

        self.write_entry(&entry);
    }

    fn write_entry(&self, entry: &TestLogEntry) {
        if let Some(file) = &self.log_file
            && let Ok(mut f) = file.lock()
            && let Ok(json) = serde_json::to_string(entry)
        {
            let _ = writeln!(f, "{json}");
        }

        // Also emit to tracing for immediate visibility
        tracing::info!(
            test = %self.test_name,
            phase = %entry.phase,
            duration_ms = entry.duration_ms,
            "{}",
            entry.message
        );
    }

    /// Mark the test as passed and log completion.
    pub fn pass(self) {
        self.log(TestPhase::Verify, "TEST PASS");
    }

    /// Mark the test as failed and log completion.
    pub fn fail(self, reason: impl Into<String>) {
        self.log_with_data(
            TestPhase::Verify,
            "TEST FAIL",
            serde_json::json!({ "reason": reason.into() }),
        );
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start_time.elapsed().as_millis() as u64
    }
}

/// Zero-boilerplate test logger that auto-logs pass/fail on drop.
///
/// Logs TEST PASS when dropped normally, TEST FAIL when dropped during a
/// panic, so tests never need explicit `.pass()` / `.fail()` calls.
///
/// # Environment Variables
///
/// - `TQI_TEST_LOGGING=1`: enable logging (default: enabled in CI only)
/// - `TQI_TEST_LOGGING=0`: disable logging
///
/// When disabled, the guard is a no-op.
pub struct TestGuard {
    inner: Option<TestLogger>,
}

impl TestGuard {
    pub fn new(test_name: &str) -> Self {
        let enabled = Self::is_enabled();
        Self {
            inner: if enabled {
                init_global_test_logging();
                Some(TestLogger::for_test(test_name))
            } else {
                None
            },
        }
    }

    fn is_enabled() -> bool {
        match std::env::var("TQI_TEST_LOGGING").as_deref() {
            Ok("1" | "true") => true,
            Ok("0" | "false") => false,
            _ => std::env::var("CI").is_ok(),
        }
    }

    pub fn log(&self, phase: TestPhase, message: impl Into<String>) {
        if let Some(logger) = &self.inner {
            logger.log(phase, message);
        }
    }

    pub fn log_with_data(
        &self,
        phase: TestPhase,
        message: impl Into<String>,
        data: serde_json::Value,
    ) {
        if let Some(logger) = &self.inner {
            logger.log_with_data(phase, message, data);
        }
    }
}

impl Drop for TestGuard {
    fn drop(&mut self) {
        if let Some(logger) = self.inner.take() {
            if std::thread::panicking() {
                logger.fail("test panicked");
            } else {
                logger.pass();
            }
        }
    }
}

/// Create a [`TestGuard`] named after the current function.
///
/// ```ignore
/// #[test]
/// fn detects_flaky_alternation() {
///     let _guard = tqi_common::test_guard!();
///     // ... test logic ...
/// }
/// ```
#[macro_export]
macro_rules! test_guard {
    () => {{
        fn _f() {}
        fn _type_name_of<T>(_: T) -> &'static str {
            std::any::type_name::<T>()
        }
        let name = _type_name_of(_f);
        let name = name.strip_suffix("::_f").unwrap_or(name);
        let name = name.rsplit("::").next().unwrap_or(name);
        $crate::testing::TestGuard::new(name)
    }};
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_entry_serializes_all_fields() {
        let entry = TestLogEntry::new("entry_test", TestPhase::Setup, "Hello")
            .with_duration(42)
            .with_data(serde_json::json!({"key": "value"}));

        let json = serde_json::to_string(&entry).unwrap();
        assert!(json.contains("entry_test"));
        assert!(json.contains("setup"));
        assert!(json.contains("Hello"));
        assert!(json.contains("42"));
        assert!(json.contains("key"));
    }

    #[test]
    fn log_entry_omits_absent_optionals() {
        let entry = TestLogEntry::new("entry_test", TestPhase::Execute, "plain");
        let json = serde_json::to_string(&entry).unwrap();
        assert!(!json.contains("duration_ms"));
        assert!(!json.contains("\"data\""));
    }

    #[test]
    fn phase_display_matches_serde() {
        assert_eq!(TestPhase::Setup.to_string(), "setup");
        assert_eq!(TestPhase::Execute.to_string(), "execute");
        assert_eq!(TestPhase::Verify.to_string(), "verify");
        assert_eq!(TestPhase::Teardown.to_string(), "teardown");
    }

    #[test]
    fn logger_logs_without_panicking() {
        let logger = TestLogger::for_test("logger_smoke");
        logger.log(TestPhase::Execute, "running");
        logger.log_with_data(
            TestPhase::Verify,
            "checking",
            serde_json::json!({"ok": true}),
        );
        logger.pass();
    }

    #[test]
    fn guard_is_noop_when_disabled() {
        let guard = TestGuard { inner: None };
        guard.log(TestPhase::Execute, "no-op");
        guard.log_with_data(TestPhase::Verify, "no-op", serde_json::json!({}));
    }

    #[test]
    fn guard_logs_pass_on_clean_drop() {
        let guard = TestGuard {
            inner: Some(TestLogger::for_test("guard_clean_drop")),
        };
        guard.log(TestPhase::Execute, "before drop");
    }
}
