use std::sync::Once;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use tqi_common::{HistoricalRun, TestOutcome, TestStatus};

static INIT: Once = Once::new();

pub fn init_test_logging() {
    INIT.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"));

        tracing_subscriber::registry()
            .with(
                fmt::layer()
                    .with_test_writer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_thread_ids(true)
                    .json(),
            )
            .with(filter)
            .init();
    });
}

/// Outcome with the given status and unremarkable defaults.
#[allow(dead_code)]
pub fn make_outcome(suite: &str, test: &str, status: TestStatus) -> TestOutcome {
    TestOutcome {
        suite: suite.to_string(),
        test: test.to_string(),
        parameter: String::new(),
        status,
        duration_raw: "1 s".to_string(),
        duration_ms: 1_000,
        failing_step: String::new(),
        failure_reason: String::new(),
        tags: String::new(),
        screenshot: None,
    }
}

/// Failing outcome carrying a reason and step.
#[allow(dead_code)]
pub fn make_failure(suite: &str, test: &str, reason: &str, step: &str) -> TestOutcome {
    let mut outcome = make_outcome(suite, test, TestStatus::Failed);
    outcome.failure_reason = reason.to_string();
    outcome.failing_step = step.to_string();
    outcome
}

/// Historical execution on the given day.
#[allow(dead_code)]
pub fn make_history(suite: &str, test: &str, status: TestStatus, date: &str) -> HistoricalRun {
    HistoricalRun {
        suite: suite.to_string(),
        test: test.to_string(),
        status,
        duration_ms: 1_000,
        executed_on: date.parse().expect("valid test date"),
        build_id: format!("build-{date}"),
        environment: "ci".to_string(),
    }
}
