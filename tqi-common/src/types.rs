//! Input data model shared by the analysis engine and its collaborators.
//!
//! Ingestion adapters produce [`TestOutcome`] records from vendor result
//! files and replay prior executions as [`HistoricalRun`] records; the
//! engine consumes both read-only. Nothing here is mutated after
//! construction.

use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Outcome of a single test execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum TestStatus {
    /// Test completed and its assertions held.
    Passed,
    /// Test completed but an assertion failed.
    Failed,
    /// Test did not complete (setup error, crash, environment fault).
    Broken,
}

impl TestStatus {
    /// Only `Passed` counts as passing; `Broken` is treated as a failure
    /// everywhere failure rates are computed.
    pub fn is_passing(&self) -> bool {
        matches!(self, Self::Passed)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Passed => "passed",
            Self::Failed => "failed",
            Self::Broken => "broken",
        }
    }
}

impl std::fmt::Display for TestStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Identifier linking a test to a managed test case (e.g. `C12345`),
/// extracted from the outcome's tag text.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct TestCaseId(pub String);

impl TestCaseId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TestCaseId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of an outcome within one run: suite + test name + parameter key.
///
/// Parameterized tests share a name but differ in `parameter`; each
/// parameterization is its own outcome.
#[derive(
    Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
pub struct OutcomeKey {
    pub suite: String,
    pub test: String,
    pub parameter: String,
}

impl std::fmt::Display for OutcomeKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.parameter.is_empty() {
            write!(f, "{}::{}", self.suite, self.test)
        } else {
            write!(f, "{}::{} [{}]", self.suite, self.test, self.parameter)
        }
    }
}

/// One normalized per-test record from the current run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TestOutcome {
    /// Suite (top-level grouping) the test belongs to.
    pub suite: String,
    /// Test name as reported by the runner.
    pub test: String,
    /// Parameter key for parameterized tests; empty when not parameterized.
    #[serde(default)]
    pub parameter: String,
    /// Execution outcome.
    pub status: TestStatus,
    /// Vendor-reported duration text (e.g. `"1 m 5 s"`), kept for diagnostics.
    #[serde(default)]
    pub duration_raw: String,
    /// Duration in milliseconds derived from `duration_raw` by ingestion.
    #[serde(default)]
    pub duration_ms: u64,
    /// Step that was executing when the test failed; empty for passing tests.
    #[serde(default)]
    pub failing_step: String,
    /// Failure message; empty for passing tests.
    #[serde(default)]
    pub failure_reason: String,
    /// Raw tag text; test-case IDs are extracted from it.
    #[serde(default)]
    pub tags: String,
    /// Screenshot reference captured at failure time, if any. Locating and
    /// copying the file is the ingestion side's concern.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub screenshot: Option<String>,
}

impl TestOutcome {
    pub fn key(&self) -> OutcomeKey {
        OutcomeKey {
            suite: self.suite.clone(),
            test: self.test.clone(),
            parameter: self.parameter.clone(),
        }
    }

    pub fn is_passing(&self) -> bool {
        self.status.is_passing()
    }
}

/// One prior execution of a test, supplied by the caller alongside the
/// current batch. Append-only input; the engine never mutates history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct HistoricalRun {
    pub suite: String,
    pub test: String,
    pub status: TestStatus,
    #[serde(default)]
    pub duration_ms: u64,
    /// Date the run executed on; per-day series are grouped by this.
    pub executed_on: NaiveDate,
    /// Build identifier of the run, if the caller tracks one.
    #[serde(default)]
    pub build_id: String,
    /// Environment label (e.g. `staging`), if the caller tracks one.
    #[serde(default)]
    pub environment: String,
}
