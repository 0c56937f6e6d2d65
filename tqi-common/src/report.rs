//! The serializable result tree produced by one analysis invocation.
//!
//! Everything in this module is an output contract: presentation
//! collaborators (HTML/Excel/CSV renderers, dashboards) consume the JSON
//! form of [`QualityReport`], so field names and enum encodings are stable.
//! Schemas for the contract are exported by [`crate::schema`].

use crate::config::{PerformanceThresholds, ReliabilityThresholds};
use crate::types::{OutcomeKey, TestCaseId, TestStatus};
use chrono::NaiveDate;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

// ── Taxonomy ───────────────────────────────────────────────────────────────

/// Category a failure is classified into.
///
/// Classification is first-match-wins over an ordered rule table, so a
/// failure mentioning both assertions and WebDriver is an `Assertion`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum FailureCategory {
    /// Expected/actual mismatch in test assertions.
    Assertion,
    /// WebDriver and element-interaction failures.
    Selenium,
    /// Operations that ran out of time.
    Timeout,
    /// Connectivity, HTTP, and database failures.
    NetworkDatabase,
    /// Nothing in the failure text matched a known pattern.
    Unknown,
}

impl FailureCategory {
    pub fn all() -> &'static [FailureCategory] {
        &[
            Self::Assertion,
            Self::Selenium,
            Self::Timeout,
            Self::NetworkDatabase,
            Self::Unknown,
        ]
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Assertion => "assertion",
            Self::Selenium => "selenium",
            Self::Timeout => "timeout",
            Self::NetworkDatabase => "network_database",
            Self::Unknown => "unknown",
        }
    }

    /// Fixed remediation text attached to clusters of this category.
    pub fn recommended_action(&self) -> &'static str {
        match self {
            Self::Assertion => {
                "Review expected versus actual values; test data or business rules may have drifted"
            }
            Self::Selenium => {
                "Add explicit waits and re-verify element locators; the page structure may have changed"
            }
            Self::Timeout => {
                "Raise the relevant timeout or investigate the slow operation it guards"
            }
            Self::NetworkDatabase => {
                "Check connectivity, credentials, and query performance for the backing services"
            }
            Self::Unknown => {
                "Inspect the full failure output; the message matched no known pattern"
            }
        }
    }
}

impl std::fmt::Display for FailureCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Blast radius of a failure cluster.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum ImpactLevel {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for ImpactLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Severity of a regression or critical issue.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Priority of a flaky-test finding or a recommendation.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
    Low,
}

impl std::fmt::Display for Priority {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
            Self::Low => write!(f, "low"),
        }
    }
}

/// Overall run risk. Deliberately two buckets: failure rate above the high
/// line is High, anything else Medium. Finer strata belong to deployments
/// that have calibrated them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RiskLevel {
    High,
    Medium,
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::High => write!(f, "high"),
            Self::Medium => write!(f, "medium"),
        }
    }
}

/// Runtime band of a single test duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum DurationBand {
    Critical,
    Slow,
    Moderate,
    Fast,
}

impl DurationBand {
    pub fn from_duration_ms(ms: u64, thresholds: &PerformanceThresholds) -> Self {
        if ms >= thresholds.critical_ms {
            Self::Critical
        } else if ms >= thresholds.high_ms {
            Self::Slow
        } else if ms >= thresholds.medium_ms {
            Self::Moderate
        } else {
            Self::Fast
        }
    }
}

impl std::fmt::Display for DurationBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Critical => write!(f, "critical"),
            Self::Slow => write!(f, "slow"),
            Self::Moderate => write!(f, "moderate"),
            Self::Fast => write!(f, "fast"),
        }
    }
}

/// Reliability band of a suite, derived from its current pass rate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum ReliabilityBand {
    Unreliable,
    Poor,
    Good,
    Excellent,
}

impl ReliabilityBand {
    pub fn from_pass_rate(pct: f64, thresholds: &ReliabilityThresholds) -> Self {
        if pct < thresholds.unreliable_pct {
            Self::Unreliable
        } else if pct < thresholds.poor_pct {
            Self::Poor
        } else if pct < thresholds.good_pct {
            Self::Good
        } else {
            Self::Excellent
        }
    }
}

impl std::fmt::Display for ReliabilityBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unreliable => write!(f, "unreliable"),
            Self::Poor => write!(f, "poor"),
            Self::Good => write!(f, "good"),
            Self::Excellent => write!(f, "excellent"),
        }
    }
}

/// Which text a failure cluster was keyed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum PatternSource {
    /// Keyed on the normalized failure reason.
    Reason,
    /// Keyed on the normalized failing step (the outcome had no reason text).
    Step,
}

/// Kind of entry in the critical-issue list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum IssueKind {
    /// A configured critical suite reached the failure threshold.
    CriticalSuiteFailures,
    /// More than half of all suites contain at least one failure.
    WidespreadFailures,
}

/// Signal a recommendation was generated from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum RecommendationCategory {
    Stability,
    Flakiness,
    Regression,
    Performance,
    FailureClusters,
}

/// Rough cost of acting on a recommendation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Effort {
    Low,
    Medium,
    High,
}

// ── Run & suite summaries ──────────────────────────────────────────────────

/// Aggregate counts for the whole run after duplicate resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RunSummary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub broken: usize,
    /// Passed / total × 100; 0 for an empty run.
    pub pass_rate_pct: f64,
    /// (Failed + broken) / total × 100; 0 for an empty run.
    pub failure_rate_pct: f64,
    pub total_duration_ms: u64,
    pub suite_count: usize,
    /// Outcomes discarded because a later occurrence shared their identity.
    pub duplicate_outcomes_dropped: usize,
}

/// Aggregate counts for one suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SuiteSummary {
    pub suite: String,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub broken: usize,
    pub pass_rate_pct: f64,
    pub total_duration_ms: u64,
}

// ── Stability ──────────────────────────────────────────────────────────────

/// Stability scoring for one suite.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SuiteStability {
    pub suite: String,
    /// Current pass rate minus historical per-day variance, in [0, 100].
    pub score: f64,
    pub current_pass_rate_pct: f64,
    /// Population standard deviation of the per-day pass-rate series;
    /// 0 when the suite has no history.
    pub historical_std_dev_pct: f64,
    /// Days of history that contributed to the deviation.
    pub sampled_days: usize,
    pub unstable: bool,
    pub reliability: ReliabilityBand,
}

/// Stability scoring across the run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StabilityAnalysis {
    pub suites: Vec<SuiteStability>,
    /// Mean suite score; 100 for an empty run.
    pub overall_score: f64,
    pub unstable_suites: Vec<String>,
}

// ── Flakiness ──────────────────────────────────────────────────────────────

/// One test flagged as flaky.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FlakyTest {
    pub suite: String,
    pub test: String,
    /// Historical executions in the evaluated window.
    pub samples: usize,
    /// Adjacent status changes within the window.
    pub transitions: usize,
    /// Transitions / samples × 100.
    pub inconsistency_pct: f64,
    pub priority: Priority,
}

/// Flaky-test detection results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FlakyAnalysis {
    pub tests: Vec<FlakyTest>,
    /// Tests that had enough history to be evaluated at all.
    pub evaluated_tests: usize,
}

// ── Regressions ────────────────────────────────────────────────────────────

/// A test that passed in the baseline run and does not pass now.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct NewFailure {
    pub suite: String,
    pub test: String,
    pub previous_status: TestStatus,
    pub current_status: TestStatus,
    pub failure_reason: String,
    pub failing_step: String,
    pub severity: Severity,
}

/// A test that got measurably slower than its baseline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PerformanceRegression {
    pub suite: String,
    pub test: String,
    pub baseline_ms: u64,
    pub current_ms: u64,
    /// (current − baseline) / baseline × 100.
    pub change_pct: f64,
    pub severity: Severity,
}

/// Regression detection results against the baseline run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RegressionAnalysis {
    /// Execution date of the baseline run; `None` when history holds fewer
    /// than two distinct dates.
    pub baseline_date: Option<NaiveDate>,
    pub new_failures: Vec<NewFailure>,
    pub performance_regressions: Vec<PerformanceRegression>,
}

// ── Clusters & correlation ─────────────────────────────────────────────────

/// A group of failures sharing one normalized pattern key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FailurePattern {
    /// The normalized signature the members share.
    pub pattern: String,
    pub source: PatternSource,
    pub category: FailureCategory,
    pub count: usize,
    pub members: Vec<OutcomeKey>,
    pub affected_suites: Vec<String>,
    pub test_case_ids: Vec<TestCaseId>,
    pub impact: ImpactLevel,
    pub recommendation: String,
}

/// Failure rollup for one extracted test-case ID.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TestCaseCorrelation {
    pub id: TestCaseId,
    pub failures: usize,
    pub affected_suites: Vec<String>,
    /// Most frequent normalized failure reason (first seen wins ties).
    pub primary_reason: String,
    pub category: FailureCategory,
}

// ── Performance ────────────────────────────────────────────────────────────

/// One entry in the slowest-tests list.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct SlowTest {
    pub suite: String,
    pub test: String,
    pub duration_ms: u64,
    pub band: DurationBand,
}

/// Runtime banding across the run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct PerformanceOverview {
    pub slowest: Vec<SlowTest>,
    pub critical_count: usize,
    pub slow_count: usize,
    pub moderate_count: usize,
    pub fast_count: usize,
}

// ── Risk ───────────────────────────────────────────────────────────────────

/// A condition severe enough to call out above the regular findings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CriticalIssue {
    pub kind: IssueKind,
    /// The suite concerned, for per-suite issues.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suite: Option<String>,
    pub description: String,
    /// Non-passing outcomes for suite issues; failing suites for
    /// widespread-failure issues.
    pub count: usize,
}

/// One actionable recommendation derived from a signal.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Recommendation {
    pub category: RecommendationCategory,
    pub priority: Priority,
    pub summary: String,
    pub actions: Vec<String>,
    pub effort: Effort,
    pub expected_impact: String,
}

/// Aggregated risk for the run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RiskAssessment {
    pub level: RiskLevel,
    pub failure_rate_pct: f64,
    /// Composite health in [0, 100].
    pub health_score: f64,
    pub critical_issues: Vec<CriticalIssue>,
    pub recommendations: Vec<Recommendation>,
}

// ── Report envelope ────────────────────────────────────────────────────────

/// Headline numbers and findings for people who read nothing else.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ExecutiveSummary {
    pub health_score: f64,
    pub risk_level: RiskLevel,
    pub key_findings: Vec<String>,
}

/// The complete result tree for one analysis invocation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct QualityReport {
    /// Unique id for this report instance.
    pub report_id: String,
    /// RFC 3339 timestamp of report generation.
    pub generated_at: String,
    pub run: RunSummary,
    pub suites: Vec<SuiteSummary>,
    pub stability: StabilityAnalysis,
    pub flaky: FlakyAnalysis,
    pub regressions: RegressionAnalysis,
    pub clusters: Vec<FailurePattern>,
    pub correlations: Vec<TestCaseCorrelation>,
    pub performance: PerformanceOverview,
    pub risk: RiskAssessment,
    pub summary: ExecutiveSummary,
}

impl QualityReport {
    /// Pretty-printed JSON form of the report, as handed to renderers.
    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
