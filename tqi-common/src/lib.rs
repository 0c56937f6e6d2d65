//! Shared contract for the Test Quality Intelligence workspace.
//!
//! The engine crate computes analyses; this crate owns what flows across
//! its boundary: the input data model ([`types`]), the configuration
//! surface ([`config`]), the result tree ([`report`]), and JSON Schema
//! export for external collaborators ([`schema`]). The [`testing`] module
//! carries structured test-logging support used by the workspace's suites.

pub mod config;
pub mod report;
pub mod schema;
pub mod testing;
pub mod types;

pub use config::{
    AnalysisConfig, ConfigWarning, PerformanceThresholds, ReliabilityThresholds, WarningSeverity,
};
pub use report::{
    CriticalIssue, DurationBand, Effort, ExecutiveSummary, FailureCategory, FailurePattern,
    FlakyAnalysis, FlakyTest, ImpactLevel, IssueKind, NewFailure, PatternSource,
    PerformanceOverview, PerformanceRegression, Priority, QualityReport, Recommendation,
    RecommendationCategory, RegressionAnalysis, ReliabilityBand, RiskAssessment, RiskLevel,
    RunSummary, Severity, SlowTest, StabilityAnalysis, SuiteStability, SuiteSummary,
    TestCaseCorrelation,
};
pub use types::{HistoricalRun, OutcomeKey, TestCaseId, TestOutcome, TestStatus};
