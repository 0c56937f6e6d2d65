//! Analysis engine turning one run's test outcomes into quality
//! intelligence: failure clusters, flaky tests, regressions against the
//! previous run, per-suite stability, performance banding, and an overall
//! risk assessment.
//!
//! The whole engine is a pure batch computation. [`analyze`] takes the
//! current outcomes, optional history, and a configuration value, and
//! returns a [`QualityReport`]; nothing is cached or mutated across
//! invocations, so concurrent calls need no coordination. Callers wanting
//! timeouts or cancellation wrap the call instead of threading them
//! through.
//!
//! Stage order inside one invocation: duplicate resolution, run and suite
//! rollups, failure clustering, test-case correlation, stability scoring,
//! flaky detection, regression detection, performance banding, then risk
//! aggregation over all of the above.

pub mod classify;
pub mod cluster;
pub mod correlate;
pub mod duration;
pub mod flaky;
pub mod normalize;
pub mod performance;
pub mod prepare;
pub mod regression;
pub mod risk;
pub mod stability;

use tracing::{debug, info};

pub use tqi_common::{AnalysisConfig, HistoricalRun, QualityReport, TestOutcome};

pub use classify::classify_failure;
pub use cluster::build_clusters;
pub use correlate::{correlate_case_ids, extract_case_ids};
pub use duration::{parse_duration_ms, try_parse_duration_ms};
pub use flaky::detect_flaky_tests;
pub use normalize::{normalize_reason, normalize_step};
pub use performance::summarize_performance;
pub use prepare::dedupe_latest;
pub use regression::detect_regressions;
pub use risk::{RiskInputs, assess_risk};
pub use stability::score_stability;

use chrono::Utc;
use tqi_common::{
    ExecutiveSummary, FailurePattern, FlakyAnalysis, RegressionAnalysis, RiskAssessment,
    RunSummary, StabilityAnalysis,
};
use uuid::Uuid;

/// Run the full analysis pipeline over one batch of outcomes.
///
/// `history` is read-only context; `None` and an empty slice behave the
/// same, degrading the history-driven stages to empty results.
pub fn analyze(
    outcomes: &[TestOutcome],
    history: Option<&[HistoricalRun]>,
    config: &AnalysisConfig,
) -> QualityReport {
    let history = history.unwrap_or(&[]);

    let (outcomes, duplicates_dropped) = prepare::dedupe_latest(outcomes);
    debug!(
        outcomes = outcomes.len(),
        duplicates_dropped,
        history = history.len(),
        "resolved outcome batch"
    );

    let run = prepare::run_summary(&outcomes, duplicates_dropped);
    let suites = prepare::suite_summaries(&outcomes);
    let clusters = cluster::build_clusters(&outcomes);
    let correlations = correlate::correlate_case_ids(&outcomes);
    let stability = stability::score_stability(&outcomes, history, config);
    let flaky = flaky::detect_flaky_tests(&outcomes, history, config);
    let regressions = regression::detect_regressions(&outcomes, history, config);
    let performance = performance::summarize_performance(&outcomes, config);

    let risk = risk::assess_risk(
        &risk::RiskInputs {
            run: &run,
            suites: &suites,
            stability: &stability,
            flaky: &flaky,
            regressions: &regressions,
            clusters: &clusters,
            performance: &performance,
        },
        config,
    );
    let summary = executive_summary(&run, &stability, &flaky, &regressions, &clusters, &risk);

    info!(
        total = run.total,
        pass_rate_pct = run.pass_rate_pct,
        clusters = clusters.len(),
        flaky = flaky.tests.len(),
        new_failures = regressions.new_failures.len(),
        health_score = risk.health_score,
        "analysis complete"
    );

    QualityReport {
        report_id: Uuid::new_v4().to_string(),
        generated_at: Utc::now().to_rfc3339(),
        run,
        suites,
        stability,
        flaky,
        regressions,
        clusters,
        correlations,
        performance,
        risk,
        summary,
    }
}

/// Headline findings for readers who stop at the first screen.
fn executive_summary(
    run: &RunSummary,
    stability: &StabilityAnalysis,
    flaky: &FlakyAnalysis,
    regressions: &RegressionAnalysis,
    clusters: &[FailurePattern],
    risk: &RiskAssessment,
) -> ExecutiveSummary {
    let mut key_findings = Vec::new();

    if run.total == 0 {
        key_findings.push("No test outcomes in this run".to_string());
    } else {
        key_findings.push(format!(
            "{} of {} tests passed ({:.1}%)",
            run.passed, run.total, run.pass_rate_pct
        ));
    }

    if !clusters.is_empty() {
        let largest = clusters.iter().map(|c| c.count).max().unwrap_or(0);
        key_findings.push(format!(
            "{} failure clusters, the largest affecting {} tests",
            clusters.len(),
            largest
        ));
    }
    if !flaky.tests.is_empty() {
        key_findings.push(format!("{} flaky tests detected", flaky.tests.len()));
    }
    if !regressions.new_failures.is_empty() {
        key_findings.push(format!(
            "{} tests newly failing versus the previous run",
            regressions.new_failures.len()
        ));
    }
    if !stability.unstable_suites.is_empty() {
        key_findings.push(format!(
            "Unstable suites: {}",
            stability.unstable_suites.join(", ")
        ));
    }
    if !risk.critical_issues.is_empty() {
        key_findings.push(format!(
            "{} critical issues need attention",
            risk.critical_issues.len()
        ));
    }

    ExecutiveSummary {
        health_score: risk.health_score,
        risk_level: risk.level,
        key_findings,
    }
}
