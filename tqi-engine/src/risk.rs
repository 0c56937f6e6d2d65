//! Risk aggregation: level, health score, critical issues, recommendations.
//!
//! Everything here is derived from the other stages' outputs; the
//! aggregator adds no new measurement, only policy.

use tqi_common::{
    AnalysisConfig, CriticalIssue, Effort, FailurePattern, FlakyAnalysis, IssueKind,
    PerformanceOverview, Priority, Recommendation, RecommendationCategory, RegressionAnalysis,
    RiskAssessment, RiskLevel, RunSummary, StabilityAnalysis, SuiteSummary,
};

/// Failure rate above this puts the whole run at high risk. A two-bucket
/// policy; deployments wanting more strata should band downstream.
const HIGH_RISK_FAILURE_RATE_PCT: f64 = 20.0;

/// Overall stability below this triggers the stability recommendation.
const LOW_STABILITY_SCORE: f64 = 70.0;

/// Stage outputs the aggregator draws from.
pub struct RiskInputs<'a> {
    pub run: &'a RunSummary,
    pub suites: &'a [SuiteSummary],
    pub stability: &'a StabilityAnalysis,
    pub flaky: &'a FlakyAnalysis,
    pub regressions: &'a RegressionAnalysis,
    pub clusters: &'a [FailurePattern],
    pub performance: &'a PerformanceOverview,
}

/// Compose the stage signals into one risk assessment.
pub fn assess_risk(inputs: &RiskInputs<'_>, config: &AnalysisConfig) -> RiskAssessment {
    let failure_rate_pct = inputs.run.failure_rate_pct;
    let level = if failure_rate_pct > HIGH_RISK_FAILURE_RATE_PCT {
        RiskLevel::High
    } else {
        RiskLevel::Medium
    };

    RiskAssessment {
        level,
        failure_rate_pct,
        health_score: health_score(
            failure_rate_pct,
            inputs.flaky.tests.len(),
            inputs.regressions.new_failures.len(),
            inputs.stability.overall_score,
        ),
        critical_issues: critical_issues(inputs.suites, config),
        recommendations: recommendations(inputs),
    }
}

/// 100 minus weighted penalties for failures, flakiness, regressions, and
/// instability, clamped to [0, 100].
fn health_score(
    failure_rate_pct: f64,
    flaky_count: usize,
    new_failure_count: usize,
    overall_stability: f64,
) -> f64 {
    let penalty = 2.0 * failure_rate_pct
        + 2.0 * flaky_count as f64
        + 3.0 * new_failure_count as f64
        + (100.0 - overall_stability) / 2.0;
    (100.0 - penalty).clamp(0.0, 100.0)
}

fn critical_issues(suites: &[SuiteSummary], config: &AnalysisConfig) -> Vec<CriticalIssue> {
    let mut issues = Vec::new();

    let threshold = config.critical_failure_threshold as usize;
    for suite_name in &config.critical_suites {
        let Some(summary) = suites.iter().find(|s| &s.suite == suite_name) else {
            continue;
        };
        let failing = summary.failed + summary.broken;
        if failing > 0 && failing >= threshold {
            issues.push(CriticalIssue {
                kind: IssueKind::CriticalSuiteFailures,
                suite: Some(suite_name.clone()),
                description: format!(
                    "{failing} non-passing outcomes in critical suite '{suite_name}'"
                ),
                count: failing,
            });
        }
    }

    let failing_suites = suites
        .iter()
        .filter(|s| s.failed + s.broken > 0)
        .count();
    if failing_suites * 2 > suites.len() && !suites.is_empty() {
        issues.push(CriticalIssue {
            kind: IssueKind::WidespreadFailures,
            suite: None,
            description: format!(
                "failures in {failing_suites} of {} suites",
                suites.len()
            ),
            count: failing_suites,
        });
    }

    issues
}

fn recommendations(inputs: &RiskInputs<'_>) -> Vec<Recommendation> {
    let mut recs = Vec::new();

    if inputs.stability.overall_score < LOW_STABILITY_SCORE
        || !inputs.stability.unstable_suites.is_empty()
    {
        recs.push(Recommendation {
            category: RecommendationCategory::Stability,
            priority: Priority::High,
            summary: "Stabilize suites with inconsistent results".to_string(),
            actions: vec![
                "Quarantine the worst offenders in the unstable suites".to_string(),
                "Review shared fixtures and environment setup for drift".to_string(),
                "Track per-suite pass rates until they hold steady".to_string(),
            ],
            effort: Effort::Medium,
            expected_impact: "Fewer false alarms and faster signal on real failures".to_string(),
        });
    }

    if !inputs.flaky.tests.is_empty() {
        recs.push(Recommendation {
            category: RecommendationCategory::Flakiness,
            priority: Priority::High,
            summary: "Eliminate flaky tests".to_string(),
            actions: vec![
                "Rerun the flagged tests in isolation to confirm the signal".to_string(),
                "Replace fixed sleeps with condition-based waits".to_string(),
                "Isolate state shared between test cases".to_string(),
            ],
            effort: Effort::Medium,
            expected_impact: "A pass/fail signal the team can trust".to_string(),
        });
    }

    if !inputs.regressions.new_failures.is_empty() {
        recs.push(Recommendation {
            category: RecommendationCategory::Regression,
            priority: Priority::High,
            summary: "Triage failures new since the last run".to_string(),
            actions: vec![
                "Bisect changes landed since the baseline run".to_string(),
                "Fix or revert the offending change".to_string(),
                "Add coverage around the regressed paths".to_string(),
            ],
            effort: Effort::High,
            expected_impact: "Restores the previous passing baseline".to_string(),
        });
    }

    if !inputs.regressions.performance_regressions.is_empty()
        || inputs.performance.critical_count > 0
    {
        recs.push(Recommendation {
            category: RecommendationCategory::Performance,
            priority: Priority::Medium,
            summary: "Investigate slow and degrading tests".to_string(),
            actions: vec![
                "Profile the slowest tests in the run".to_string(),
                "Compare durations against the baseline run".to_string(),
                "Split or parallelize long-running suites".to_string(),
            ],
            effort: Effort::Medium,
            expected_impact: "Shorter feedback cycles".to_string(),
        });
    }

    if !inputs.clusters.is_empty() {
        recs.push(Recommendation {
            category: RecommendationCategory::FailureClusters,
            priority: Priority::Medium,
            summary: "Fix shared root causes behind failure clusters".to_string(),
            actions: vec![
                "Start with the largest cluster's recommended action".to_string(),
                "Verify one representative test per cluster after the fix".to_string(),
            ],
            effort: Effort::Low,
            expected_impact: "One fix clears many failures at once".to_string(),
        });
    }

    recs
}
