//! Failure clustering over normalized reason and step patterns.
//!
//! Every failing outcome lands in at most one cluster. Outcomes with a
//! usable failure reason group by normalized reason; the remainder with a
//! usable failing step group by normalized step; outcomes with neither
//! stay unclustered. Groups of one are noise and are dropped.

use std::collections::BTreeMap;
use tqi_common::{FailurePattern, ImpactLevel, OutcomeKey, PatternSource, TestOutcome};

use crate::classify::classify_failure;
use crate::correlate::extract_case_ids;
use crate::normalize::{
    UNKNOWN_REASON, UNKNOWN_STEP, normalize_reason, normalize_step, reason_or_unknown,
    step_or_unknown,
};

/// Most reason clusters reported per run.
const MAX_REASON_CLUSTERS: usize = 10;
/// Most step clusters reported per run.
const MAX_STEP_CLUSTERS: usize = 5;

/// Build failure clusters from an already deduplicated batch.
///
/// Reason clusters come first, then step clusters, each block sorted by
/// member count descending with the pattern text breaking ties.
pub fn build_clusters(outcomes: &[TestOutcome]) -> Vec<FailurePattern> {
    let mut by_reason: BTreeMap<String, Vec<&TestOutcome>> = BTreeMap::new();
    let mut by_step: BTreeMap<String, Vec<&TestOutcome>> = BTreeMap::new();

    for outcome in outcomes.iter().filter(|o| !o.is_passing()) {
        // Blank text maps to its placeholder first, so it can never mint a
        // pattern key of its own.
        let reason = normalize_reason(reason_or_unknown(&outcome.failure_reason));
        if reason != UNKNOWN_REASON {
            by_reason.entry(reason).or_default().push(outcome);
            continue;
        }
        let step = normalize_step(step_or_unknown(&outcome.failing_step));
        if step != UNKNOWN_STEP {
            by_step.entry(step).or_default().push(outcome);
        }
    }

    let mut clusters = collect_block(by_reason, PatternSource::Reason, MAX_REASON_CLUSTERS);
    clusters.extend(collect_block(by_step, PatternSource::Step, MAX_STEP_CLUSTERS));
    clusters
}

fn collect_block(
    groups: BTreeMap<String, Vec<&TestOutcome>>,
    source: PatternSource,
    cap: usize,
) -> Vec<FailurePattern> {
    let mut block: Vec<FailurePattern> = groups
        .into_iter()
        .filter(|(_, members)| members.len() > 1)
        .map(|(pattern, members)| make_cluster(pattern, source, &members))
        .collect();
    // BTreeMap iteration is pattern-ascending, so the stable sort keeps
    // that order within equal counts.
    block.sort_by(|a, b| b.count.cmp(&a.count));
    block.truncate(cap);
    block
}

fn make_cluster(pattern: String, source: PatternSource, members: &[&TestOutcome]) -> FailurePattern {
    let category = match source {
        PatternSource::Reason => classify_failure(&pattern, ""),
        PatternSource::Step => classify_failure("", &pattern),
    };

    let mut affected_suites: Vec<String> =
        members.iter().map(|o| o.suite.clone()).collect();
    affected_suites.sort_unstable();
    affected_suites.dedup();

    let mut test_case_ids = Vec::new();
    for member in members {
        test_case_ids.extend(extract_case_ids(&member.tags));
    }
    test_case_ids.sort_unstable();
    test_case_ids.dedup();

    let member_keys: Vec<OutcomeKey> = members.iter().map(|o| o.key()).collect();
    let impact = impact_for(member_keys.len(), affected_suites.len());

    FailurePattern {
        pattern,
        source,
        category,
        count: member_keys.len(),
        members: member_keys,
        affected_suites,
        test_case_ids,
        impact,
        recommendation: category.recommended_action().to_string(),
    }
}

fn impact_for(member_count: usize, suite_count: usize) -> ImpactLevel {
    if member_count > 10 || suite_count > 3 {
        ImpactLevel::High
    } else if member_count > 5 || suite_count > 1 {
        ImpactLevel::Medium
    } else {
        ImpactLevel::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tqi_common::{FailureCategory, TestStatus};

    fn failing(suite: &str, test: &str, reason: &str, step: &str) -> TestOutcome {
        TestOutcome {
            suite: suite.to_string(),
            test: test.to_string(),
            parameter: String::new(),
            status: TestStatus::Failed,
            duration_raw: String::new(),
            duration_ms: 50,
            failing_step: step.to_string(),
            failure_reason: reason.to_string(),
            tags: String::new(),
            screenshot: None,
        }
    }

    #[test]
    fn shared_normalized_reason_forms_one_cluster() {
        let batch = vec![
            failing("checkout", "t1", "Expected 5 but was 7", ""),
            failing("checkout", "t2", "Expected 12 but was 99", ""),
            failing("search", "t3", "Expected 1 but was 0", ""),
        ];
        let clusters = build_clusters(&batch);
        assert_eq!(clusters.len(), 1);
        let cluster = &clusters[0];
        assert_eq!(cluster.pattern, "Expected [NUMBER] but was [NUMBER]");
        assert_eq!(cluster.source, PatternSource::Reason);
        assert_eq!(cluster.category, FailureCategory::Assertion);
        assert_eq!(cluster.count, 3);
        assert_eq!(cluster.affected_suites, vec!["checkout", "search"]);
        assert_eq!(cluster.impact, ImpactLevel::Medium);
    }

    #[test]
    fn reasonless_failures_fall_back_to_step_clusters() {
        let batch = vec![
            failing("ui", "t1", "", "Click login button"),
            failing("ui", "t2", "", "Click login button"),
            failing("ui", "t3", "element not found", "Click login button"),
        ];
        let clusters = build_clusters(&batch);
        // The lone "element not found" reason group is a singleton and is
        // dropped; the two reasonless outcomes cluster by step.
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].source, PatternSource::Step);
        assert_eq!(clusters[0].pattern, "Click login button");
        assert_eq!(clusters[0].count, 2);
    }

    #[test]
    fn an_outcome_with_a_reason_never_joins_a_step_cluster() {
        let batch = vec![
            failing("ui", "t1", "", "Open settings page"),
            failing("ui", "t2", "", "Open settings page"),
            failing("ui", "t3", "stale element", "Open settings page"),
            failing("ui", "t4", "stale element", "Open settings page"),
        ];
        let clusters = build_clusters(&batch);
        assert_eq!(clusters.len(), 2);
        assert_eq!(clusters[0].source, PatternSource::Reason);
        assert_eq!(clusters[0].count, 2);
        assert_eq!(clusters[1].source, PatternSource::Step);
        assert_eq!(clusters[1].count, 2);
    }

    #[test]
    fn outcomes_without_reason_or_step_stay_unclustered() {
        let batch = vec![failing("s", "t", "", ""), failing("s", "u", "   ", "  ")];
        assert!(build_clusters(&batch).is_empty());
    }

    #[test]
    fn whitespace_only_reasons_fall_back_to_the_step() {
        let batch = vec![
            failing("ui", "t1", "   ", "Open settings page"),
            failing("ui", "t2", "\t", "Open settings page"),
        ];
        let clusters = build_clusters(&batch);
        assert_eq!(clusters.len(), 1);
        assert_eq!(clusters[0].source, PatternSource::Step);
        assert_eq!(clusters[0].pattern, "Open settings page");
        assert_eq!(clusters[0].count, 2);
        assert!(clusters.iter().all(|c| !c.pattern.is_empty()));
    }

    #[test]
    fn singleton_groups_are_dropped() {
        let batch = vec![
            failing("s", "t1", "only one of these", ""),
            failing("s", "t2", "another lone reason", ""),
        ];
        assert!(build_clusters(&batch).is_empty());
    }

    #[test]
    fn passing_outcomes_never_cluster() {
        let mut passing = failing("s", "t", "Expected 1 but was 2", "");
        passing.status = TestStatus::Passed;
        assert!(build_clusters(&[passing]).is_empty());
    }

    #[test]
    fn clusters_sort_by_count_then_pattern() {
        let mut batch = Vec::new();
        for i in 0..3 {
            batch.push(failing("s", &format!("a{i}"), "connection refused", ""));
        }
        for i in 0..2 {
            batch.push(failing("s", &format!("b{i}"), "assert failed", ""));
        }
        for i in 0..2 {
            batch.push(failing("s", &format!("c{i}"), "timeout waiting", ""));
        }

        let clusters = build_clusters(&batch);
        assert_eq!(clusters.len(), 3);
        assert_eq!(clusters[0].pattern, "connection refused");
        assert_eq!(clusters[0].count, 3);
        // Equal counts fall back to pattern order.
        assert_eq!(clusters[1].pattern, "assert failed");
        assert_eq!(clusters[2].pattern, "timeout waiting");
    }

    #[test]
    fn reason_block_caps_at_ten() {
        // Distinguish reasons with letters; digits would be masked into a
        // shared [NUMBER] pattern.
        let mut batch = Vec::new();
        for letter in 'a'..='l' {
            for j in 0..2 {
                batch.push(failing(
                    "s",
                    &format!("t_{letter}_{j}"),
                    &format!("distinct reason {letter}"),
                    "",
                ));
            }
        }
        let clusters = build_clusters(&batch);
        assert_eq!(clusters.len(), MAX_REASON_CLUSTERS);
        assert!(clusters.iter().all(|c| c.count == 2));
    }

    #[test]
    fn wide_suite_spread_raises_impact() {
        let batch: Vec<TestOutcome> = (0..4)
            .map(|i| failing(&format!("suite{i}"), "t", "deadlock detected", ""))
            .collect();
        let clusters = build_clusters(&batch);
        assert_eq!(clusters[0].impact, ImpactLevel::High);
        assert_eq!(clusters[0].category, FailureCategory::NetworkDatabase);
    }

    #[test]
    fn member_keys_and_case_ids_are_recorded() {
        let mut one = failing("s", "t1", "boom happened", "");
        one.tags = "smoke C12345".to_string();
        let mut two = failing("s", "t2", "boom happened", "");
        two.tags = "C12345 regression".to_string();
        let clusters = build_clusters(&[one, two]);
        assert_eq!(clusters[0].members.len(), 2);
        assert_eq!(
            clusters[0].test_case_ids,
            vec![tqi_common::TestCaseId::new("C12345")]
        );
    }
}
