//! Keyword classification of failure text.
//!
//! An ordered rule table is scanned top to bottom and the first category
//! with any matching keyword wins. The ordering is load-bearing: assertion
//! wording outranks WebDriver wording, which outranks timeout wording, so
//! "element text mismatch after timeout" is an assertion failure, and a
//! Selenium wait that timed out stays Selenium. Reordering the table
//! changes user-visible classifications.

use tqi_common::FailureCategory;

/// Rule table scanned in order; first category with a keyword hit wins.
const CLASSIFICATION_RULES: &[(FailureCategory, &[&str])] = &[
    (
        FailureCategory::Assertion,
        &["assert", "expected", "actual", "mismatch", "should be"],
    ),
    (
        FailureCategory::Selenium,
        &["webdriver", "selenium", "element", "locator", "stale element", "session"],
    ),
    (
        FailureCategory::Timeout,
        &["timeout", "timed out", "wait exceeded", "deadline"],
    ),
    (
        FailureCategory::NetworkDatabase,
        &["connection", "http", "sql", "database", "deadlock", "socket"],
    ),
];

/// Classify one failure from its reason and failing step.
///
/// Matching is case-insensitive substring containment over the
/// concatenated texts. Total: anything unmatched is `Unknown`.
pub fn classify_failure(reason: &str, step: &str) -> FailureCategory {
    let haystack = format!("{reason} {step}").to_lowercase();
    for (category, keywords) in CLASSIFICATION_RULES {
        if keywords.iter().any(|keyword| haystack.contains(keyword)) {
            return *category;
        }
    }
    FailureCategory::Unknown
}
