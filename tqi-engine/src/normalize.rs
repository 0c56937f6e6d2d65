//! Normalization of failure text into stable pattern keys.
//!
//! Two failures that differ only in concrete values ("Expected 5 but was
//! 7" vs "Expected 9 but was 2") must produce the same key, so runs of
//! digits become `[NUMBER]` and quoted substrings become `[VALUE]` before
//! whitespace is collapsed and the result is truncated. Normalization is
//! idempotent: reapplying it to its own output changes nothing, which
//! keeps keys stable when they are re-ingested from a serialized report.

use regex::Regex;
use std::sync::LazyLock;

/// Character limit for normalized failure reasons.
pub const REASON_PATTERN_LIMIT: usize = 150;
/// Character limit for normalized failing steps.
pub const STEP_PATTERN_LIMIT: usize = 100;

/// Placeholder for a missing failure reason.
pub const UNKNOWN_REASON: &str = "Unknown";
/// Placeholder for a missing failing step.
pub const UNKNOWN_STEP: &str = "Unknown Step";

const ELLIPSIS: &str = "...";

static DIGIT_RUNS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid literal regex"));
static SINGLE_QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"'[^']*'").expect("valid literal regex"));
static DOUBLE_QUOTED_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r#""[^"]*""#).expect("valid literal regex"));
static WHITESPACE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\s+").expect("valid literal regex"));

/// Normalize a failure reason into its clustering key.
pub fn normalize_reason(reason: &str) -> String {
    normalize_pattern(reason, REASON_PATTERN_LIMIT)
}

/// Normalize a failing step into its clustering key.
pub fn normalize_step(step: &str) -> String {
    normalize_pattern(step, STEP_PATTERN_LIMIT)
}

/// The raw reason, or its placeholder when blank.
pub fn reason_or_unknown(raw: &str) -> &str {
    if raw.trim().is_empty() { UNKNOWN_REASON } else { raw }
}

/// The raw step, or its placeholder when blank.
pub fn step_or_unknown(raw: &str) -> &str {
    if raw.trim().is_empty() { UNKNOWN_STEP } else { raw }
}

/// Shared normalization pipeline: digits, quoted values, whitespace, then
/// truncation to `limit` characters with the ellipsis budgeted inside the
/// limit (so truncated output is a fixed point of the pipeline).
pub fn normalize_pattern(text: &str, limit: usize) -> String {
    let masked = DIGIT_RUNS_RE.replace_all(text, "[NUMBER]");
    let masked = SINGLE_QUOTED_RE.replace_all(&masked, "[VALUE]");
    let masked = DOUBLE_QUOTED_RE.replace_all(&masked, "[VALUE]");
    let collapsed = WHITESPACE_RE.replace_all(&masked, " ");
    truncate_at_char_boundary(collapsed.trim(), limit)
}

fn truncate_at_char_boundary(text: &str, limit: usize) -> String {
    if text.chars().count() <= limit {
        return text.to_string();
    }
    let keep = limit.saturating_sub(ELLIPSIS.chars().count());
    let cut = text
        .char_indices()
        .nth(keep)
        .map_or(text.len(), |(idx, _)| idx);
    let mut truncated = text[..cut].trim_end().to_string();
    truncated.push_str(ELLIPSIS);
    truncated
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn masks_digit_runs() {
        assert_eq!(
            normalize_reason("Expected 5 but was 7"),
            "Expected [NUMBER] but was [NUMBER]"
        );
        assert_eq!(normalize_reason("code 404 at line 12"), "code [NUMBER] at line [NUMBER]");
    }

    #[test]
    fn value_variants_share_one_key() {
        assert_eq!(
            normalize_reason("Expected 5 but was 7"),
            normalize_reason("Expected 9 but was 2")
        );
        assert_eq!(
            normalize_reason("User 'alice' missing"),
            normalize_reason("User 'bob' missing")
        );
    }

    #[test]
    fn masks_quoted_substrings() {
        assert_eq!(normalize_reason("field 'name' was empty"), "field [VALUE] was empty");
        assert_eq!(
            normalize_reason(r#"expected "apple" got "pear""#),
            "expected [VALUE] got [VALUE]"
        );
    }

    #[test]
    fn quoted_numbers_collapse_to_value() {
        // digits are masked first, then the quoted span
        assert_eq!(normalize_reason("id '42' not found"), "id [VALUE] not found");
    }

    #[test]
    fn unpaired_quotes_are_left_alone() {
        assert_eq!(normalize_reason("it's broken"), "it's broken");
    }

    #[test]
    fn collapses_whitespace_and_trims() {
        assert_eq!(normalize_reason("  a \t b\n\nc  "), "a b c");
        assert_eq!(normalize_reason(""), "");
        assert_eq!(normalize_reason(" \n\t "), "");
    }

    #[test]
    fn truncates_inside_the_limit_with_ellipsis() {
        let long = "x".repeat(400);
        let reason = normalize_reason(&long);
        assert_eq!(reason.chars().count(), REASON_PATTERN_LIMIT);
        assert!(reason.ends_with("..."));

        let step = normalize_step(&long);
        assert_eq!(step.chars().count(), STEP_PATTERN_LIMIT);
        assert!(step.ends_with("..."));
    }

    #[test]
    fn truncation_respects_multibyte_boundaries() {
        let long = "é".repeat(300);
        let reason = normalize_reason(&long);
        assert_eq!(reason.chars().count(), REASON_PATTERN_LIMIT);
        assert!(reason.ends_with("..."));
    }

    #[test]
    fn exact_limit_input_is_untouched() {
        let text = "y".repeat(REASON_PATTERN_LIMIT);
        assert_eq!(normalize_reason(&text), text);
    }

    #[test]
    fn idempotent_on_representative_inputs() {
        let inputs = [
            "Expected 5 but was 7",
            "User 'alice' logged 42 times into \"prod\"",
            &"long words ".repeat(40),
            "  spacing\t\tand\nnewlines  ",
            "",
        ];
        for input in inputs {
            let once = normalize_reason(input);
            assert_eq!(normalize_reason(&once), once, "input: {input:?}");
            let once = normalize_step(input);
            assert_eq!(normalize_step(&once), once, "input: {input:?}");
        }
    }

    #[test]
    fn placeholders_cover_blank_text() {
        assert_eq!(reason_or_unknown(""), "Unknown");
        assert_eq!(reason_or_unknown("  "), "Unknown");
        assert_eq!(reason_or_unknown("boom"), "boom");
        assert_eq!(step_or_unknown("\t"), "Unknown Step");
        assert_eq!(step_or_unknown("Click login"), "Click login");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            #[test]
            fn idempotent_for_arbitrary_reasons(text in ".{0,400}") {
                let once = normalize_reason(&text);
                prop_assert_eq!(normalize_reason(&once), once);
            }

            #[test]
            fn idempotent_for_arbitrary_steps(text in ".{0,400}") {
                let once = normalize_step(&text);
                prop_assert_eq!(normalize_step(&once), once);
            }

            #[test]
            fn output_never_exceeds_the_limit(text in ".{0,400}") {
                prop_assert!(normalize_reason(&text).chars().count() <= REASON_PATTERN_LIMIT);
                prop_assert!(normalize_step(&text).chars().count() <= STEP_PATTERN_LIMIT);
            }

            #[test]
            fn output_contains_no_digits(text in ".{0,200}") {
                prop_assert!(!normalize_reason(&text).contains(|c: char| c.is_ascii_digit()));
            }
        }
    }
}
