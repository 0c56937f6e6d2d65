//! Parser for vendor-reported duration strings.
//!
//! Test runners report durations in whichever shape their formatter picked:
//! `"1 m 5 s"`, `"2.5 s"`, `"500ms"`, `"2:30"`, or a bare millisecond
//! count. [`parse_duration_ms`] accepts them all, is total over arbitrary
//! input, and resolves anything unrecognizable to 0 with a diagnostic
//! rather than failing the batch.
//!
//! Recognized forms, tried in order:
//!
//! 1. minutes + seconds (`"1 m 5 s"`, `"1m5s"`)
//! 2. minutes only (`"2 m"`, `"3m"`)
//! 3. seconds, with optional fraction (`"30 s"`, `"2.5 s"`, `"45s"`)
//! 4. milliseconds (`"500ms"`, `"500 ms"`)
//! 5. colon-separated clock (`"HH:MM:SS"` or `"MM:SS"`)
//! 6. bare integer, already milliseconds (`"750"`)

use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::warn;

static MINUTES_SECONDS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\d+)\s*m\s*(\d+)(?:\.(\d+))?\s*s$").expect("valid literal regex")
});
static MINUTES_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*m$").expect("valid literal regex"));
static SECONDS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)(?:\.(\d+))?\s*s$").expect("valid literal regex"));
static MILLIS_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(\d+)\s*ms$").expect("valid literal regex"));

/// Why a duration string could not be parsed. Internal detail of the total
/// [`parse_duration_ms`] wrapper; exposed for callers that want the cause.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DurationParseError {
    #[error("empty duration string")]
    Empty,
    #[error("unrecognized duration format: `{0}`")]
    Unrecognized(String),
    #[error("duration out of range: `{0}`")]
    OutOfRange(String),
}

/// Parse a vendor duration string into milliseconds.
///
/// Total over all inputs: empty input is 0, and unrecognizable input is 0
/// with a `warn!` diagnostic. Never panics, never errors.
pub fn parse_duration_ms(raw: &str) -> u64 {
    match try_parse_duration_ms(raw) {
        Ok(ms) => ms,
        Err(DurationParseError::Empty) => 0,
        Err(err) => {
            warn!(raw, %err, "unparsable duration, defaulting to 0 ms");
            0
        }
    }
}

/// Fallible form of [`parse_duration_ms`].
pub fn try_parse_duration_ms(raw: &str) -> Result<u64, DurationParseError> {
    let text = raw.trim();
    if text.is_empty() {
        return Err(DurationParseError::Empty);
    }

    if let Some(caps) = MINUTES_SECONDS_RE.captures(text) {
        let minutes = parse_component(&caps[1], raw)?;
        let seconds = parse_component(&caps[2], raw)?;
        let frac_ms = caps.get(3).map_or(0, |m| frac_to_ms(m.as_str()));
        return combine(&[(minutes, 60_000), (seconds, 1_000), (frac_ms, 1)], raw);
    }
    if let Some(caps) = MINUTES_RE.captures(text) {
        let minutes = parse_component(&caps[1], raw)?;
        return combine(&[(minutes, 60_000)], raw);
    }
    if let Some(caps) = SECONDS_RE.captures(text) {
        let seconds = parse_component(&caps[1], raw)?;
        let frac_ms = caps.get(2).map_or(0, |m| frac_to_ms(m.as_str()));
        return combine(&[(seconds, 1_000), (frac_ms, 1)], raw);
    }
    if let Some(caps) = MILLIS_RE.captures(text) {
        return parse_component(&caps[1], raw);
    }
    if text.contains(':') {
        return parse_clock(text, raw);
    }
    if text.chars().all(|c| c.is_ascii_digit()) {
        return parse_component(text, raw);
    }

    Err(DurationParseError::Unrecognized(raw.to_string()))
}

/// `"MM:SS"` or `"HH:MM:SS"` with integer components.
fn parse_clock(text: &str, raw: &str) -> Result<u64, DurationParseError> {
    let parts: Vec<&str> = text.split(':').map(str::trim).collect();
    if !parts
        .iter()
        .all(|p| !p.is_empty() && p.chars().all(|c| c.is_ascii_digit()))
    {
        return Err(DurationParseError::Unrecognized(raw.to_string()));
    }

    match parts.as_slice() {
        [minutes, seconds] => {
            let m = parse_component(minutes, raw)?;
            let s = parse_component(seconds, raw)?;
            combine(&[(m, 60_000), (s, 1_000)], raw)
        }
        [hours, minutes, seconds] => {
            let h = parse_component(hours, raw)?;
            let m = parse_component(minutes, raw)?;
            let s = parse_component(seconds, raw)?;
            combine(&[(h, 3_600_000), (m, 60_000), (s, 1_000)], raw)
        }
        _ => Err(DurationParseError::Unrecognized(raw.to_string())),
    }
}

fn parse_component(digits: &str, raw: &str) -> Result<u64, DurationParseError> {
    digits
        .parse::<u64>()
        .map_err(|_| DurationParseError::OutOfRange(raw.to_string()))
}

/// Fractional-second digits to milliseconds: `"5"` is 500, `"25"` is 250,
/// digits beyond millisecond precision are dropped.
fn frac_to_ms(frac: &str) -> u64 {
    let mut ms = 0u64;
    let mut scale = 100u64;
    for c in frac.chars().take(3) {
        ms += u64::from(c.to_digit(10).unwrap_or(0)) * scale;
        scale /= 10;
    }
    ms
}

/// Sum `value * unit_ms` terms with overflow checking.
fn combine(terms: &[(u64, u64)], raw: &str) -> Result<u64, DurationParseError> {
    let mut total = 0u64;
    for (value, unit_ms) in terms {
        let term = value
            .checked_mul(*unit_ms)
            .ok_or_else(|| DurationParseError::OutOfRange(raw.to_string()))?;
        total = total
            .checked_add(term)
            .ok_or_else(|| DurationParseError::OutOfRange(raw.to_string()))?;
    }
    Ok(total)
}
