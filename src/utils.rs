//! Small helpers for string truncation and URL resolution.
//!
//! - Character-safe truncation for captions and for logging response bodies
//! - Resolution of relative links against a known base
//! - Archive slot arithmetic

use chrono::{Datelike, NaiveDate};
use url::Url;

use crate::error::AcquisitionError;

/// Keep at most `max` characters of `s`.
///
/// Counts Unicode scalar values, so multi-byte text is never split inside a
/// character. Applying it twice with the same bound is a no-op.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_chars("Привет", 3), "При");
/// assert_eq!(truncate_chars("short", 100), "short");
/// ```
pub fn truncate_chars(s: &str, max: usize) -> &str {
    match s.char_indices().nth(max) {
        Some((byte_idx, _)) => &s[..byte_idx],
        None => s,
    }
}

/// Truncate a string for logging purposes.
///
/// Long strings are truncated to `max` characters with an ellipsis and
/// a count of the dropped bytes appended.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(truncate_for_log("short", 100), "short");
/// assert_eq!(truncate_for_log(&"a".repeat(500), 10), "aaaaaaaaaa…(+490 bytes)");
/// ```
pub fn truncate_for_log(s: &str, max: usize) -> String {
    let kept = truncate_chars(s, max);
    if kept.len() == s.len() {
        s.to_string()
    } else {
        format!("{}…(+{} bytes)", kept, s.len() - kept.len())
    }
}

/// Resolve `href` against `base`, returning an absolute URL string.
///
/// Absolute hrefs come back unchanged (modulo normalisation by [`Url`]).
pub fn resolve_url(base: &str, href: &str) -> Result<String, AcquisitionError> {
    let invalid = |source| AcquisitionError::InvalidUrl {
        url: href.to_string(),
        source,
    };
    let base = Url::parse(base).map_err(|source| AcquisitionError::InvalidUrl {
        url: base.to_string(),
        source,
    })?;
    base.join(href.trim()).map(String::from).map_err(invalid)
}

/// Archive index for run `slot` on `date`.
///
/// Every (day, slot) pair maps to its own entry until the archive wraps
/// around, so consecutive runs never repeat within `len` runs.
pub fn archive_slot_index(date: NaiveDate, slots_per_day: u32, slot: u32, len: usize) -> usize {
    let slots = slots_per_day.max(1);
    let position = u64::from(date.ordinal0()) * u64::from(slots) + u64::from(slot % slots);
    (position % len.max(1) as u64) as usize
}
