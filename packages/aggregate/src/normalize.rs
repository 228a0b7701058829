//! ZIP code cleaning.
//!
//! The crash export stores ZIP codes inconsistently: blank cells, padded
//! strings, and floats such as `10001.0` from spreadsheet round-trips.
//! [`normalize_zip`] turns a raw cell into a grouping key according to a
//! [`ZipNormalization`] policy.

use collision_map_collision_models::ZipNormalization;

/// Textual spellings of a missing value, compared case-insensitively.
const MISSING_TOKENS: &[&str] = &["nan", "null", "none"];

/// Returns `true` if `value` is empty or spells out a missing value.
#[must_use]
pub fn is_missing_token(value: &str) -> bool {
    value.is_empty() || MISSING_TOKENS.iter().any(|t| value.eq_ignore_ascii_case(t))
}

/// Normalizes a raw ZIP code cell.
///
/// Returns `None` when the cleaned value is missing, in which case the
/// record is excluded from aggregation. Normalizing an already-normalized
/// value returns it unchanged.
#[must_use]
pub fn normalize_zip(raw: &str, policy: ZipNormalization) -> Option<String> {
    let cleaned = match policy {
        ZipNormalization::Full => strip_decimal_suffix(&strip_whitespace(raw)).to_string(),
        ZipNormalization::DecimalSuffix => strip_decimal_suffix(raw.trim()).trim().to_string(),
        ZipNormalization::Whitespace => strip_whitespace(raw),
    };

    if is_missing_token(&cleaned) {
        None
    } else {
        Some(cleaned)
    }
}

fn strip_whitespace(value: &str) -> String {
    value.chars().filter(|c| !c.is_whitespace()).collect()
}

fn strip_decimal_suffix(value: &str) -> &str {
    value.split_once('.').map_or(value, |(head, _)| head)
}
