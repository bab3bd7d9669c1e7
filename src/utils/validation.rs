//! Centralized validation and helper functions.

use tracing::debug;

use crate::core::config::{DEFAULT_AMBIGUOUS, MAX_AMBIGUOUS};

/// Number of hex digits in a temporary file suffix (48 random bits)
pub const SUFFIX_HEX_DIGITS: usize = 12;

/// Check that an ambiguous-base fraction lies in (0, 0.9].
///
/// # Examples
///
/// ```
/// use incr_aligner::utils::validation::is_valid_ambiguity;
///
/// assert!(is_valid_ambiguity(0.1));
/// assert!(is_valid_ambiguity(0.9));
/// assert!(!is_valid_ambiguity(0.0));
/// assert!(!is_valid_ambiguity(0.95));
/// assert!(!is_valid_ambiguity(f64::NAN));
/// ```
#[must_use]
pub fn is_valid_ambiguity(value: f64) -> bool {
    value > 0.0 && value <= MAX_AMBIGUOUS
}

/// Return `value` if valid, otherwise the default fraction.
#[must_use]
pub fn sanitize_ambiguity(value: f64) -> f64 {
    if is_valid_ambiguity(value) {
        value
    } else {
        debug!(
            "Ambiguous fraction {value} outside (0, {MAX_AMBIGUOUS}], using {DEFAULT_AMBIGUOUS}"
        );
        DEFAULT_AMBIGUOUS
    }
}

/// Validate that a string is a temporary file suffix (12 lowercase hex characters).
#[must_use]
pub fn is_valid_suffix(s: &str) -> bool {
    s.len() == SUFFIX_HEX_DIGITS
        && s.chars()
            .all(|c| c.is_ascii_digit() || ('a'..='f').contains(&c))
}
