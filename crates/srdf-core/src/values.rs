//! Whitespace-separated number lists, e.g. joint values `"0.0 1.57 -0.3"`

use crate::diagnostics::{Diagnostics, Issue};

/// Parse every whitespace-separated token as `f64`, in textual order.
///
/// Tokens that are not finite numbers (including `nan` and `inf`) are skipped
/// and reported against `context`; the rest of the list is still parsed. An empty result is left for the
/// caller to judge.
pub fn parse_values(text: &str, context: &str, diagnostics: &mut Diagnostics) -> Vec<f64> {
    text.split_whitespace()
        .filter_map(|token| match token.parse::<f64>() {
            Ok(value) if value.is_finite() => Some(value),
            _ => {
                diagnostics.report(Issue::InvalidNumber {
                    token: token.to_string(),
                    context: context.to_string(),
                });
                None
            }
        })
        .collect()
}

/// Parse a single finite scalar attribute, tolerating surrounding whitespace
pub fn parse_scalar(text: &str) -> Option<f64> {
    text.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}
