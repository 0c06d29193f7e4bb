//! Shared ranking and truncation rules.
//!
//! Every chart and its paired table go through these constants so they can
//! never disagree on rank or percentage due to independent rounding.

use std::cmp::Ordering;

/// Label budgets per entity kind. CPT codes are short and never truncated.
pub const PAYER_LABEL_LIMIT: usize = 15;
pub const PROVIDER_LABEL_LIMIT: usize = 12;
pub const REASON_LABEL_LIMIT: usize = 20;

/// Appended to labels that exceed their budget.
pub const ELLIPSIS: &str = "...";

/// Denial-rate percentages always carry exactly this many decimal digits.
pub const RATE_DECIMALS: usize = 1;

/// Fixed-precision percentage string for a fractional rate: `0.5` -> `"50.0"`.
///
/// Kept as a string to avoid re-parsing drift between a chart and its table.
pub fn format_rate_percent(rate: f64) -> String {
    format!("{:.*}", RATE_DECIMALS, rate * 100.0)
}

/// Percentage value after display rounding, used as the sort key so ordering
/// matches what is rendered. Derived from the formatted string itself:
/// `f64::round` rounds half away from zero while the formatter rounds ties
/// to even, and at exactly representable half-values the two disagree.
pub fn rounded_percent(rate: f64) -> f64 {
    format_rate_percent(rate).parse().unwrap_or(0.0)
}

/// Truncate `label` to `limit` characters, appending the ellipsis marker.
/// Labels at or under the budget are returned unchanged.
pub fn truncate_label(label: &str, limit: usize) -> String {
    if label.chars().count() > limit {
        let head: String = label.chars().take(limit).collect();
        format!("{head}{ELLIPSIS}")
    } else {
        label.to_string()
    }
}

/// Stable descending sort by a numeric key. Ties keep the input order, which
/// for backend maps is their insertion order.
pub fn sort_descending_by<T>(records: &mut [T], key: impl Fn(&T) -> f64) {
    records.sort_by(|a, b| key(b).partial_cmp(&key(a)).unwrap_or(Ordering::Equal));
}
