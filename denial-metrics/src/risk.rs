//! Risk tier classification.
//!
//! Thresholds are fixed configuration, shared between prediction risk tiers
//! and the denial-rate severity bands on payer/provider tables so the two
//! never disagree visually.

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::warn;

/// Probabilities below this are Low risk; at or above it, Medium.
pub const MEDIUM_RISK_THRESHOLD: f64 = 0.3;

/// Probabilities at or above this are High risk.
pub const HIGH_RISK_THRESHOLD: f64 = 0.7;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RiskLevel {
    Low,
    Medium,
    High,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "Low",
            RiskLevel::Medium => "Medium",
            RiskLevel::High => "High",
        }
    }
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Map a denial probability in [0,1] to a risk tier.
pub fn classify(probability: f64) -> RiskLevel {
    if probability >= HIGH_RISK_THRESHOLD {
        RiskLevel::High
    } else if probability >= MEDIUM_RISK_THRESHOLD {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Severity band for a denial rate, using the same thresholds as prediction
/// risk.
pub fn rate_band(denial_rate: f64) -> RiskLevel {
    classify(denial_rate)
}

/// Resolve the tier for a prediction response. A backend-supplied tier is
/// kept, never silently overridden; the classifier only fills the gap when
/// the field is absent.
pub fn resolve(probability: f64, backend_level: Option<RiskLevel>) -> RiskLevel {
    let computed = classify(probability);
    match backend_level {
        Some(level) => {
            if level != computed {
                warn!(
                    probability,
                    backend = %level,
                    computed = %computed,
                    "backend risk tier disagrees with local classification"
                );
            }
            level
        }
        None => computed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_representative_probabilities() {
        assert_eq!(classify(0.05), RiskLevel::Low);
        assert_eq!(classify(0.5), RiskLevel::Medium);
        assert_eq!(classify(0.95), RiskLevel::High);
    }

    #[test]
    fn boundaries_are_inclusive_on_the_upper_tier() {
        assert_eq!(classify(0.3), RiskLevel::Medium);
        assert_eq!(classify(0.299_999), RiskLevel::Low);
        assert_eq!(classify(0.300_001), RiskLevel::Medium);
        assert_eq!(classify(0.7), RiskLevel::High);
        assert_eq!(classify(0.699_999), RiskLevel::Medium);
        assert_eq!(classify(0.700_001), RiskLevel::High);
    }

    #[test]
    fn backend_tier_wins_when_present() {
        assert_eq!(resolve(0.95, Some(RiskLevel::Low)), RiskLevel::Low);
        assert_eq!(resolve(0.95, None), RiskLevel::High);
    }

    #[test]
    fn rate_bands_share_the_thresholds() {
        assert_eq!(rate_band(0.1), RiskLevel::Low);
        assert_eq!(rate_band(0.3), RiskLevel::Medium);
        assert_eq!(rate_band(0.85), RiskLevel::High);
    }
}
