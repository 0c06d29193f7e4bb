//! Record normalization: backend analysis maps into ordered, truncated,
//! percentage-formatted display records.
//!
//! Pure derivations with no side effects; records are rebuilt from the raw
//! analysis on every change and hold no identity of their own.

use indexmap::IndexMap;
use serde::Serialize;

use crate::models::EntityStats;
use crate::policy;

/// Kind of analysis entity a map is keyed by. Determines the label budget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Cpt,
    Payer,
    Provider,
    Reason,
}

impl EntityKind {
    pub fn label_limit(self) -> Option<usize> {
        match self {
            EntityKind::Cpt => None,
            EntityKind::Payer => Some(policy::PAYER_LABEL_LIMIT),
            EntityKind::Provider => Some(policy::PROVIDER_LABEL_LIMIT),
            EntityKind::Reason => Some(policy::REASON_LABEL_LIMIT),
        }
    }
}

/// Rate-based display record for CPT/payer/provider charts and tables.
#[derive(Debug, Clone, Serialize)]
pub struct RateRecord {
    /// Truncated presentational label.
    pub label: String,
    /// Original untruncated key, for tooltips and detail views.
    pub full_label: String,
    /// Raw fraction, passed through for conditional styling.
    pub denial_rate: f64,
    /// Fixed-precision percentage string, e.g. "50.0".
    pub denial_rate_percent: String,
    pub denials: u64,
    pub total_claims: u64,
    /// Lost revenue or outstanding balance, whichever the backend populated.
    pub amount: Option<f64>,
}

/// Count-based display record for reason / volume / pattern distributions.
#[derive(Debug, Clone, Serialize)]
pub struct CountRecord {
    pub label: String,
    pub full_label: String,
    pub count: u64,
}

fn display_label(full: &str, kind: EntityKind) -> String {
    match kind.label_limit() {
        Some(limit) => policy::truncate_label(full, limit),
        None => full.to_string(),
    }
}

/// Derive rate records from an entity map.
///
/// Entries with zero (or absent) `total_claims` are excluded: a zero-claim
/// denominator makes the denial rate meaningless, not zero. Output is sorted
/// descending by the displayed percentage; ties keep map insertion order.
pub fn rate_records(map: &IndexMap<String, EntityStats>, kind: EntityKind) -> Vec<RateRecord> {
    let mut records: Vec<RateRecord> = map
        .iter()
        .filter(|(_, stats)| stats.total_claims > 0)
        .map(|(name, stats)| RateRecord {
            label: display_label(name, kind),
            full_label: name.clone(),
            denial_rate: stats.denial_rate,
            denial_rate_percent: policy::format_rate_percent(stats.denial_rate),
            denials: stats.denials,
            total_claims: stats.total_claims,
            amount: stats.denied_amount(),
        })
        .collect();

    policy::sort_descending_by(&mut records, |record| {
        policy::rounded_percent(record.denial_rate)
    });
    records
}

/// Derive count records from an occurrence map, sorted descending by count.
/// No claims-present filter applies here.
pub fn count_records(map: &IndexMap<String, u64>, kind: EntityKind) -> Vec<CountRecord> {
    let mut records: Vec<CountRecord> = map
        .iter()
        .map(|(name, count)| CountRecord {
            label: display_label(name, kind),
            full_label: name.clone(),
            count: *count,
        })
        .collect();

    policy::sort_descending_by(&mut records, |record| record.count as f64);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::policy::ELLIPSIS;

    fn stats(rate: f64, denials: u64, claims: u64, lost: Option<f64>) -> EntityStats {
        EntityStats {
            denial_rate: rate,
            denials,
            total_claims: claims,
            lost_revenue: lost,
            total_balance: None,
            total_payments: None,
        }
    }

    #[test]
    fn zero_claim_entities_are_excluded() {
        let mut map = IndexMap::new();
        map.insert("Cigna".to_string(), stats(0.5, 50, 100, Some(1000.0)));
        map.insert("Aetna".to_string(), stats(0.0, 0, 0, Some(0.0)));

        let records = rate_records(&map, EntityKind::Payer);
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].full_label, "Cigna");
        assert_eq!(records[0].denial_rate_percent, "50.0");
    }

    #[test]
    fn records_sort_descending_with_stable_ties() {
        let mut map = IndexMap::new();
        map.insert("first".to_string(), stats(0.4, 4, 10, None));
        map.insert("second".to_string(), stats(0.8, 8, 10, None));
        map.insert("third".to_string(), stats(0.4, 2, 5, None));

        let records = rate_records(&map, EntityKind::Provider);
        let order: Vec<&str> = records.iter().map(|r| r.full_label.as_str()).collect();
        assert_eq!(order, vec!["second", "first", "third"]);
    }

    #[test]
    fn ordering_follows_the_displayed_percentage() {
        // Both round to "49.5"; insertion order must hold even though the raw
        // rates differ.
        let mut map = IndexMap::new();
        map.insert("a".to_string(), stats(0.4949, 5, 10, None));
        map.insert("b".to_string(), stats(0.4951, 5, 10, None));

        let records = rate_records(&map, EntityKind::Cpt);
        assert_eq!(records[0].denial_rate_percent, "49.5");
        assert_eq!(records[1].denial_rate_percent, "49.5");
        let order: Vec<&str> = records.iter().map(|r| r.full_label.as_str()).collect();
        assert_eq!(order, vec!["a", "b"]);
    }

    #[test]
    fn ordering_never_disagrees_with_the_printed_percent() {
        // 0.0625 formats as "6.2" (ties to even); it must rank below 0.063
        // ("6.3") even though a half-away-from-zero rounding would tie them.
        let mut map = IndexMap::new();
        map.insert("a".to_string(), stats(0.0625, 1, 16, None));
        map.insert("b".to_string(), stats(0.063, 2, 32, None));

        let records = rate_records(&map, EntityKind::Payer);
        let printed: Vec<&str> = records
            .iter()
            .map(|r| r.denial_rate_percent.as_str())
            .collect();
        assert_eq!(printed, vec!["6.3", "6.2"]);
        assert_eq!(records[0].full_label, "b");
    }

    #[test]
    fn payer_labels_truncate_at_fifteen_chars() {
        let mut map = IndexMap::new();
        map.insert(
            "UnitedHealthcare of Texas".to_string(),
            stats(0.3, 3, 10, Some(250.0)),
        );

        let records = rate_records(&map, EntityKind::Payer);
        assert_eq!(records[0].label, format!("UnitedHealthcar{ELLIPSIS}"));
        assert_eq!(records[0].full_label, "UnitedHealthcare of Texas");
    }

    #[test]
    fn cpt_labels_are_never_truncated() {
        let mut map = IndexMap::new();
        map.insert("9921399213992139".to_string(), stats(0.1, 1, 10, None));

        let records = rate_records(&map, EntityKind::Cpt);
        assert_eq!(records[0].label, "9921399213992139");
    }

    #[test]
    fn reason_counts_sort_descending_without_claim_filter() {
        let mut map = IndexMap::new();
        map.insert("Missing information on claim form".to_string(), 3);
        map.insert("No authorization".to_string(), 9);
        map.insert("Not eligible".to_string(), 3);

        let records = count_records(&map, EntityKind::Reason);
        assert_eq!(records[0].full_label, "No authorization");
        assert_eq!(records[0].count, 9);
        // tie keeps insertion order
        assert_eq!(records[1].full_label, "Missing information on claim form");
        assert_eq!(records[1].label, format!("Missing information {ELLIPSIS}"));
        assert_eq!(records[2].full_label, "Not eligible");
    }

    #[test]
    fn amount_carries_through_unchanged() {
        let mut map = IndexMap::new();
        map.insert("Cigna".to_string(), stats(0.5, 50, 100, Some(1234.56)));

        let records = rate_records(&map, EntityKind::Payer);
        assert_eq!(records[0].amount, Some(1234.56));
        assert_eq!(records[0].denials, 50);
        assert_eq!(records[0].total_claims, 100);
    }
}
