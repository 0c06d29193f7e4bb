use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::{ContractError, Result};
use crate::risk::{self, RiskLevel};

/// Full analysis payload produced by the backend for one uploaded file.
///
/// Decoded at the boundary so malformed payloads fail explicitly instead of
/// propagating missing fields into the display layer. Maps are kept in the
/// backend's insertion order; the normalizer relies on it for tie-breaking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub data_summary: DataSummary,
    pub financial_impact: FinancialImpact,
    #[serde(default)]
    pub payer_analysis: IndexMap<String, EntityStats>,
    #[serde(default)]
    pub provider_analysis: IndexMap<String, EntityStats>,
    #[serde(default)]
    pub denial_reasons: IndexMap<String, u64>,
    #[serde(default)]
    pub top_denied_cpts: TopDeniedCpts,
    #[serde(default)]
    pub denial_patterns: Option<IndexMap<String, u64>>,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
    /// Model metadata displayed verbatim, never interpreted.
    #[serde(default)]
    pub ml_model: Option<serde_json::Value>,
    #[serde(default)]
    pub training_info: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataSummary {
    pub total_records: u64,
    pub total_denials: u64,
    #[serde(default)]
    pub columns_found: Option<Vec<String>>,
    #[serde(default)]
    pub load_message: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FinancialImpact {
    /// Fraction in [0,1]; formatted at display time, never pre-multiplied.
    pub overall_denial_rate: f64,
    pub total_denied_amount: f64,
    /// Already expressed as a percentage by the backend.
    pub revenue_at_risk_percentage: f64,
    pub total_revenue: f64,
}

/// Per-entity denial statistics shared by the payer, provider and CPT maps.
///
/// Payer rows carry `lost_revenue` and `total_payments`; provider rows carry
/// `total_balance`; CPT rows carry neither.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityStats {
    pub denial_rate: f64,
    #[serde(default)]
    pub denials: u64,
    #[serde(default)]
    pub total_claims: u64,
    #[serde(default)]
    pub lost_revenue: Option<f64>,
    #[serde(default)]
    pub total_balance: Option<f64>,
    #[serde(default)]
    pub total_payments: Option<f64>,
}

impl EntityStats {
    /// Monetary amount associated with the entity's denials, whichever field
    /// the backend populated for this entity kind.
    pub fn denied_amount(&self) -> Option<f64> {
        self.lost_revenue.or(self.total_balance)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TopDeniedCpts {
    #[serde(default)]
    pub by_rate: IndexMap<String, EntityStats>,
    #[serde(default)]
    pub by_volume: IndexMap<String, u64>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recommendation {
    pub category: String,
    pub issue: String,
    pub recommendation: String,
    pub priority: Priority,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Priority {
    Low,
    Medium,
    High,
}

/// Outbound prediction request. All three fields are mandatory and must be
/// non-blank; validation happens before any network call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionRequest {
    pub cpt_code: String,
    pub insurance_company: String,
    pub physician_name: String,
}

impl PredictionRequest {
    pub fn validate(&self) -> Result<()> {
        let mut missing = Vec::new();
        if self.cpt_code.trim().is_empty() {
            missing.push("cpt_code");
        }
        if self.insurance_company.trim().is_empty() {
            missing.push("insurance_company");
        }
        if self.physician_name.trim().is_empty() {
            missing.push("physician_name");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ContractError::Validation(format!(
                "missing required fields: {}",
                missing.join(", ")
            )))
        }
    }
}

/// Prediction response as the backend sends it. `risk_level` is optional on
/// the wire; [`Prediction::from_wire`] resolves it to a concrete tier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictionWire {
    pub denial_probability: f64,
    #[serde(default)]
    pub risk_level: Option<RiskLevel>,
}

/// Fully resolved prediction. Replaces any prior prediction wholesale; there
/// is no field-level merging.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub denial_probability: f64,
    pub risk_level: RiskLevel,
}

impl Prediction {
    pub fn from_wire(wire: PredictionWire) -> Self {
        Self {
            denial_probability: wire.denial_probability,
            risk_level: risk::resolve(wire.denial_probability, wire.risk_level),
        }
    }
}
