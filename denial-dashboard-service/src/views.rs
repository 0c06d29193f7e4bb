//! Chart/table-ready view models derived from a raw analysis.
//!
//! Views are rebuilt from the stored [`AnalysisResult`] on every request;
//! they carry no state of their own.

use denial_metrics::{
    AnalysisResult, CountRecord, EntityKind, Prediction, RateRecord, Recommendation, RiskLevel,
    count_records, policy, rate_band, rate_records,
};
use serde::Serialize;

/// Everything the dashboard renders for one session.
#[derive(Debug, Serialize)]
pub struct SessionView {
    pub session_id: String,
    pub upload_pending: bool,
    pub upload_error: Option<String>,
    pub dashboard: Option<DashboardView>,
    pub prediction_pending: bool,
    pub prediction_error: Option<String>,
    pub prediction: Option<Prediction>,
}

#[derive(Debug, Serialize)]
pub struct DashboardView {
    pub summary: SummaryView,
    pub top_denied_cpts: Vec<RateRow>,
    pub payers: Vec<RateRow>,
    pub providers: Vec<RateRow>,
    pub denial_reasons: Vec<CountRecord>,
    pub top_cpts_by_volume: Vec<CountRecord>,
    pub denial_patterns: Vec<CountRecord>,
    pub recommendations: Vec<Recommendation>,
    pub ml_model: Option<serde_json::Value>,
    pub training_info: Option<serde_json::Value>,
}

/// Headline cards at the top of the dashboard.
#[derive(Debug, Serialize)]
pub struct SummaryView {
    pub total_records: u64,
    pub total_denials: u64,
    /// Fixed-precision percentage string, same rounding as every table.
    pub overall_denial_rate_percent: String,
    pub total_denied_amount: f64,
    pub revenue_at_risk_percentage: f64,
    pub total_revenue: f64,
    pub load_message: Option<String>,
    pub columns_found: Option<Vec<String>>,
}

/// Rate record plus the severity band used for row/bar coloring. The band
/// shares thresholds with prediction risk tiers.
#[derive(Debug, Serialize)]
pub struct RateRow {
    #[serde(flatten)]
    pub record: RateRecord,
    pub severity: RiskLevel,
}

fn rate_rows(map: &indexmap::IndexMap<String, denial_metrics::EntityStats>, kind: EntityKind) -> Vec<RateRow> {
    rate_records(map, kind)
        .into_iter()
        .map(|record| RateRow {
            severity: rate_band(record.denial_rate),
            record,
        })
        .collect()
}

impl DashboardView {
    pub fn from_analysis(analysis: &AnalysisResult) -> Self {
        let patterns = analysis
            .denial_patterns
            .as_ref()
            .map(|map| count_records(map, EntityKind::Reason))
            .unwrap_or_default();

        Self {
            summary: SummaryView {
                total_records: analysis.data_summary.total_records,
                total_denials: analysis.data_summary.total_denials,
                overall_denial_rate_percent: policy::format_rate_percent(
                    analysis.financial_impact.overall_denial_rate,
                ),
                total_denied_amount: analysis.financial_impact.total_denied_amount,
                revenue_at_risk_percentage: analysis.financial_impact.revenue_at_risk_percentage,
                total_revenue: analysis.financial_impact.total_revenue,
                load_message: analysis.data_summary.load_message.clone(),
                columns_found: analysis.data_summary.columns_found.clone(),
            },
            top_denied_cpts: rate_rows(&analysis.top_denied_cpts.by_rate, EntityKind::Cpt),
            payers: rate_rows(&analysis.payer_analysis, EntityKind::Payer),
            providers: rate_rows(&analysis.provider_analysis, EntityKind::Provider),
            denial_reasons: count_records(&analysis.denial_reasons, EntityKind::Reason),
            top_cpts_by_volume: count_records(
                &analysis.top_denied_cpts.by_volume,
                EntityKind::Cpt,
            ),
            denial_patterns: patterns,
            recommendations: analysis.recommendations.clone(),
            ml_model: analysis.ml_model.clone(),
            training_info: analysis.training_info.clone(),
        }
    }
}
