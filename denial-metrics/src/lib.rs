pub mod client;
pub mod error;
pub mod models;
pub mod normalize;
pub mod policy;
pub mod risk;
pub mod session;
pub mod store;

// Re-export commonly used types
pub use client::{
    ALLOWED_UPLOAD_EXTENSIONS, AnalysisBackend, HttpBackend, has_allowed_extension,
    submit_prediction, upload_analysis,
};
pub use error::{ContractError, Result};
pub use models::{
    AnalysisResult, DataSummary, EntityStats, FinancialImpact, Prediction, PredictionRequest,
    PredictionWire, Priority, Recommendation, TopDeniedCpts,
};
pub use normalize::{CountRecord, EntityKind, RateRecord, count_records, rate_records};
pub use risk::{HIGH_RISK_THRESHOLD, MEDIUM_RISK_THRESHOLD, RiskLevel, classify, rate_band};
pub use session::SessionState;
pub use store::{Session, SessionStore};
