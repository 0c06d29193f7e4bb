//! Per-session UI state with explicit async transitions.
//!
//! Upload and prediction are independent in-flight operations writing to
//! disjoint slots. Each `begin_*` call issues a monotonically increasing
//! token; a resolution is accepted only when its token matches the most
//! recently issued one, so a slow first upload resolving after a faster
//! second upload is discarded instead of overwriting newer state.

use tracing::debug;

use crate::models::{AnalysisResult, Prediction};

#[derive(Debug, Default)]
pub struct SessionState {
    analysis: Option<AnalysisResult>,
    prediction: Option<Prediction>,
    upload_error: Option<String>,
    prediction_error: Option<String>,
    last_upload_token: u64,
    upload_pending: bool,
    last_predict_token: u64,
    predict_pending: bool,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn analysis(&self) -> Option<&AnalysisResult> {
        self.analysis.as_ref()
    }

    pub fn prediction(&self) -> Option<&Prediction> {
        self.prediction.as_ref()
    }

    pub fn upload_error(&self) -> Option<&str> {
        self.upload_error.as_deref()
    }

    pub fn prediction_error(&self) -> Option<&str> {
        self.prediction_error.as_deref()
    }

    pub fn upload_pending(&self) -> bool {
        self.upload_pending
    }

    pub fn predict_pending(&self) -> bool {
        self.predict_pending
    }

    /// Start an upload, superseding any earlier unresolved one.
    pub fn begin_upload(&mut self) -> u64 {
        self.last_upload_token += 1;
        self.upload_pending = true;
        self.last_upload_token
    }

    /// Resolve an upload. Returns false when the token is stale, in which
    /// case nothing changes. On success the analysis is replaced wholesale
    /// and the error slot cleared; on failure the message is stored and any
    /// prior analysis is left intact.
    pub fn resolve_upload(
        &mut self,
        token: u64,
        outcome: Result<AnalysisResult, String>,
    ) -> bool {
        if token != self.last_upload_token {
            debug!(token, latest = self.last_upload_token, "discarding stale upload resolution");
            return false;
        }
        self.upload_pending = false;
        match outcome {
            Ok(result) => {
                self.analysis = Some(result);
                self.upload_error = None;
            }
            Err(message) => {
                self.upload_error = Some(message);
            }
        }
        true
    }

    pub fn begin_predict(&mut self) -> u64 {
        self.last_predict_token += 1;
        self.predict_pending = true;
        self.last_predict_token
    }

    /// Resolve a prediction. Same staleness rule as uploads; a successful
    /// prediction fully replaces the prior one, never merges into it.
    pub fn resolve_predict(&mut self, token: u64, outcome: Result<Prediction, String>) -> bool {
        if token != self.last_predict_token {
            debug!(token, latest = self.last_predict_token, "discarding stale prediction resolution");
            return false;
        }
        self.predict_pending = false;
        match outcome {
            Ok(prediction) => {
                self.prediction = Some(prediction);
                self.prediction_error = None;
            }
            Err(message) => {
                self.prediction_error = Some(message);
            }
        }
        true
    }
}
