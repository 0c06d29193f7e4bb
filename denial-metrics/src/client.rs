//! Contract with the analysis backend.
//!
//! The backend is specified only at its boundary: `POST /upload` takes a
//! multipart form with a single `file` field and returns the analysis JSON;
//! `POST /predict` takes a prediction request and returns a probability plus
//! risk tier. Failures carry `{ "error": message }` with a non-2xx status.

use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::info;

use crate::error::{ContractError, Result};
use crate::models::{AnalysisResult, Prediction, PredictionRequest, PredictionWire};

/// Extensions accepted before transmission. The backend remains the authority
/// on file content.
pub const ALLOWED_UPLOAD_EXTENSIONS: [&str; 3] = ["csv", "xlsx", "xls"];

/// Case-insensitive extension filter applied at the upload boundary.
pub fn has_allowed_extension(file_name: &str) -> bool {
    file_name
        .rsplit_once('.')
        .map(|(stem, ext)| {
            !stem.is_empty()
                && ALLOWED_UPLOAD_EXTENSIONS
                    .iter()
                    .any(|allowed| ext.eq_ignore_ascii_case(allowed))
        })
        .unwrap_or(false)
}

/// Seam to the analysis backend, mockable in tests.
#[async_trait]
pub trait AnalysisBackend: Send + Sync {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<AnalysisResult>;
    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionWire>;
}

/// HTTP implementation of the backend contract.
pub struct HttpBackend {
    client: reqwest::Client,
    base_url: String,
}

impl HttpBackend {
    pub fn new(base_url: impl Into<String>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            client: reqwest::Client::new(),
            base_url,
        }
    }
}

/// Decode a backend response, mapping non-2xx `{ "error": … }` payloads to
/// `Rejected` and anything unparsable to `Transport`.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if status.is_success() {
        response
            .json::<T>()
            .await
            .map_err(|e| ContractError::Transport(format!("response unparsable: {e}")))
    } else {
        let payload: Value = response
            .json()
            .await
            .map_err(|e| ContractError::Transport(format!("error response unparsable: {e}")))?;
        let message = payload
            .get("error")
            .and_then(Value::as_str)
            .map(str::to_string)
            .unwrap_or_else(|| format!("backend returned status {status}"));
        Err(ContractError::Rejected(message))
    }
}

#[async_trait]
impl AnalysisBackend for HttpBackend {
    async fn upload(&self, file_name: &str, bytes: Vec<u8>) -> Result<AnalysisResult> {
        let part = Part::bytes(bytes).file_name(file_name.to_string());
        let form = Form::new().part("file", part);
        let response = self
            .client
            .post(format!("{}/upload", self.base_url))
            .multipart(form)
            .send()
            .await?;
        read_json(response).await
    }

    async fn predict(&self, request: &PredictionRequest) -> Result<PredictionWire> {
        let response = self
            .client
            .post(format!("{}/predict", self.base_url))
            .json(request)
            .send()
            .await?;
        read_json(response).await
    }
}

/// Upload a claims file for analysis. The extension filter and empty-file
/// check run before any network traffic.
pub async fn upload_analysis(
    backend: &dyn AnalysisBackend,
    file_name: &str,
    bytes: Vec<u8>,
) -> Result<AnalysisResult> {
    if !has_allowed_extension(file_name) {
        return Err(ContractError::Validation(format!(
            "unsupported file type: {file_name} (expected .csv, .xlsx or .xls)"
        )));
    }
    if bytes.is_empty() {
        return Err(ContractError::Validation(
            "uploaded file is empty".to_string(),
        ));
    }

    info!(file_name, size = bytes.len(), "forwarding claims file for analysis");
    backend.upload(file_name, bytes).await
}

/// Submit a denial prediction. Validation failures resolve locally and issue
/// no network call; the risk tier of a successful response is resolved via
/// the classifier fallback.
pub async fn submit_prediction(
    backend: &dyn AnalysisBackend,
    request: &PredictionRequest,
) -> Result<Prediction> {
    request.validate()?;

    info!(
        cpt_code = %request.cpt_code,
        insurance_company = %request.insurance_company,
        "submitting denial prediction"
    );
    let wire = backend.predict(request).await?;
    Ok(Prediction::from_wire(wire))
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;
    use crate::risk::RiskLevel;

    /// Mock backend that counts calls and replays canned responses.
    #[derive(Default)]
    struct MockBackend {
        upload_calls: AtomicUsize,
        predict_calls: AtomicUsize,
        predict_response: Option<PredictionWire>,
        predict_error: Option<String>,
    }

    #[async_trait]
    impl AnalysisBackend for MockBackend {
        async fn upload(&self, _file_name: &str, _bytes: Vec<u8>) -> Result<AnalysisResult> {
            self.upload_calls.fetch_add(1, Ordering::SeqCst);
            Err(ContractError::Rejected("not under test".to_string()))
        }

        async fn predict(&self, _request: &PredictionRequest) -> Result<PredictionWire> {
            self.predict_calls.fetch_add(1, Ordering::SeqCst);
            if let Some(message) = &self.predict_error {
                return Err(ContractError::Rejected(message.clone()));
            }
            Ok(self.predict_response.clone().expect("no canned response"))
        }
    }

    fn request(physician: &str) -> PredictionRequest {
        PredictionRequest {
            cpt_code: "99213".to_string(),
            insurance_company: "Cigna".to_string(),
            physician_name: physician.to_string(),
        }
    }

    #[test]
    fn extension_filter_is_case_insensitive() {
        assert!(has_allowed_extension("claims.csv"));
        assert!(has_allowed_extension("claims.XLSX"));
        assert!(has_allowed_extension("Q3 report.xls"));
        assert!(!has_allowed_extension("claims.pdf"));
        assert!(!has_allowed_extension("claims"));
        assert!(!has_allowed_extension(".csv"));
    }

    #[tokio::test]
    async fn blank_physician_name_never_reaches_the_backend() {
        let backend = MockBackend::default();
        let err = submit_prediction(&backend, &request("  "))
            .await
            .unwrap_err();

        assert!(matches!(err, ContractError::Validation(_)));
        assert_eq!(backend.predict_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_risk_level_falls_back_to_the_classifier() {
        let backend = MockBackend {
            predict_response: Some(PredictionWire {
                denial_probability: 0.85,
                risk_level: None,
            }),
            ..Default::default()
        };

        let prediction = submit_prediction(&backend, &request("Dr. Chen"))
            .await
            .unwrap();
        assert_eq!(prediction.risk_level, RiskLevel::High);
        assert_eq!(backend.predict_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn backend_risk_level_is_never_overridden() {
        let backend = MockBackend {
            predict_response: Some(PredictionWire {
                denial_probability: 0.95,
                risk_level: Some(RiskLevel::Low),
            }),
            ..Default::default()
        };

        let prediction = submit_prediction(&backend, &request("Dr. Chen"))
            .await
            .unwrap();
        assert_eq!(prediction.risk_level, RiskLevel::Low);
    }

    #[tokio::test]
    async fn backend_rejection_message_surfaces_verbatim() {
        let backend = MockBackend {
            predict_error: Some("Model not trained yet".to_string()),
            ..Default::default()
        };

        let err = submit_prediction(&backend, &request("Dr. Chen"))
            .await
            .unwrap_err();
        match err {
            ContractError::Rejected(message) => assert_eq!(message, "Model not trained yet"),
            other => panic!("expected rejection, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn disallowed_extension_never_reaches_the_backend() {
        let backend = MockBackend::default();
        let err = upload_analysis(&backend, "claims.pdf", vec![1, 2, 3])
            .await
            .unwrap_err();

        assert!(matches!(err, ContractError::Validation(_)));
        assert_eq!(backend.upload_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_file_never_reaches_the_backend() {
        let backend = MockBackend::default();
        let err = upload_analysis(&backend, "claims.csv", Vec::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ContractError::Validation(_)));
        assert_eq!(backend.upload_calls.load(Ordering::SeqCst), 0);
    }
}
