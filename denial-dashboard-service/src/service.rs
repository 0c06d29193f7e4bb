use std::sync::Arc;

use axum::{
    Router,
    extract::{Multipart, Path, State},
    http::StatusCode,
    response::Json,
    routing::{delete, get, post},
};
use denial_metrics::{
    AnalysisBackend, ContractError, HttpBackend, Prediction, PredictionRequest, Session,
    SessionStore, submit_prediction, upload_analysis,
};
use serde_json::{Value, json};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use crate::views::{DashboardView, SessionView};

type ApiResult<T> = Result<Json<T>, ApiError>;
type ApiError = (StatusCode, Json<Value>);

fn bad_request_error(message: &str) -> ApiError {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message })))
}

fn not_found_error(message: &str, id: &str) -> ApiError {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": message,
            "session_id": id
        })),
    )
}

fn conflict_error(message: &str) -> ApiError {
    (StatusCode::CONFLICT, Json(json!({ "error": message })))
}

/// Map the contract taxonomy onto HTTP statuses. Rejection messages are
/// surfaced verbatim; transport failures become a gateway error.
fn contract_error(err: &ContractError) -> ApiError {
    match err {
        ContractError::Validation(message) => bad_request_error(message),
        ContractError::Rejected(message) => bad_request_error(message),
        ContractError::Transport(message) => (
            StatusCode::BAD_GATEWAY,
            Json(json!({ "error": format!("analysis backend unreachable: {message}") })),
        ),
    }
}

#[derive(Clone)]
pub struct AppState {
    pub backend: Arc<dyn AnalysisBackend>,
    pub sessions: Arc<SessionStore>,
}

/// Build the application with the HTTP backend at `backend_url`.
pub fn create_app(backend_url: &str) -> Router {
    let state = AppState {
        backend: Arc::new(HttpBackend::new(backend_url)),
        sessions: Arc::new(SessionStore::new()),
    };
    build_router(state)
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .route("/health", get(health_check))
        .route("/sessions", post(create_session))
        .route("/sessions/{id}", delete(delete_session))
        .route("/sessions/{id}/upload", post(upload_file))
        .route("/sessions/{id}/dashboard", get(get_dashboard))
        .route("/sessions/{id}/predict", post(predict_denial))
        .route("/sessions/{id}/prediction", get(get_prediction))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn root() -> Json<Value> {
    Json(json!({
        "service": "Denial Analytics Dashboard Service",
        "version": "1.0.0",
        "description": "Chart-ready denial analytics and risk prediction for medical billing claims",
        "endpoints": {
            "POST /sessions": "Create a dashboard session",
            "POST /sessions/{id}/upload": "Upload a claims file (.csv, .xlsx, .xls) for analysis",
            "GET /sessions/{id}/dashboard": "Get the shaped analytics view",
            "POST /sessions/{id}/predict": "Predict denial risk for a single claim",
            "GET /sessions/{id}/prediction": "Get the last resolved prediction",
            "DELETE /sessions/{id}": "Discard a session",
            "GET /health": "Health check"
        }
    }))
}

async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn create_session(State(state): State<AppState>) -> ApiResult<Value> {
    let session = state.sessions.create();
    info!(session_id = %session.id, "created dashboard session");
    Ok(Json(json!({ "session_id": session.id })))
}

async fn delete_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Value> {
    if state.sessions.delete(&session_id) {
        Ok(Json(json!({ "session_id": session_id, "status": "deleted" })))
    } else {
        Err(not_found_error("Session not found", &session_id))
    }
}

fn load_session(state: &AppState, session_id: &str) -> Result<Session, ApiError> {
    state
        .sessions
        .get(session_id)
        .ok_or_else(|| not_found_error("Session not found", session_id))
}

/// Pull the single `file` field out of the multipart body.
async fn read_upload(mut multipart: Multipart) -> Result<(String, Vec<u8>), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| bad_request_error(&format!("malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| bad_request_error("No file selected"))?;
        let bytes = field
            .bytes()
            .await
            .map_err(|e| bad_request_error(&format!("failed to read file: {e}")))?;
        return Ok((file_name, bytes.to_vec()));
    }
    Err(bad_request_error("No file uploaded"))
}

async fn upload_file(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    multipart: Multipart,
) -> ApiResult<DashboardView> {
    let session = load_session(&state, &session_id)?;
    let (file_name, bytes) = read_upload(multipart).await?;

    info!(session_id = %session_id, file_name = %file_name, size = bytes.len(), "upload received");

    // Reject unusable files before marking an upload in flight.
    if !denial_metrics::has_allowed_extension(&file_name) {
        return Err(bad_request_error(&format!(
            "Unsupported file type. Please upload CSV or Excel files. Got: {file_name}"
        )));
    }

    let token = session.state.lock().unwrap().begin_upload();

    let outcome = upload_analysis(state.backend.as_ref(), &file_name, bytes).await;

    let mut guard = session.state.lock().unwrap();
    match outcome {
        Ok(analysis) => {
            let view = DashboardView::from_analysis(&analysis);
            if !guard.resolve_upload(token, Ok(analysis)) {
                // a newer upload superseded this one; report without mutating
                warn!(session_id = %session_id, token, "upload superseded by a newer one");
                return Err(conflict_error("Upload superseded by a newer upload"));
            }
            info!(session_id = %session_id, "analysis stored");
            Ok(Json(view))
        }
        Err(err) => {
            error!(session_id = %session_id, error = %err, "upload failed");
            guard.resolve_upload(token, Err(err.to_string()));
            Err(contract_error(&err))
        }
    }
}

async fn get_dashboard(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<SessionView> {
    let session = load_session(&state, &session_id)?;
    let guard = session.state.lock().unwrap();

    Ok(Json(SessionView {
        session_id: session.id.clone(),
        upload_pending: guard.upload_pending(),
        upload_error: guard.upload_error().map(str::to_string),
        dashboard: guard.analysis().map(DashboardView::from_analysis),
        prediction_pending: guard.predict_pending(),
        prediction_error: guard.prediction_error().map(str::to_string),
        prediction: guard.prediction().cloned(),
    }))
}

async fn predict_denial(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
    Json(request): Json<PredictionRequest>,
) -> ApiResult<Prediction> {
    let session = load_session(&state, &session_id)?;

    // UI-boundary guard: one prediction in flight per session.
    let token = {
        let mut guard = session.state.lock().unwrap();
        if guard.predict_pending() {
            return Err(conflict_error("A prediction is already in progress"));
        }
        guard.begin_predict()
    };

    let outcome = submit_prediction(state.backend.as_ref(), &request).await;

    let mut guard = session.state.lock().unwrap();
    match outcome {
        Ok(prediction) => {
            guard.resolve_predict(token, Ok(prediction.clone()));
            info!(
                session_id = %session_id,
                probability = prediction.denial_probability,
                risk = %prediction.risk_level,
                "prediction stored"
            );
            Ok(Json(prediction))
        }
        Err(err) => {
            error!(session_id = %session_id, error = %err, "prediction failed");
            guard.resolve_predict(token, Err(err.to_string()));
            Err(contract_error(&err))
        }
    }
}

async fn get_prediction(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> ApiResult<Value> {
    let session = load_session(&state, &session_id)?;
    let guard = session.state.lock().unwrap();

    Ok(Json(json!({
        "session_id": session.id,
        "pending": guard.predict_pending(),
        "prediction": guard.prediction(),
        "error": guard.prediction_error(),
    })))
}
