use axum::{
    http::{HeaderValue, Request},
    middleware::{Next, from_fn},
};
use denial_dashboard_service::create_app;
use tokio::net::TcpListener;
use tracing::{Instrument, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

/// Initialize structured JSON tracing based on environment variables
fn init_tracing() {
    let log_format = std::env::var("LOG_FORMAT").unwrap_or_else(|_| "json".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        "denial_dashboard_service=debug,denial_metrics=debug,tower_http=debug".into()
    });

    match log_format.as_str() {
        "pretty" => {
            // Human-readable logging for development
            tracing_subscriber::registry()
                .with(env_filter)
                .with(tracing_subscriber::fmt::layer().pretty())
                .init();
        }
        _ => {
            // Structured JSON logging for production
            tracing_subscriber::registry()
                .with(env_filter)
                .with(
                    tracing_subscriber::fmt::layer()
                        .json()
                        .with_target(true)
                        .with_level(true),
                )
                .init();
        }
    }
}

/// Middleware to add correlation ID to all requests
async fn correlation_id_middleware(
    mut request: Request<axum::body::Body>,
    next: Next,
) -> axum::response::Response {
    let correlation_id = Uuid::new_v4().to_string();

    if let Ok(value) = HeaderValue::from_str(&correlation_id) {
        request.headers_mut().insert("x-correlation-id", value);
    }

    let span = tracing::info_span!("http_request", correlation_id = %correlation_id);
    next.run(request).instrument(span).await
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let backend_url =
        std::env::var("BACKEND_URL").unwrap_or_else(|_| "http://localhost:5000".to_string());

    let port = std::env::var("PORT")
        .unwrap_or_else(|_| "3000".to_string())
        .parse::<u16>()
        .unwrap_or(3000);

    let app = create_app(&backend_url).layer(from_fn(correlation_id_middleware));

    let listener = TcpListener::bind(format!("0.0.0.0:{port}")).await?;
    let addr = listener.local_addr()?;

    info!("Denial Analytics Dashboard Service starting on {}", addr);
    info!("Analysis backend at {}", backend_url);
    info!("Health check endpoint: http://{}/health", addr);
    info!("Upload endpoint: POST http://{}/sessions/{{id}}/upload", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
