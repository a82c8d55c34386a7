pub mod api;
pub mod config;
pub mod infrastructure;
pub mod models;
pub mod services;
pub mod utils;

use crate::api::error::AppError;
use crate::config::TranscribeConfig;
use crate::services::transcription_service::TranscriptionService;
use axum::{
    Router,
    extract::DefaultBodyLimit,
    http::HeaderValue,
    middleware::from_fn,
    response::{IntoResponse, Response},
    routing::{get, post},
};
use std::any::Any as PanicPayload;
use std::sync::Arc;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::info;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

/// Headroom above the file limit for multipart boundaries and other form fields
const MULTIPART_OVERHEAD: usize = 1024 * 1024;

#[derive(OpenApi)]
#[openapi(
    paths(
        api::handlers::transcribe::api_transcribe,
        api::handlers::transcribe::legacy_transcribe,
        api::handlers::health::health_check,
    ),
    components(
        schemas(
            models::TranscribeUpload,
            models::TranscribeResponse,
            models::TranscriptionData,
            models::LegacyTranscribeResponse,
            models::ErrorResponse,
            api::handlers::health::HealthResponse,
        )
    ),
    tags(
        (name = "transcription", description = "Bangla speech-to-text endpoints"),
        (name = "system", description = "Service status")
    )
)]
pub struct ApiDoc;

#[derive(Clone)]
pub struct AppState {
    pub transcription_service: Arc<TranscriptionService>,
    pub config: TranscribeConfig,
}

pub fn create_app(state: AppState) -> Router {
    let body_limit = state.config.max_file_size + MULTIPART_OVERHEAD;
    let cors = cors_layer(&state.config.allowed_origins);

    Router::new()
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .route("/", get(api::handlers::pages::index))
        .route("/api/docs", get(api::handlers::pages::api_docs))
        .route("/health", get(api::handlers::health::health_check))
        .route(
            "/api/transcribe",
            post(api::handlers::transcribe::api_transcribe),
        )
        .route(
            "/transcribe",
            post(api::handlers::transcribe::legacy_transcribe),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(from_fn(api::middleware::metrics::metrics_middleware))
        // Inside the request id layer so every span carries an id
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &axum::http::Request<_>| {
                    let request_id = request
                        .headers()
                        .get(&api::middleware::request_id::REQUEST_ID_HEADER)
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("unknown");
                    tracing::info_span!(
                        "http_request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                })
                .on_request(|request: &axum::http::Request<_>, _span: &tracing::Span| {
                    info!("📥 {} {}", request.method(), request.uri());
                })
                .on_response(
                    |response: &axum::http::Response<_>,
                     latency: std::time::Duration,
                     _span: &tracing::Span| {
                        info!(
                            "📤 Finished in {:?} with status {}",
                            latency,
                            response.status()
                        );
                    },
                ),
        )
        .layer(from_fn(api::middleware::request_id::request_id_middleware))
        .layer(cors)
        .with_state(state)
}

fn cors_layer(allowed_origins: &[String]) -> CorsLayer {
    let layer = CorsLayer::new().allow_methods(Any).allow_headers(Any);

    if allowed_origins.is_empty() || allowed_origins.iter().any(|o| o == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = allowed_origins
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!("Ignoring invalid CORS origin: {}", origin);
                None
            }
        })
        .collect();

    layer.allow_origin(origins)
}

fn handle_panic(payload: Box<dyn PanicPayload + Send + 'static>) -> Response {
    let detail = payload
        .downcast_ref::<String>()
        .map(String::as_str)
        .or_else(|| payload.downcast_ref::<&str>().copied())
        .unwrap_or("unknown panic");

    AppError::Internal(format!("handler panicked: {}", detail)).into_response()
}
