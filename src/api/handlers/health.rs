use crate::AppState;
use axum::{Json, extract::State, response::IntoResponse};
use serde::Serialize;
use utoipa::ToSchema;

#[derive(Serialize, ToSchema)]
pub struct HealthResponse {
    pub status: String,
    pub recognizer: String,
    pub refiner: String,
    pub version: String,
}

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "System health status", body = HealthResponse)
    ),
    tag = "system"
)]
pub async fn health_check(State(state): State<AppState>) -> impl IntoResponse {
    let service = &state.transcription_service;

    let recognizer_status = if !service.recognizer_available() {
        "unavailable"
    } else if service.health_check().await {
        "available"
    } else {
        // Configured but the backend did not answer the probe
        "unreachable"
    };

    let refiner_status = if service.refinement_enabled() {
        "enabled"
    } else {
        "disabled"
    };

    let status = if service.recognizer_available() {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status: status.to_string(),
        recognizer: recognizer_status.to_string(),
        refiner: refiner_status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}
