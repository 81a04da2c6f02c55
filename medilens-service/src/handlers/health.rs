use crate::startup::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;
use service_core::error::AppError;

/// Health check endpoint for Docker/K8s liveness probes.
pub async fn health_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "service": "medilens-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
    )
}

/// Readiness check endpoint for K8s readiness probes.
///
/// Ready only when the generative provider is reachable.
pub async fn readiness_check(State(state): State<AppState>) -> Result<StatusCode, AppError> {
    state.generative.health_check().await.map_err(|e| {
        tracing::warn!(error = %e, "Readiness check failed");
        AppError::ServiceUnavailable
    })?;

    Ok(StatusCode::OK)
}
