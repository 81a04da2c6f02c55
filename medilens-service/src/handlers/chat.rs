use crate::dtos::{ChatRequest, ChatResponse};
use crate::startup::AppState;
use axum::{extract::State, Json};
use service_core::error::AppError;

/// Relay a user prompt to the generative model and return its reply verbatim.
pub async fn chat_with_gemini(
    State(state): State<AppState>,
    Json(request): Json<ChatRequest>,
) -> Result<Json<ChatResponse>, AppError> {
    let prompt = request
        .prompt
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .ok_or_else(|| AppError::BadRequest(anyhow::anyhow!("No prompt provided")))?;

    let reply = state.generative.generate_text(prompt).await.map_err(|e| {
        tracing::error!(error = %e, "Gemini text chat failed");
        AppError::Upstream(format!("Failed to get Gemini reply: {}", e))
    })?;

    Ok(Json(ChatResponse { reply }))
}
