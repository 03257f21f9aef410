//! Chat endpoint

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    routing::post,
};
use campus_core::router::Reply;
use serde::Deserialize;

use crate::routes::AppError;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/chat", post(chat))
}

#[derive(Debug, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    /// Accepted for forward compatibility; routing ignores it.
    #[serde(default)]
    pub user_profile: Option<serde_json::Value>,
}

/// POST /chat - Route the last message of the conversation
async fn chat(
    State(state): State<AppState>,
    body: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<Json<Reply>, AppError> {
    let Json(request) = body.map_err(|e| AppError::bad_request(e.body_text()))?;

    let last = request.messages.last();
    tracing::debug!(
        messages = request.messages.len(),
        role = last.map(|m| m.role.as_str()).unwrap_or_default(),
        has_profile = request.user_profile.is_some(),
        "chat request"
    );

    let message = last.map(|m| m.content.as_str()).unwrap_or_default();
    let reply = state.assistant.route(message).await?;

    Ok(Json(reply))
}
