//! Liveness endpoint

use axum::{Json, Router, routing::get};
use chrono::Utc;
use serde::Serialize;

use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new().route("/health", get(health))
}

#[derive(Serialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub ts: String,
}

/// GET /health - Report liveness and the server clock
async fn health() -> Json<HealthResponse> {
    Json(HealthResponse {
        ok: true,
        ts: Utc::now().to_rfc3339(),
    })
}
