pub mod calendar;
pub mod chat;
pub mod health;
pub mod stt;

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use campus_core::CampusError;
use serde::Serialize;

/// Standard API error response
#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Convert campus errors to HTTP responses
#[derive(Debug)]
pub struct AppError(CampusError);

impl AppError {
    /// Reject a malformed request body.
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self(CampusError::Validation(message.into()))
    }

    pub fn status(&self) -> StatusCode {
        match &self.0 {
            CampusError::Validation(_) => StatusCode::BAD_REQUEST,
            CampusError::NotFound(_) => StatusCode::NOT_FOUND,
            CampusError::UpstreamFetch { .. } | CampusError::UpstreamStatus { .. } => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match &self.0 {
            CampusError::NotFound(_) => "not found".to_string(),
            CampusError::Configuration(message) => message.clone(),
            other => other.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self.0, status = status.as_u16(), "request failed");
        } else {
            tracing::debug!(error = %self.0, status = status.as_u16(), "request rejected");
        }

        let body = Json(ErrorResponse {
            error: self.message(),
        });
        (status, body).into_response()
    }
}

impl From<CampusError> for AppError {
    fn from(err: CampusError) -> Self {
        Self(err)
    }
}
