//! Error types for the campus assistant.

use thiserror::Error;

/// Errors that can occur in campus assistant operations.
#[derive(Error, Debug)]
pub enum CampusError {
    #[error("Failed to fetch {url}: {message}")]
    UpstreamFetch { url: String, message: String },

    #[error("Upstream {url} returned HTTP {status}")]
    UpstreamStatus { url: String, status: u16 },

    #[error("ICS parse error: {0}")]
    Parse(String),

    #[error("{0}")]
    Validation(String),

    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CampusError {
    pub(crate) fn upstream(url: &str, err: impl std::fmt::Display) -> Self {
        CampusError::UpstreamFetch {
            url: url.to_string(),
            message: err.to_string(),
        }
    }

    /// Whether the failure came from a remote service rather than from us.
    pub fn is_upstream(&self) -> bool {
        matches!(
            self,
            CampusError::UpstreamFetch { .. } | CampusError::UpstreamStatus { .. }
        )
    }
}

impl From<serde_json::Error> for CampusError {
    fn from(err: serde_json::Error) -> Self {
        CampusError::Serialization(err.to_string())
    }
}

/// Result type alias for campus assistant operations.
pub type CampusResult<T> = Result<T, CampusError>;
