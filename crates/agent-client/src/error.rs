//! Error Types

use thiserror::Error;

use globe_core::GlobeError;

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, ClientError>;

/// Client error types
#[derive(Error, Debug)]
pub enum ClientError {
    /// Transport failure (connection refused, aborted body, ...)
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Non-success HTTP status
    #[error("{context} failed with HTTP {status}")]
    Status { status: u16, context: String },

    /// Bearer token missing, expired or rejected
    #[error("Unauthorized")]
    Unauthorized,

    /// Backend refused the request with an explanation
    #[error("Request rejected: {0}")]
    Rejected(String),

    /// Land geometry or point list could not be used
    #[error("Geometry error: {0}")]
    Geometry(#[from] GlobeError),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ClientError {
    /// The stored token is no good and should be discarded
    pub const fn ends_session(&self) -> bool {
        matches!(self, Self::Unauthorized)
    }

    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::Network(_) => "Could not reach the server. Please check your connection.".into(),
            Self::Status { context, .. } => format!("{context} failed. Please try again later."),
            Self::Unauthorized => "Your session has expired. Please sign in again.".into(),
            Self::Rejected(msg) => msg.clone(),
            Self::Geometry(e) => e.user_message(),
            Self::Json(_) => "The server sent an unexpected response.".into(),
        }
    }
}
