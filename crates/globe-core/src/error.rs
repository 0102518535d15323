//! Error Types

use thiserror::Error;

/// Result type alias for globe operations
pub type Result<T> = std::result::Result<T, GlobeError>;

/// Globe error types
#[derive(Error, Debug)]
pub enum GlobeError {
    /// Land geometry could not be interpreted
    #[error("Invalid geometry: {0}")]
    InvalidGeometry(String),

    /// Precomputed sample point list is malformed
    #[error("Invalid sample points: {0}")]
    InvalidPoints(String),

    /// Viewport request cannot produce a drawable surface
    #[error("Invalid viewport: {0}")]
    InvalidViewport(String),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GlobeError {
    /// Convert to a user-friendly message
    pub fn user_message(&self) -> String {
        match self {
            Self::InvalidGeometry(_) | Self::Json(_) => "Failed to load land map data".into(),
            Self::InvalidPoints(_) => "Failed to load precomputed land points".into(),
            Self::InvalidViewport(_) => "The globe cannot be drawn at this size".into(),
        }
    }
}
