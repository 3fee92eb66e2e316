//! Error types and handling
//!
//! Common error types used across the application.

use crate::capture::CaptureError;
use thiserror::Error;

/// Application-wide error type
#[derive(Error, Debug)]
pub enum AppError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Capture error: {0}")]
    Capture(#[from] CaptureError),

    #[error("Config error: {0}")]
    Config(String),

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error("No recorded artifact available")]
    NoArtifact,
}

impl AppError {
    /// Stable code used in structured log fields
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Io(_) => "IO_ERROR",
            AppError::Serialization(_) => "SERIALIZATION_ERROR",
            AppError::Capture(CaptureError::PermissionDenied) => "PERMISSION_DENIED",
            AppError::Capture(_) => "CAPTURE_ERROR",
            AppError::Config(_) => "CONFIG_ERROR",
            AppError::InvalidState(_) => "INVALID_STATE",
            AppError::NoArtifact => "NO_ARTIFACT",
        }
    }
}

/// Result type alias using AppError
pub type AppResult<T> = Result<T, AppError>;
