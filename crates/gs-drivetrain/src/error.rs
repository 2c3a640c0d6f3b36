//! Error types for drivetrain construction and configuration.
//!
//! Per-tick operations never fail; only building a drivetrain from
//! configuration or from explicit harness values can.

use thiserror::Error;

/// Result type for drivetrain operations.
pub type DrivetrainResult<T> = Result<T, DrivetrainError>;

/// Errors that can occur while configuring a drivetrain.
#[derive(Debug, Error)]
pub enum DrivetrainError {
    /// Configuration rejected by validation.
    #[error("Invalid configuration: {what}")]
    InvalidConfig { what: String },

    /// Explicit state values violate the drivetrain invariants.
    #[error("Invalid drivetrain state: {what}")]
    InvalidState { what: String },

    /// Invalid argument provided to a drivetrain function.
    #[error("Invalid argument: {what}")]
    InvalidArg { what: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<gs_core::GsError> for DrivetrainError {
    fn from(e: gs_core::GsError) -> Self {
        DrivetrainError::InvalidConfig {
            what: e.to_string(),
        }
    }
}
