//! Unified error types for Megaverse

use thiserror::Error;

/// Unified error type for all Megaverse operations
#[derive(Error, Debug)]
pub enum MegaverseError {
    // Request errors
    #[error("Request failed")]
    RequestFailed,

    #[error("Request failed after {retries} retries")]
    MaxRetriesExceeded { retries: u32 },

    // Startup errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Megaverse goal undefined")]
    GoalMissing,

    #[error("Megaverse not initialized: goal has not been loaded")]
    NotInitialized,

    // Grid errors
    #[error("Invalid cell token '{token}': {reason}")]
    InvalidToken { token: String, reason: String },

    #[error("Unknown astral object type code: {0}")]
    UnknownObjectType(u8),

    // I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // Generic
    #[error("{0}")]
    Other(String),
}

/// Result type alias using MegaverseError
pub type Result<T> = std::result::Result<T, MegaverseError>;
