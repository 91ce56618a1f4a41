//! Error types for PDU operations

use thiserror::Error;

/// Core error type for PDU operations
#[derive(Error, Debug)]
pub enum PduError {
    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Named profile missing from the configuration file
    #[error("Profile not found: {0}")]
    ProfileNotFound(String),

    /// Outlet name matched no outlet reported by the device
    #[error("No outlet called `{0}` exists")]
    OutletNotFound(String),

    /// Non-success HTTP status from the device
    #[error("Device returned HTTP {status}: {body}")]
    Remote { status: u16, body: String },

    /// Network-level failure reaching the device
    #[error("Transport error: {0}")]
    Transport(String),

    /// Malformed or unsupported authentication challenge
    #[error("Authentication error: {0}")]
    Auth(String),

    /// Response body was not the expected JSON shape
    #[error("Parse error: {0}")]
    Parse(String),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for PDU operations
pub type Result<T> = std::result::Result<T, PduError>;

impl PduError {
    /// Wrap a transport-level failure, preserving its message.
    pub fn transport(err: impl std::fmt::Display) -> Self {
        PduError::Transport(err.to_string())
    }
}

impl From<serde_json::Error> for PduError {
    fn from(err: serde_json::Error) -> Self {
        PduError::Parse(err.to_string())
    }
}
