//! Error types for Zeni Core

use thiserror::Error;

/// Main error type for overlay operations
#[derive(Error, Debug)]
pub enum Error {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Surface error: {0}")]
    Surface(#[from] SurfaceError),

    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Platform error: {0}")]
    Platform(#[from] PlatformError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

/// Failures talking to the conversational backend.
///
/// The display strings are what ends up inline in the conversation, so they
/// stay short and human readable.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    #[error("Connection failed: {0}")]
    ConnectionFailed(String),

    #[error("Request timed out after {0} ms")]
    Timeout(u64),

    #[error("HTTP Error: {0}")]
    Status(u16),

    #[error("Malformed response: {0}")]
    MalformedResponse(String),

    #[error("Dispatcher is shut down")]
    WorkerGone,
}

/// Compositor-side failures (window attach/detach/update)
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SurfaceError {
    #[error("Attach rejected: {0}")]
    AttachRejected(String),

    #[error("Surface not attached: {0}")]
    NotAttached(String),

    #[error("Layout update failed: {0}")]
    LayoutFailed(String),

    #[error("Overlay permission revoked")]
    PermissionRevoked,
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {reason}")]
    Unreadable { path: String, reason: String },

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Permission and lifecycle collaborator errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlatformError {
    #[error("Overlay permission not granted")]
    PermissionDenied,

    #[error("Permission request failed: {0}")]
    PermissionRequestFailed(String),

    #[error("Widget already running")]
    AlreadyRunning,

    #[error("Host hand-off failed: {0}")]
    HandoffFailed(String),
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            TransportError::Status(status.as_u16())
        } else if err.is_decode() {
            TransportError::MalformedResponse(err.to_string())
        } else {
            TransportError::ConnectionFailed(err.to_string())
        }
    }
}

impl serde::Serialize for Error {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

/// Result type alias using our Error type
pub type Result<T> = std::result::Result<T, Error>;
