//! Unified error types for the PlatePerfect API service.

use thiserror::Error;

/// Unified error type for the service.
#[derive(Error, Debug)]
pub enum AppError {
    /// Configuration loading error.
    #[error("configuration error: {0}")]
    Config(#[from] envy::Error),

    /// Hosted-backend client error.
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),

    /// HTTP request error.
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from the hosted-backend client.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Connection probe exhausted all attempts.
    #[error("backend unreachable after {attempts} attempts: {reason}")]
    Unreachable {
        /// Number of attempts made.
        attempts: u32,
        /// Last failure seen.
        reason: String,
    },

    /// Backend answered the probe with a non-success status.
    #[error("backend unhealthy: HTTP {status}")]
    Unhealthy {
        /// Status code returned.
        status: u16,
    },

    /// Login or signup rejected.
    #[error("authentication failed for {entity}: {reason}")]
    AuthFailed {
        /// Entity the session was opened against.
        entity: String,
        /// Reason from the backend.
        reason: String,
    },

    /// A session-scoped call was made without logging in first.
    #[error("not authenticated")]
    NotAuthenticated,

    /// A CRUD request failed.
    #[error("request failed for {entity}: {reason}")]
    RequestFailed {
        /// Entity collection addressed.
        entity: String,
        /// Reason for failure.
        reason: String,
    },

    /// Failed to decode a backend response.
    #[error("failed to decode backend response: {0}")]
    DecodeError(String),

    /// HTTP transport failure.
    #[error("http request failed: {0}")]
    HttpError(#[from] reqwest::Error),
}

/// Convenient Result type alias.
pub type Result<T> = std::result::Result<T, AppError>;
