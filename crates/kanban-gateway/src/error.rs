//! Error types for gateway operations.

use std::collections::BTreeMap;

use kanban_models::ApiErrorBody;
use thiserror::Error;

/// Errors returned by a [`BoardGateway`](crate::BoardGateway).
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GatewayError {
    /// The referenced entity does not exist (HTTP 404).
    #[error("not found: {0}")]
    NotFound(String),

    /// The session may not access the entity (HTTP 403).
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The session's token was rejected (HTTP 401).
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The server rejected a stale write (HTTP 409).
    #[error("conflict: {0}")]
    Conflict(String),

    /// Request payload failed validation (HTTP 400 / 422).
    #[error("validation failed: {message}")]
    Validation {
        message: String,
        fields: BTreeMap<String, String>,
    },

    /// Any other non-success status.
    #[error("server error {status}: {message}")]
    Server { status: u16, message: String },

    /// The request never produced a response.
    #[error("transport error: {0}")]
    Transport(String),

    /// The response body could not be decoded.
    #[error("failed to decode response: {0}")]
    Decode(String),

    #[error("request timed out")]
    Timeout,

    /// An operation needing a login was called without one.
    #[error("not logged in")]
    NotAuthenticated,

    #[error("configuration error: {0}")]
    Configuration(String),
}

impl GatewayError {
    /// Maps a non-success HTTP status and its (optional) error body.
    pub fn from_status(status: u16, body: Option<ApiErrorBody>, raw: &str) -> Self {
        let message = body
            .as_ref()
            .and_then(|b| b.summary())
            .map(str::to_string)
            .unwrap_or_else(|| {
                let raw = raw.trim();
                if raw.is_empty() {
                    format!("HTTP {status}")
                } else {
                    raw.to_string()
                }
            });

        match status {
            401 => GatewayError::Unauthorized(message),
            403 => GatewayError::Forbidden(message),
            404 => GatewayError::NotFound(message),
            409 => GatewayError::Conflict(message),
            400 | 422 => GatewayError::Validation {
                message,
                fields: body.map(|b| b.validation_errors).unwrap_or_default(),
            },
            _ => GatewayError::Server { status, message },
        }
    }

    /// True if the error means a locally referenced entity no longer
    /// exists server-side.
    pub fn is_stale_reference(&self) -> bool {
        matches!(self, GatewayError::NotFound(_))
    }

    /// True if the error invalidates the current login.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            GatewayError::Unauthorized(_) | GatewayError::NotAuthenticated
        )
    }
}

impl From<reqwest::Error> for GatewayError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GatewayError::Timeout
        } else if err.is_decode() {
            GatewayError::Decode(err.to_string())
        } else {
            GatewayError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for GatewayError {
    fn from(err: serde_json::Error) -> Self {
        GatewayError::Decode(err.to_string())
    }
}

/// Result type for gateway operations.
pub type Result<T> = std::result::Result<T, GatewayError>;
