//! Error types for instagram-client.

use thiserror::Error;

use crate::types::ApiErrorEnvelope;

/// Errors that can occur when calling the Graph API.
///
/// Status-bearing variants keep the HTTP status and the raw response body
/// for diagnostics.
#[derive(Debug, Error)]
pub enum GraphError {
    /// 400: the payload was rejected.
    #[error("bad request: {message}")]
    BadRequest {
        status: u16,
        message: String,
        body: String,
    },

    /// 401: the access token is invalid or expired.
    #[error("access token invalid or expired")]
    Unauthorized { status: u16, body: String },

    /// 403: the token lacks messaging permissions.
    #[error("insufficient permissions, check instagram_manage_messages")]
    Forbidden { status: u16, body: String },

    /// 429: rate limit exceeded.
    #[error("rate limit exceeded")]
    RateLimited { status: u16, body: String },

    /// 5xx: the platform failed.
    #[error("platform server error (HTTP {status})")]
    Server { status: u16, body: String },

    /// Any other non-success status.
    #[error("HTTP {status}: {message}")]
    Unknown {
        status: u16,
        message: String,
        body: String,
    },

    /// HTTP request failed before a response arrived.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Response body could not be decoded.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl GraphError {
    /// Classify a non-success response.
    pub fn from_status(status: u16, body: impl Into<String>) -> Self {
        let body = body.into();
        match status {
            400 => GraphError::BadRequest {
                status,
                message: api_message(&body).unwrap_or_else(|| "invalid payload".to_string()),
                body,
            },
            401 => GraphError::Unauthorized { status, body },
            403 => GraphError::Forbidden { status, body },
            429 => GraphError::RateLimited { status, body },
            500..=599 => GraphError::Server { status, body },
            _ => GraphError::Unknown {
                status,
                message: api_message(&body).unwrap_or_else(|| "unknown error".to_string()),
                body,
            },
        }
    }

    /// HTTP status, when a response was received.
    pub fn status(&self) -> Option<u16> {
        match self {
            GraphError::BadRequest { status, .. }
            | GraphError::Unauthorized { status, .. }
            | GraphError::Forbidden { status, .. }
            | GraphError::RateLimited { status, .. }
            | GraphError::Server { status, .. }
            | GraphError::Unknown { status, .. } => Some(*status),
            GraphError::Http(err) => err.status().map(|s| s.as_u16()),
            GraphError::Json(_) => None,
        }
    }

    /// Raw response body, when a response was received.
    pub fn body(&self) -> Option<&str> {
        match self {
            GraphError::BadRequest { body, .. }
            | GraphError::Unauthorized { body, .. }
            | GraphError::Forbidden { body, .. }
            | GraphError::RateLimited { body, .. }
            | GraphError::Server { body, .. }
            | GraphError::Unknown { body, .. } => Some(body),
            GraphError::Http(_) | GraphError::Json(_) => None,
        }
    }

    /// Whether retrying the same request can never succeed.
    pub fn is_permanent(&self) -> bool {
        matches!(
            self,
            GraphError::BadRequest { .. }
                | GraphError::Unauthorized { .. }
                | GraphError::Forbidden { .. }
        )
    }
}

fn api_message(body: &str) -> Option<String> {
    serde_json::from_str::<ApiErrorEnvelope>(body)
        .ok()
        .map(|envelope| envelope.error.message)
}
