//! Error types for the webhook server.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use instagram_client::{GraphError, SignatureError};
use orchestrator::AgentError;
use serde_json::json;
use thiserror::Error;

/// Message returned by development endpoints outside development.
pub const DEVELOPMENT_ONLY: &str = "Disponível apenas em desenvolvimento";

/// Errors surfaced by request handlers.
#[derive(Debug, Error)]
pub enum ServerError {
    /// Webhook signature check failed.
    #[error(transparent)]
    Signature(#[from] SignatureError),

    /// Required request fields were missing.
    #[error("{0}")]
    BadRequest(String),

    /// Endpoint disabled in this environment.
    #[error("{}", DEVELOPMENT_ONLY)]
    DevelopmentOnly,

    /// The agent failed to produce a reply.
    #[error("agent error: {0}")]
    Agent(#[from] AgentError),

    /// The Graph API call failed.
    #[error("graph error: {0}")]
    Graph(#[from] GraphError),
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        let (status, body) = match &self {
            ServerError::Signature(err) => {
                let status = match err {
                    SignatureError::MissingSignature => StatusCode::UNAUTHORIZED,
                    SignatureError::MissingBody => StatusCode::INTERNAL_SERVER_ERROR,
                    SignatureError::Mismatch => StatusCode::FORBIDDEN,
                };
                (status, json!({ "error": err.to_string() }))
            }
            ServerError::BadRequest(msg) => (StatusCode::BAD_REQUEST, json!({ "error": msg })),
            ServerError::DevelopmentOnly => {
                (StatusCode::FORBIDDEN, json!({ "error": DEVELOPMENT_ONLY }))
            }
            ServerError::Agent(err) => {
                tracing::error!("Agent error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "success": false, "error": err.to_string() }),
                )
            }
            ServerError::Graph(err) => {
                tracing::error!("Graph error: {}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    json!({ "error": err.to_string() }),
                )
            }
        };

        (status, Json(body)).into_response()
    }
}

/// Result type for handlers.
pub type Result<T> = std::result::Result<T, ServerError>;

#[cfg(test)]
mod tests {
    use super::*;

    fn status_of(err: ServerError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_signature_statuses() {
        assert_eq!(
            status_of(SignatureError::MissingSignature.into()),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            status_of(SignatureError::MissingBody.into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(status_of(SignatureError::Mismatch.into()), StatusCode::FORBIDDEN);
    }

    #[test]
    fn test_request_statuses() {
        assert_eq!(
            status_of(ServerError::BadRequest("userId é obrigatório".to_string())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(status_of(ServerError::DevelopmentOnly), StatusCode::FORBIDDEN);
        assert_eq!(
            status_of(AgentError::EmptyMessage("1789".to_string()).into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(
            status_of(GraphError::from_status(401, "").into()),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
