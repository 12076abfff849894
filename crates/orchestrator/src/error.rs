//! Error types for orchestrator operations.

use brain_core::BrainError;
use thiserror::Error;

/// Errors that abort a conversation run.
#[derive(Debug, Error)]
pub enum AgentError {
    /// The inbound text was empty.
    #[error("empty message from {0}")]
    EmptyMessage(String),

    /// The reasoning step failed.
    #[error("brain error: {0}")]
    Brain(#[from] BrainError),

    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Configuration(String),
}

/// Errors raised while decoding stored lead profiles.
#[derive(Debug, Error)]
pub enum ProfileError {
    /// A stored row could not be decoded.
    #[error("invalid stored profile for {user_id}: {reason}")]
    Decode { user_id: String, reason: String },
}
