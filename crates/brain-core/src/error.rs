//! Error types for brain operations.

use thiserror::Error;

/// Errors that can occur while a brain produces a completion.
#[derive(Debug, Error)]
pub enum BrainError {
    /// Invalid or missing configuration.
    #[error("configuration error: {0}")]
    Configuration(String),

    /// The model endpoint could not be reached or returned an error status.
    #[error("network error: {0}")]
    Network(String),

    /// The completion could not be produced.
    #[error("processing failed: {0}")]
    ProcessingFailed(String),

    /// The model call exceeded its time budget.
    #[error("processing timed out")]
    Timeout,

    /// The model produced output the brain could not interpret.
    ///
    /// `partial` carries whatever text was produced before the failure so
    /// the caller can keep going with it.
    #[error("output parsing failed: {reason}")]
    OutputParsing { reason: String, partial: String },
}
