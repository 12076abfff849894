//! Azure OpenAI brain implementation.
//!
//! This crate provides a [`brain_core::Brain`] backed by an Azure OpenAI
//! chat-completions deployment with function calling. A completion runs as
//! a loop: the model either answers or asks for tools, the tools run
//! through the supplied [`brain_core::ToolExecutor`], and their results go
//! back to the model, until it answers or the iteration budget runs out.
//!
//! # Features
//!
//! - Azure deployment addressing (`api-key` header, `api-version` query)
//! - Bounded tool-call loop with an explicit iteration-limit marker
//! - Whole-completion timeout
//! - Configurable via environment variables
//!
//! # Usage
//!
//! ```rust,no_run
//! use azure_brain::AzureBrain;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let brain = AzureBrain::from_env()?;
//!     // Hand the brain to the orchestrator...
//!     Ok(())
//! }
//! ```

mod api_types;
mod brain;
mod config;

pub use brain::AzureBrain;
pub use config::{AzureBrainConfig, AzureBrainConfigBuilder};

// Re-export brain-core types for convenience
pub use brain_core::{async_trait, Brain, BrainError, BrainRequest, BrainResponse, ToolExecutor};
