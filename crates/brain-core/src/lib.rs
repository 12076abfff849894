//! Core traits and types for the Instagram sales agent.
//!
//! This crate provides the shared vocabulary used by every other crate in
//! the workspace. It defines:
//!
//! - [`InboundMessage`] - A normalized direct message received from the platform
//! - [`AgentOutput`] / [`FunnelStage`] / [`Vertical`] - The structured agent reply
//! - [`SessionMemory`] - Bounded short-term conversation turns per user
//! - [`Brain`] - The trait implemented by language-model backends
//! - [`ToolExecutor`] - Trait for model-callable tools (knowledge retrieval, web search)
//! - [`BrainError`] - Error types for brain operations
//!
//! # Example
//!
//! ```rust
//! use brain_core::{async_trait, Brain, BrainError, BrainRequest, BrainResponse, ToolExecutor};
//!
//! struct FixedBrain;
//!
//! #[async_trait]
//! impl Brain for FixedBrain {
//!     async fn complete(
//!         &self,
//!         _request: BrainRequest,
//!         _tools: &dyn ToolExecutor,
//!     ) -> Result<BrainResponse, BrainError> {
//!         Ok(BrainResponse::text("Qual concurso você mira?"))
//!     }
//!
//!     fn name(&self) -> &str {
//!         "FixedBrain"
//!     }
//! }
//! ```

mod agent;
mod brain;
mod error;
mod history;
mod message;
pub mod prompt;
mod tools;

pub use agent::{AgentOutput, FunnelStage, Vertical};
pub use brain::{Brain, BrainRequest, BrainResponse, ITERATION_LIMIT_MARKER};
pub use error::BrainError;
pub use history::{SessionMemory, SessionTurn, TurnRole};
pub use message::InboundMessage;
pub use tools::{QueryInput, ToolDefinition, ToolExecutor, ToolRequest, ToolResult};

// Re-export async_trait for convenience
pub use async_trait::async_trait;
