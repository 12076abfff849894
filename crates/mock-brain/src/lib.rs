//! Mock brain implementations for exercising the sales agent.
//!
//! This crate provides implementations of the `Brain` trait for testing:
//! - `ScriptedBrain` - Replays a queue of canned replies, calling tools on request
//! - `DelayedBrain` - Wraps another brain with artificial delay
//!
//! For production processing, use the `azure-brain` crate instead.
//!
//! # Example
//!
//! ```rust
//! use mock_brain::{Brain, BrainRequest, Reply, ScriptedBrain};
//! # use mock_brain::{async_trait, ToolDefinition, ToolExecutor, ToolRequest, ToolResult};
//! # struct NoTools;
//! # #[async_trait]
//! # impl ToolExecutor for NoTools {
//! #     async fn execute(&self, r: ToolRequest) -> ToolResult { ToolResult::error(r.id, "none") }
//! #     fn definitions(&self) -> Vec<ToolDefinition> { Vec::new() }
//! # }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), mock_brain::BrainError> {
//!     let brain = ScriptedBrain::new(vec![Reply::text("Fala! Qual concurso você mira?")]);
//!
//!     let response = brain.complete(BrainRequest::default(), &NoTools).await?;
//!     println!("Response: {}", response.text);
//!     Ok(())
//! }
//! ```

mod delayed;
mod scripted;

// Re-export brain-core types for convenience
pub use brain_core::{
    async_trait, Brain, BrainError, BrainRequest, BrainResponse, ToolDefinition, ToolExecutor,
    ToolRequest, ToolResult,
};

// Export mock implementations
pub use delayed::DelayedBrain;
pub use scripted::{Reply, ScriptedBrain};
