//! The Brain trait definition.

use async_trait::async_trait;

use crate::error::BrainError;
use crate::history::SessionTurn;
use crate::tools::ToolExecutor;

/// Text a brain returns when it ran out of tool-call iterations before the
/// model produced a final answer.
pub const ITERATION_LIMIT_MARKER: &str = "Agent stopped due to max iterations.";

/// Everything a brain needs for one completion.
#[derive(Debug, Clone, Default)]
pub struct BrainRequest {
    /// System messages, in order (persona, format instructions, lead context).
    pub system: Vec<String>,
    /// Prior session turns, oldest first.
    pub history: Vec<SessionTurn>,
    /// The new user message.
    pub input: String,
    /// Maximum number of model round trips, tool calls included.
    pub max_iterations: usize,
}

/// Final text of a completion plus bookkeeping about how it was reached.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BrainResponse {
    pub text: String,
    /// Number of model round trips used.
    pub iterations: usize,
    /// Names of the tools invoked, in call order.
    pub tool_calls: Vec<String>,
}

impl BrainResponse {
    /// A single-iteration response with no tool calls.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            iterations: 1,
            tool_calls: Vec::new(),
        }
    }

    /// Whether the brain gave up after exhausting its iteration budget.
    pub fn hit_iteration_limit(&self) -> bool {
        self.text.contains(ITERATION_LIMIT_MARKER)
    }
}

/// A language-model backend able to run a tool-augmented completion.
///
/// This trait is object-safe and can be used with `Arc<dyn Brain>`.
#[async_trait]
pub trait Brain: Send + Sync {
    /// Run one completion, calling tools through `tools` as the model asks.
    ///
    /// Implementations must stop after `request.max_iterations` round trips
    /// and return [`ITERATION_LIMIT_MARKER`] as the text in that case.
    async fn complete(
        &self,
        request: BrainRequest,
        tools: &dyn ToolExecutor,
    ) -> Result<BrainResponse, BrainError>;

    /// Get a human-readable name for this brain implementation.
    fn name(&self) -> &str;

    /// Check if the brain is ready to process messages.
    ///
    /// Default implementation always returns true.
    async fn is_ready(&self) -> bool {
        true
    }
}
