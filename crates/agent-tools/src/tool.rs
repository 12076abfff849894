//! Tool trait definition and types.

use async_trait::async_trait;
use brain_core::{QueryInput, ToolDefinition};
use serde::{Deserialize, Serialize};

use crate::error::ToolError;

/// Output from a tool execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolOutput {
    /// The result content, sent back to the model verbatim.
    pub content: String,
    /// Whether the execution was successful.
    pub success: bool,
}

impl ToolOutput {
    /// Create a successful output.
    pub fn success(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            success: true,
        }
    }

    /// Create a failed output.
    ///
    /// Failed outputs still carry text the model can read.
    pub fn failure(content: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            success: false,
        }
    }
}

/// Trait for query-style tools the model can call.
///
/// Tools take a single [`QueryInput`]; whatever shape the model used for
/// the call has already been adapted by the time `execute` runs.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The tool's unique name (used for dispatch).
    fn name(&self) -> &str;

    /// Description shown to the model.
    fn description(&self) -> &str;

    /// Description of the `query` argument.
    fn query_description(&self) -> &str {
        "A consulta de busca"
    }

    /// Function-calling definition advertised to the model.
    fn definition(&self) -> ToolDefinition {
        ToolDefinition::query_tool(self.name(), self.description(), self.query_description())
    }

    /// Execute the tool.
    async fn execute(&self, input: QueryInput) -> Result<ToolOutput, ToolError>;
}
