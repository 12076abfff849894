//! Tool execution support for Brain implementations.
//!
//! This module provides traits and types for executing tools that brains
//! can call mid-completion. Both tools exposed to the sales agent take a
//! single search query, so the input is modeled as one structured type,
//! [`QueryInput`], and the loose shapes models actually emit (a bare JSON
//! string or a `{"query": ...}` object) are adapted when the call is
//! decoded.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

/// Structured input shared by query-style tools.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawQueryInput")]
pub struct QueryInput {
    pub query: String,
}

impl QueryInput {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawQueryInput {
    Bare(String),
    Structured { query: String },
}

impl From<RawQueryInput> for QueryInput {
    fn from(raw: RawQueryInput) -> Self {
        match raw {
            RawQueryInput::Bare(query) | RawQueryInput::Structured { query } => Self { query },
        }
    }
}

/// Function-calling description of a tool, as advertised to the model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    /// JSON schema of the arguments object.
    pub parameters: Value,
}

impl ToolDefinition {
    /// Definition for a tool taking a single required `query` string.
    pub fn query_tool(
        name: impl Into<String>,
        description: impl Into<String>,
        query_description: &str,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: json!({
                "type": "object",
                "properties": {
                    "query": {
                        "type": "string",
                        "description": query_description
                    }
                },
                "required": ["query"]
            }),
        }
    }
}

/// Result of a tool execution.
#[derive(Debug, Clone)]
pub struct ToolResult {
    /// The tool call ID this result corresponds to.
    pub tool_call_id: String,
    /// The result content (will be sent back to the model).
    pub content: String,
    /// Whether the tool execution succeeded.
    pub success: bool,
}

impl ToolResult {
    /// Create a successful tool result.
    pub fn success(tool_call_id: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            content: content.into(),
            success: true,
        }
    }

    /// Create a failed tool result.
    pub fn error(tool_call_id: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            tool_call_id: tool_call_id.into(),
            content: format!("Error: {}", error.into()),
            success: false,
        }
    }
}

/// A request to execute a tool.
#[derive(Debug, Clone)]
pub struct ToolRequest {
    /// Unique ID for this tool call.
    pub id: String,
    /// Name of the tool to execute.
    pub name: String,
    /// Decoded tool input.
    pub input: QueryInput,
}

impl ToolRequest {
    /// Decode a model tool call.
    ///
    /// `arguments` may be a JSON object with a `query` field, a JSON
    /// string, or (as some models emit) plain unquoted text.
    pub fn from_call(
        id: impl Into<String>,
        name: impl Into<String>,
        arguments: &str,
    ) -> Result<Self, serde_json::Error> {
        let input = match serde_json::from_str::<QueryInput>(arguments) {
            Ok(input) => input,
            Err(err) => {
                let trimmed = arguments.trim();
                if trimmed.is_empty() || trimmed.starts_with('{') || trimmed.starts_with('"') {
                    return Err(err);
                }
                QueryInput::new(trimmed)
            }
        };

        Ok(Self {
            id: id.into(),
            name: name.into(),
            input,
        })
    }

    /// Build a request from an already decoded input.
    pub fn new(id: impl Into<String>, name: impl Into<String>, input: QueryInput) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            input,
        }
    }
}

/// Trait for executing tools called by a Brain.
///
/// Implement this trait to provide external capabilities to a brain. The
/// brain advertises [`ToolExecutor::definitions`] to the model and routes
/// every call the model makes through [`ToolExecutor::execute`].
///
/// Tool failures are reported as content, never as errors: the model
/// receives an explicit message it can react to.
#[async_trait]
pub trait ToolExecutor: Send + Sync {
    /// Execute a tool and return the result.
    async fn execute(&self, request: ToolRequest) -> ToolResult;

    /// Definitions of every tool this executor supports.
    fn definitions(&self) -> Vec<ToolDefinition>;

    /// Names of the supported tools.
    fn supported_tools(&self) -> Vec<String> {
        self.definitions().into_iter().map(|d| d.name).collect()
    }
}
