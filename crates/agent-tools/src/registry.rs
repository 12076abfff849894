//! Tool registry for managing and executing tools.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use brain_core::{QueryInput, ToolDefinition, ToolExecutor, ToolRequest, ToolResult};
use indexmap::IndexMap;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::error::ToolError;
use crate::tool::{Tool, ToolOutput};

/// Registry for managing tools.
///
/// The registry holds the tools exposed to the model, in registration
/// order, and dispatches calls to them by name. It implements
/// [`ToolExecutor`] so it can be handed straight to a brain.
pub struct ToolRegistry {
    /// Registered tools by name.
    tools: IndexMap<String, Arc<dyn Tool>>,
    /// Per-call time budget.
    timeout: Option<Duration>,
}

impl ToolRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self {
            tools: IndexMap::new(),
            timeout: None,
        }
    }

    /// Bound every tool call to `timeout`.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Register a tool.
    ///
    /// If a tool with the same name already exists, it will be replaced.
    pub fn register<T: Tool + 'static>(&mut self, tool: T) {
        self.register_arc(Arc::new(tool));
    }

    /// Register a shared tool.
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) {
        let name = tool.name().to_string();
        info!("Registering tool: {}", name);
        self.tools.insert(name, tool);
    }

    /// Get a list of registered tool names.
    pub fn list_tools(&self) -> Vec<&str> {
        self.tools.keys().map(|s| s.as_str()).collect()
    }

    /// Check if a tool is registered.
    pub fn has_tool(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Execute a tool by name.
    pub async fn run(&self, name: &str, input: QueryInput) -> Result<ToolOutput, ToolError> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| ToolError::NotFound(name.to_string()))?;

        debug!("Executing tool '{}' with query '{}'", name, input.query);

        let result = match self.timeout {
            Some(limit) => timeout(limit, tool.execute(input))
                .await
                .map_err(|_| ToolError::Timeout(limit))??,
            None => tool.execute(input).await?,
        };

        debug!(
            "Tool '{}' completed: success={}, content_len={}",
            name,
            result.success,
            result.content.len()
        );

        Ok(result)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolExecutor for ToolRegistry {
    async fn execute(&self, request: ToolRequest) -> ToolResult {
        match self.run(&request.name, request.input).await {
            Ok(output) if output.success => ToolResult::success(request.id, output.content),
            Ok(output) => ToolResult {
                tool_call_id: request.id,
                content: output.content,
                success: false,
            },
            Err(e) => {
                warn!("Tool '{}' failed: {}", request.name, e);
                ToolResult::error(request.id, e.to_string())
            }
        }
    }

    fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools.values().map(|tool| tool.definition()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct EchoTool;

    #[async_trait]
    impl Tool for EchoTool {
        fn name(&self) -> &str {
            "echo"
        }

        fn description(&self) -> &str {
            "Echoes back the query"
        }

        async fn execute(&self, input: QueryInput) -> Result<ToolOutput, ToolError> {
            Ok(ToolOutput::success(input.query))
        }
    }

    struct SlowTool;

    #[async_trait]
    impl Tool for SlowTool {
        fn name(&self) -> &str {
            "slow"
        }

        fn description(&self) -> &str {
            "Never answers in time"
        }

        async fn execute(&self, _input: QueryInput) -> Result<ToolOutput, ToolError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(ToolOutput::success("late"))
        }
    }

    #[tokio::test]
    async fn test_registry_basic() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        assert!(registry.has_tool("echo"));
        assert!(!registry.has_tool("nonexistent"));
        assert_eq!(registry.list_tools(), vec!["echo"]);
        assert_eq!(registry.supported_tools(), vec!["echo".to_string()]);
    }

    #[tokio::test]
    async fn test_registry_run() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let result = registry.run("echo", QueryInput::new("hello")).await.unwrap();
        assert!(result.success);
        assert_eq!(result.content, "hello");
    }

    #[tokio::test]
    async fn test_registry_not_found() {
        let registry = ToolRegistry::new();
        let result = registry.run("nonexistent", QueryInput::new("x")).await;
        assert!(matches!(result, Err(ToolError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_executor_accepts_bare_string_call() {
        let mut registry = ToolRegistry::new();
        registry.register(EchoTool);

        let request = ToolRequest::from_call("call-1", "echo", r#""edital PF""#).unwrap();
        let result = ToolExecutor::execute(&registry, request).await;
        assert!(result.success);
        assert_eq!(result.tool_call_id, "call-1");
        assert_eq!(result.content, "edital PF");
    }

    #[tokio::test]
    async fn test_executor_reports_unknown_tool() {
        let registry = ToolRegistry::new();
        let request = ToolRequest::new("call-2", "missing", QueryInput::new("x"));

        let result = ToolExecutor::execute(&registry, request).await;
        assert!(!result.success);
        assert_eq!(result.content, "Error: Tool not found: missing");
    }

    #[tokio::test(start_paused = true)]
    async fn test_executor_timeout() {
        let mut registry = ToolRegistry::new().with_timeout(Duration::from_secs(5));
        registry.register(SlowTool);

        let request = ToolRequest::new("call-3", "slow", QueryInput::new("x"));
        let result = ToolExecutor::execute(&registry, request).await;
        assert!(!result.success);
        assert!(result.content.contains("timed out"));
    }

    #[test]
    fn test_definitions_in_registration_order() {
        let mut registry = ToolRegistry::new();
        registry.register(SlowTool);
        registry.register(EchoTool);

        let names: Vec<_> = registry.definitions().into_iter().map(|d| d.name).collect();
        assert_eq!(names, vec!["slow", "echo"]);
    }
}
