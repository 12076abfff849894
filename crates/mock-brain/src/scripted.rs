//! Scripted brain implementation - replays canned replies in order.

use std::collections::VecDeque;

use brain_core::{
    async_trait, Brain, BrainError, BrainRequest, BrainResponse, QueryInput, ToolExecutor,
    ToolRequest, ToolResult, ITERATION_LIMIT_MARKER,
};
use tokio::sync::Mutex;

/// One scripted completion.
#[derive(Debug)]
pub enum Reply {
    /// Answer with this text.
    Text(String),
    /// Call a tool with `query`, then answer with `text`.
    ToolThenText {
        tool: String,
        query: String,
        text: String,
    },
    /// Exhaust the iteration budget.
    IterationLimit,
    /// Fail with this error.
    Error(BrainError),
}

impl Reply {
    /// A plain text answer.
    pub fn text(text: impl Into<String>) -> Self {
        Reply::Text(text.into())
    }

    /// A tool call followed by a text answer.
    pub fn tool_then_text(
        tool: impl Into<String>,
        query: impl Into<String>,
        text: impl Into<String>,
    ) -> Self {
        Reply::ToolThenText {
            tool: tool.into(),
            query: query.into(),
            text: text.into(),
        }
    }

    /// A failed completion.
    pub fn error(error: BrainError) -> Self {
        Reply::Error(error)
    }
}

/// A brain that answers from a queue of [`Reply`] values.
///
/// Every request and tool result is recorded so tests can assert on what
/// the agent sent. Once the queue is empty every completion fails with
/// [`BrainError::ProcessingFailed`].
#[derive(Debug, Default)]
pub struct ScriptedBrain {
    replies: Mutex<VecDeque<Reply>>,
    requests: Mutex<Vec<BrainRequest>>,
    tool_results: Mutex<Vec<ToolResult>>,
}

impl ScriptedBrain {
    /// Create a brain that replays `replies` in order.
    pub fn new(replies: Vec<Reply>) -> Self {
        Self {
            replies: Mutex::new(replies.into()),
            ..Self::default()
        }
    }

    /// Queue another reply.
    pub async fn push(&self, reply: Reply) {
        self.replies.lock().await.push_back(reply);
    }

    /// Number of replies not yet consumed.
    pub async fn remaining(&self) -> usize {
        self.replies.lock().await.len()
    }

    /// Every request received so far, oldest first.
    pub async fn requests(&self) -> Vec<BrainRequest> {
        self.requests.lock().await.clone()
    }

    /// Every tool result observed so far, oldest first.
    pub async fn tool_results(&self) -> Vec<ToolResult> {
        self.tool_results.lock().await.clone()
    }
}

#[async_trait]
impl Brain for ScriptedBrain {
    async fn complete(
        &self,
        request: BrainRequest,
        tools: &dyn ToolExecutor,
    ) -> Result<BrainResponse, BrainError> {
        let max_iterations = request.max_iterations.max(1);
        self.requests.lock().await.push(request);

        let reply = self
            .replies
            .lock()
            .await
            .pop_front()
            .ok_or_else(|| BrainError::ProcessingFailed("script exhausted".to_string()))?;

        match reply {
            Reply::Text(text) => Ok(BrainResponse::text(text)),
            Reply::ToolThenText { tool, query, text } => {
                let call_id = format!("call-{}", self.tool_results.lock().await.len() + 1);
                let result = tools
                    .execute(ToolRequest::new(call_id, tool.clone(), QueryInput::new(query)))
                    .await;
                self.tool_results.lock().await.push(result);

                Ok(BrainResponse {
                    text,
                    iterations: 2,
                    tool_calls: vec![tool],
                })
            }
            Reply::IterationLimit => Ok(BrainResponse {
                text: ITERATION_LIMIT_MARKER.to_string(),
                iterations: max_iterations,
                tool_calls: Vec::new(),
            }),
            Reply::Error(error) => Err(error),
        }
    }

    fn name(&self) -> &str {
        "ScriptedBrain"
    }
}
