//! AzureBrain implementation using an Azure OpenAI deployment.

use brain_core::{
    async_trait, prompt::hash_prompt, Brain, BrainError, BrainRequest, BrainResponse,
    ToolExecutor, ToolRequest, ToolResult, TurnRole, ITERATION_LIMIT_MARKER,
};
use reqwest::Client;
use tracing::{debug, info, warn};

use crate::api_types::{
    ApiError, ApiTool, ChatCompletionRequest, ChatCompletionResponse, ChatMessage, Choice,
};
use crate::config::AzureBrainConfig;

/// A brain implementation backed by an Azure OpenAI chat deployment.
///
/// Each completion is a bounded function-calling loop. Tools are advertised
/// from the [`ToolExecutor`] passed to [`Brain::complete`], and the whole
/// loop is bounded by the configured timeout.
pub struct AzureBrain {
    client: Client,
    config: AzureBrainConfig,
}

impl AzureBrain {
    /// Create a new AzureBrain with the given configuration.
    pub fn new(config: AzureBrainConfig) -> Result<Self, BrainError> {
        if config.endpoint.is_empty() {
            return Err(BrainError::Configuration("endpoint is empty".to_string()));
        }

        let client = Client::builder()
            .build()
            .map_err(|e| BrainError::Configuration(format!("Failed to create HTTP client: {}", e)))?;

        info!(
            "AzureBrain initialized with deployment: {}, api-version: {}",
            config.deployment, config.api_version
        );

        Ok(Self { client, config })
    }

    /// Create an AzureBrain from environment variables.
    ///
    /// See [`AzureBrainConfig::from_env`] for required environment variables.
    pub fn from_env() -> Result<Self, BrainError> {
        Self::new(AzureBrainConfig::from_env()?)
    }

    /// Get the configuration.
    pub fn config(&self) -> &AzureBrainConfig {
        &self.config
    }

    /// Build the initial messages array for a request.
    fn build_messages(request: &BrainRequest) -> Vec<ChatMessage> {
        let mut messages = Vec::with_capacity(request.system.len() + request.history.len() + 1);

        for system in &request.system {
            messages.push(ChatMessage::system(system.clone()));
        }

        for turn in &request.history {
            messages.push(match turn.role {
                TurnRole::User => ChatMessage::user(turn.content.clone()),
                TurnRole::Assistant => ChatMessage::assistant(turn.content.clone()),
            });
        }

        messages.push(ChatMessage::user(request.input.clone()));
        messages
    }

    /// Make one chat completion round trip.
    async fn chat_completion(
        &self,
        messages: &[ChatMessage],
        tools: Option<Vec<ApiTool>>,
    ) -> Result<Choice, BrainError> {
        let tool_choice = tools.as_ref().map(|_| "auto");
        let request = ChatCompletionRequest {
            messages: messages.to_vec(),
            max_tokens: self.config.max_tokens,
            temperature: self.config.temperature,
            tools,
            tool_choice,
        };

        debug!("Sending {} messages to Azure OpenAI", request.messages.len());

        let response = self
            .client
            .post(self.config.completions_url())
            .header("api-key", &self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| BrainError::Network(format!("Failed to send request: {}", e)))?;

        let status = response.status();

        if !status.is_success() {
            let error_text = response.text().await.unwrap_or_default();

            // Try to parse as API error
            let detail = serde_json::from_str::<ApiError>(&error_text)
                .map(|api_error| api_error.error.message)
                .unwrap_or(error_text);

            let message = format!("API error ({}): {}", status.as_u16(), detail);
            return Err(if status.is_server_error() {
                BrainError::Network(message)
            } else {
                BrainError::ProcessingFailed(message)
            });
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| BrainError::ProcessingFailed(format!("Failed to parse response: {}", e)))?;

        if let Some(usage) = &completion.usage {
            debug!(
                "Azure OpenAI usage: prompt={}, completion={}, total={}",
                usage.prompt_tokens, usage.completion_tokens, usage.total_tokens
            );
        }

        completion
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| BrainError::ProcessingFailed("Response had no choices".to_string()))
    }

    /// Run the function-calling loop until the model answers or the
    /// iteration budget runs out.
    async fn run(
        &self,
        request: BrainRequest,
        tools: &dyn ToolExecutor,
    ) -> Result<BrainResponse, BrainError> {
        let max_iterations = request.max_iterations.max(1);
        let definitions = tools.definitions();
        let api_tools: Option<Vec<ApiTool>> = if definitions.is_empty() {
            None
        } else {
            Some(definitions.into_iter().map(ApiTool::from).collect())
        };

        let mut messages = Self::build_messages(&request);
        let mut called = Vec::new();

        for iteration in 1..=max_iterations {
            let choice = self.chat_completion(&messages, api_tools.clone()).await?;
            let finish_reason = choice.finish_reason.unwrap_or_default();
            let message = choice.message;

            let calls = message.tool_calls.clone().unwrap_or_default();
            if calls.is_empty() {
                let text = message.content.unwrap_or_default();
                if finish_reason == "length" {
                    return Err(BrainError::OutputParsing {
                        reason: "response truncated at max_tokens".to_string(),
                        partial: text,
                    });
                }
                if text.trim().is_empty() {
                    return Err(BrainError::OutputParsing {
                        reason: "empty response".to_string(),
                        partial: text,
                    });
                }

                info!(
                    "Completion finished after {} iteration(s), tools: {:?}",
                    iteration, called
                );
                return Ok(BrainResponse {
                    text,
                    iterations: iteration,
                    tool_calls: called,
                });
            }

            messages.push(message);

            for call in calls {
                info!("Model requested tool '{}'", call.function.name);
                called.push(call.function.name.clone());

                let result =
                    match ToolRequest::from_call(&call.id, &call.function.name, &call.function.arguments) {
                        Ok(tool_request) => tools.execute(tool_request).await,
                        Err(e) => {
                            warn!("Invalid arguments for tool '{}': {}", call.function.name, e);
                            ToolResult::error(call.id.clone(), format!("invalid arguments: {}", e))
                        }
                    };

                messages.push(ChatMessage::tool(result.tool_call_id, result.content));
            }
        }

        warn!("Completion stopped after {} iterations", max_iterations);
        Ok(BrainResponse {
            text: ITERATION_LIMIT_MARKER.to_string(),
            iterations: max_iterations,
            tool_calls: called,
        })
    }
}

#[async_trait]
impl Brain for AzureBrain {
    async fn complete(
        &self,
        request: BrainRequest,
        tools: &dyn ToolExecutor,
    ) -> Result<BrainResponse, BrainError> {
        if let Some(persona) = request.system.first() {
            debug!("System prompt fingerprint: {}", hash_prompt(persona));
        }

        tokio::time::timeout(self.config.timeout, self.run(request, tools))
            .await
            .map_err(|_| {
                warn!("Completion exceeded {:?}", self.config.timeout);
                BrainError::Timeout
            })?
    }

    fn name(&self) -> &str {
        "AzureBrain"
    }

    async fn is_ready(&self) -> bool {
        !self.config.api_key.is_empty()
    }
}
