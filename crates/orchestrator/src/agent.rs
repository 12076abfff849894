//! The conversation agent.

use std::sync::Arc;

use brain_core::{
    prompt::short_hash, AgentOutput, Brain, BrainError, InboundMessage, SessionMemory,
    ToolExecutor,
};
use tokio::time::timeout;
use tracing::{debug, info, warn};

use crate::config::AgentConfig;
use crate::context::PromptContext;
use crate::error::AgentError;
use crate::extract::{SignalExtractor, Signals};
use crate::output::{truncate_chars, ParsedOutput};
use crate::profile::{LeadProfile, LeadProfileStore, LeadUpdate};
use crate::prompt::format_instructions;

/// Runs one inbound message through the sales pipeline.
///
/// Each call walks the same states: fetch the lead profile, build the
/// prompt context, invoke the model, parse its output and update the
/// profile. Model timeouts and malformed output degrade to a default
/// reply; any other model failure aborts the run so no reply is sent.
pub struct Agent {
    brain: Arc<dyn Brain>,
    tools: Arc<dyn ToolExecutor>,
    sessions: SessionMemory,
    profiles: LeadProfileStore,
    extractor: SignalExtractor,
    instructions: String,
    config: AgentConfig,
}

impl Agent {
    /// Create an agent over a brain, its tools and a profile store.
    pub fn new(
        brain: Arc<dyn Brain>,
        tools: Arc<dyn ToolExecutor>,
        profiles: LeadProfileStore,
        config: AgentConfig,
    ) -> Self {
        let instructions = format_instructions(config.max_response_words, &tools.definitions());

        info!(
            "Agent ready (brain: {}, prompt: {}, tools: {:?})",
            brain.name(),
            short_hash(&config.system_prompt),
            tools.supported_tools()
        );

        Self {
            brain,
            tools,
            sessions: SessionMemory::with_limits(config.context_window, config.max_sessions),
            profiles,
            extractor: SignalExtractor::new(),
            instructions,
            config,
        }
    }

    /// Process a normalized inbound message.
    pub async fn process_message(&self, message: &InboundMessage) -> Result<AgentOutput, AgentError> {
        self.process(&message.sender_id, &message.text).await
    }

    /// Process one message from `user_id` and return the structured reply.
    pub async fn process(&self, user_id: &str, text: &str) -> Result<AgentOutput, AgentError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AgentError::EmptyMessage(user_id.to_string()));
        }

        info!("Processing message from {} ({} chars)", user_id, text.chars().count());

        let profile = self
            .profiles
            .get(user_id)
            .await
            .unwrap_or_else(|| LeadProfile::new(user_id));

        let history = self.sessions.get(user_id).await;
        let context = PromptContext::new(&profile, history, text);
        debug!(
            "Prompt context for {}: {} session turns\n{}",
            user_id,
            context.history_len(),
            context.lead_block()
        );
        let request = context.into_request(
            &self.config.system_prompt,
            &self.instructions,
            self.config.max_iterations,
        );

        let call = self.brain.complete(request, self.tools.as_ref());
        let parsed = match timeout(self.config.model_timeout, call).await {
            Ok(Ok(response)) => {
                debug!(
                    "Model answered {} in {} iteration(s), tools: {:?}",
                    user_id, response.iterations, response.tool_calls
                );
                ParsedOutput::parse(&response.text)
            }
            Ok(Err(BrainError::OutputParsing { reason, partial })) => {
                warn!("Model output for {} was malformed ({}), continuing", user_id, reason);
                ParsedOutput::parse(&partial)
            }
            Ok(Err(BrainError::Timeout)) | Err(_) => {
                warn!(
                    "Model call for {} exceeded {:?}, sending recovery reply",
                    user_id, self.config.model_timeout
                );
                ParsedOutput::recovery()
            }
            Ok(Err(e)) => return Err(e.into()),
        };

        info!(
            "Reply for {} via {} parse (stage: {}, vertical: {})",
            user_id,
            parsed.stage(),
            parsed.output().funnel_stage,
            parsed.output().identified_vertical
        );

        let synthesized = matches!(parsed, ParsedOutput::Default(_));
        let output = parsed.into_output();

        self.sessions
            .append_exchange(user_id, text, &output.response_message)
            .await;

        let signals = self.extractor.extract(text);
        let update = self.lead_update(text, signals, &output, synthesized);
        let merged = self.profiles.update(user_id, update).await;
        debug!(
            "Lead {} now at {} after {} message(s)",
            user_id, merged.funnel_stage, merged.total_messages
        );

        Ok(output)
    }

    /// Profile fields derived from one turn.
    ///
    /// A synthesized default output carries no stage or vertical.
    fn lead_update(
        &self,
        text: &str,
        signals: Signals,
        output: &AgentOutput,
        synthesized: bool,
    ) -> LeadUpdate {
        let vertical = output.identified_vertical;

        LeadUpdate {
            name: signals.name,
            topic_of_interest: signals.topic,
            category: signals.category,
            vertical: (!synthesized && vertical.is_known()).then_some(vertical),
            funnel_stage: (!synthesized).then_some(output.funnel_stage),
            objection: signals.objection,
            last_topic: Some(truncate_chars(text, self.config.last_topic_chars)),
            question: signals.is_question.then(|| text.to_string()),
            sentiment: signals.sentiment,
            ..LeadUpdate::default()
        }
    }

    /// Forget a user's session turns. The lead profile is kept.
    pub async fn clear_memory(&self, user_id: &str) {
        self.sessions.clear(user_id).await;
        info!("Cleared session memory for {}", user_id);
    }

    pub fn sessions(&self) -> &SessionMemory {
        &self.sessions
    }

    pub fn profiles(&self) -> &LeadProfileStore {
        &self.profiles
    }

    pub fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Name of the underlying brain.
    pub fn brain_name(&self) -> &str {
        self.brain.name()
    }

    /// Whether the underlying brain can take requests.
    pub async fn is_ready(&self) -> bool {
        self.brain.is_ready().await
    }
}
