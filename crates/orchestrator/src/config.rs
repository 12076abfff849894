//! Configuration for the conversation agent.

use std::env;
use std::time::Duration;

use crate::error::AgentError;
use crate::prompt::{load_system_prompt, DEFAULT_SYSTEM_PROMPT};

/// Tunables of the conversation pipeline.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// Persona system prompt.
    pub system_prompt: String,

    /// Maximum model round trips per message.
    pub max_iterations: usize,

    /// Time budget for one model call.
    pub model_timeout: Duration,

    /// Reply length guidance given to the model.
    pub max_response_words: usize,

    /// Session turns kept per user.
    pub context_window: usize,

    /// Users tracked by session memory before LRU eviction.
    pub max_sessions: usize,

    /// Characters of the user message stored as the last topic.
    pub last_topic_chars: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.to_string(),
            max_iterations: 10,
            model_timeout: Duration::from_secs(30),
            max_response_words: 20,
            context_window: 10,
            max_sessions: 10_000,
            last_topic_chars: 100,
        }
    }
}

fn parsed<T: std::str::FromStr>(key: &str) -> Option<T> {
    env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

impl AgentConfig {
    /// Create configuration from environment variables.
    ///
    /// All variables are optional:
    /// - `AGENT_PROMPT_FILE` - Path of a system prompt override
    /// - `AGENT_MAX_ITERATIONS` - Model round trips (default: 10)
    /// - `AGENT_MODEL_TIMEOUT_SECS` - Model call timeout (default: 30)
    /// - `AGENT_MAX_RESPONSE_WORDS` - Reply length guidance (default: 20)
    /// - `AGENT_CONTEXT_WINDOW` - Session turns per user (default: 10)
    /// - `AGENT_MAX_SESSIONS` - Tracked users (default: 10000)
    ///
    /// Unparseable numbers fall back to their defaults. An unreadable prompt
    /// file is an error.
    pub fn from_env() -> Result<Self, AgentError> {
        let defaults = Self::default();

        let system_prompt = match env::var("AGENT_PROMPT_FILE") {
            Ok(path) if !path.trim().is_empty() => load_system_prompt(path.trim())?,
            _ => defaults.system_prompt,
        };

        Ok(Self {
            system_prompt,
            max_iterations: parsed("AGENT_MAX_ITERATIONS").unwrap_or(defaults.max_iterations),
            model_timeout: parsed("AGENT_MODEL_TIMEOUT_SECS")
                .map(Duration::from_secs)
                .unwrap_or(defaults.model_timeout),
            max_response_words: parsed("AGENT_MAX_RESPONSE_WORDS")
                .unwrap_or(defaults.max_response_words),
            context_window: parsed("AGENT_CONTEXT_WINDOW").unwrap_or(defaults.context_window),
            max_sessions: parsed("AGENT_MAX_SESSIONS").unwrap_or(defaults.max_sessions),
            last_topic_chars: defaults.last_topic_chars,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> AgentConfigBuilder {
        AgentConfigBuilder::default()
    }
}

/// Builder for AgentConfig.
#[derive(Debug, Default)]
pub struct AgentConfigBuilder {
    config: AgentConfig,
}

impl AgentConfigBuilder {
    /// Set the persona system prompt.
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    /// Set the maximum model round trips.
    pub fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    /// Set the model call timeout.
    pub fn model_timeout(mut self, timeout: Duration) -> Self {
        self.config.model_timeout = timeout;
        self
    }

    /// Set the reply length guidance.
    pub fn max_response_words(mut self, words: usize) -> Self {
        self.config.max_response_words = words;
        self
    }

    /// Set the session window.
    pub fn context_window(mut self, turns: usize) -> Self {
        self.config.context_window = turns;
        self
    }

    /// Set the tracked-user cap.
    pub fn max_sessions(mut self, users: usize) -> Self {
        self.config.max_sessions = users;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> AgentConfig {
        self.config
    }
}
