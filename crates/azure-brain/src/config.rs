//! Configuration for AzureBrain.

use brain_core::BrainError;
use std::env;
use std::fmt;
use std::time::Duration;

/// Default chat deployment name.
pub const DEFAULT_DEPLOYMENT: &str = "gpt-4o";

/// Default Azure OpenAI API version.
pub const DEFAULT_API_VERSION: &str = "2024-02-15-preview";

/// Configuration for AzureBrain.
#[derive(Clone)]
pub struct AzureBrainConfig {
    /// Resource endpoint (e.g., "https://forefy.openai.azure.com").
    pub endpoint: String,

    /// API key for authentication.
    pub api_key: String,

    /// Chat deployment name.
    pub deployment: String,

    /// API version query parameter.
    pub api_version: String,

    /// Maximum tokens for response.
    pub max_tokens: Option<u32>,

    /// Temperature for generation (0.0 - 2.0).
    pub temperature: Option<f32>,

    /// Time budget for a whole completion, tool calls included.
    pub timeout: Duration,
}

impl Default for AzureBrainConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            api_key: String::new(),
            deployment: DEFAULT_DEPLOYMENT.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            max_tokens: Some(500),
            temperature: Some(0.7),
            timeout: Duration::from_secs(30),
        }
    }
}

impl fmt::Debug for AzureBrainConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AzureBrainConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[redacted]")
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .field("max_tokens", &self.max_tokens)
            .field("temperature", &self.temperature)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl AzureBrainConfig {
    /// Create configuration from environment variables.
    ///
    /// Required environment variables:
    /// - `AZURE_OPENAI_API_KEY` - API key for authentication
    /// - `AZURE_OPENAI_ENDPOINT` - Resource endpoint
    ///
    /// Optional environment variables:
    /// - `AZURE_OPENAI_DEPLOYMENT_NAME` - Chat deployment (default: gpt-4o)
    /// - `AZURE_OPENAI_API_VERSION` - API version (default: 2024-02-15-preview)
    /// - `AZURE_OPENAI_MAX_TOKENS` - Max tokens (default: 500)
    /// - `AZURE_OPENAI_TEMPERATURE` - Temperature (default: 0.7)
    /// - `AGENT_MODEL_TIMEOUT_SECS` - Completion timeout (default: 30)
    pub fn from_env() -> Result<Self, BrainError> {
        let api_key = env::var("AZURE_OPENAI_API_KEY")
            .map_err(|_| BrainError::Configuration("AZURE_OPENAI_API_KEY not set".to_string()))?;

        let endpoint = env::var("AZURE_OPENAI_ENDPOINT")
            .map_err(|_| BrainError::Configuration("AZURE_OPENAI_ENDPOINT not set".to_string()))?;

        let deployment = env::var("AZURE_OPENAI_DEPLOYMENT_NAME")
            .unwrap_or_else(|_| DEFAULT_DEPLOYMENT.to_string());

        let api_version = env::var("AZURE_OPENAI_API_VERSION")
            .unwrap_or_else(|_| DEFAULT_API_VERSION.to_string());

        let max_tokens = env::var("AZURE_OPENAI_MAX_TOKENS")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(Some(500));

        let temperature = env::var("AZURE_OPENAI_TEMPERATURE")
            .ok()
            .and_then(|v| v.parse().ok())
            .or(Some(0.7));

        let timeout = env::var("AGENT_MODEL_TIMEOUT_SECS")
            .ok()
            .and_then(|v| v.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(Duration::from_secs(30));

        Ok(Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            api_key,
            deployment,
            api_version,
            max_tokens,
            temperature,
            timeout,
        })
    }

    /// Create a new config builder.
    pub fn builder() -> AzureBrainConfigBuilder {
        AzureBrainConfigBuilder::default()
    }

    /// Chat completions URL for the configured deployment.
    pub fn completions_url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/chat/completions?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        )
    }
}

/// Builder for AzureBrainConfig.
#[derive(Debug, Default)]
pub struct AzureBrainConfigBuilder {
    config: AzureBrainConfig,
}

impl AzureBrainConfigBuilder {
    /// Set the endpoint.
    pub fn endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.config.endpoint = endpoint.into();
        self
    }

    /// Set the API key.
    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.api_key = key.into();
        self
    }

    /// Set the deployment name.
    pub fn deployment(mut self, deployment: impl Into<String>) -> Self {
        self.config.deployment = deployment.into();
        self
    }

    /// Set the API version.
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.config.api_version = version.into();
        self
    }

    /// Set the max tokens.
    pub fn max_tokens(mut self, tokens: u32) -> Self {
        self.config.max_tokens = Some(tokens);
        self
    }

    /// Set the temperature.
    pub fn temperature(mut self, temp: f32) -> Self {
        self.config.temperature = Some(temp);
        self
    }

    /// Set the completion timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> AzureBrainConfig {
        self.config
    }
}
