//! Configuration loaded from environment variables.

use std::env;
use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use agent_tools::{EmbeddingsConfig, SerpApiConfig, SupabaseConfig, DEFAULT_TOP_K};
use azure_brain::AzureBrainConfig;
use instagram_client::config::{DEFAULT_API_VERSION, DEFAULT_BASE_URL};
use instagram_client::{GraphConfig, RetryPolicy};
use orchestrator::AgentConfig;

/// Settings without which the service cannot start.
pub const REQUIRED_VARIABLES: [&str; 8] = [
    "INSTAGRAM_ACCESS_TOKEN",
    "INSTAGRAM_APP_SECRET",
    "INSTAGRAM_VERIFY_TOKEN",
    "AZURE_OPENAI_API_KEY",
    "AZURE_OPENAI_ENDPOINT",
    "SUPABASE_URL",
    "SUPABASE_SERVICE_KEY",
    "SERPAPI_API_KEY",
];

/// Default embeddings deployment.
pub const DEFAULT_EMBEDDINGS_DEPLOYMENT: &str = "text_embedding_ada_002_azure_open_ai";

/// Default embeddings API version.
pub const DEFAULT_EMBEDDINGS_API_VERSION: &str = "2024-02-15-preview";

/// Webhook server configuration.
#[derive(Clone)]
pub struct Config {
    /// Deployment environment (`development`, `production`, ...).
    pub environment: String,
    /// Server bind address.
    pub addr: SocketAddr,
    /// SQLite database URL.
    pub database_url: String,
    /// Run migrations at startup.
    pub migrate: bool,
    /// Accept webhooks without a signature header (ignored in production).
    pub allow_unsigned: bool,
    /// Token echoed back during webhook verification.
    pub verify_token: String,
    /// App secret keying webhook signatures.
    pub app_secret: String,
    pub graph: GraphConfig,
    pub retry: RetryPolicy,
    pub azure: AzureBrainConfig,
    pub embeddings: EmbeddingsConfig,
    pub supabase: SupabaseConfig,
    pub serpapi: SerpApiConfig,
    /// Passages returned by knowledge retrieval.
    pub retrieval_top_k: usize,
    pub agent: AgentConfig,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("environment", &self.environment)
            .field("addr", &self.addr)
            .field("database_url", &self.database_url)
            .field("migrate", &self.migrate)
            .field("allow_unsigned", &self.allow_unsigned)
            .field("verify_token", &"[redacted]")
            .field("app_secret", &"[redacted]")
            .field("graph", &self.graph)
            .field("retry", &self.retry)
            .field("azure", &self.azure)
            .field("embeddings", &self.embeddings)
            .field("supabase", &self.supabase)
            .field("serpapi", &self.serpapi)
            .field("retrieval_top_k", &self.retrieval_top_k)
            .finish_non_exhaustive()
    }
}

fn var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parsed<T: std::str::FromStr>(key: &str, default: T) -> T {
    var(key).and_then(|v| v.parse().ok()).unwrap_or(default)
}

fn flag(key: &str, default: bool) -> bool {
    match var(key).map(|v| v.to_ascii_lowercase()) {
        Some(v) => matches!(v.as_str(), "1" | "true" | "yes" | "on"),
        None => default,
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// | Variable | Description | Default |
    /// |----------|-------------|---------|
    /// | `APP_ENV` | Deployment environment | `development` |
    /// | `SERVER_ADDR` | Server bind address | `0.0.0.0:3000` |
    /// | `SQLITE_PATH` | SQLite database URL | `sqlite:leads.db?mode=rwc` |
    /// | `LEAD_DB_MIGRATE` | Run migrations at startup | `true` |
    /// | `WEBHOOK_ALLOW_UNSIGNED` | Skip signatures when no header is sent | `false` |
    /// | `INSTAGRAM_API_BASE_URL` | Graph API host | `https://graph.instagram.com` |
    /// | `INSTAGRAM_API_VERSION` | Graph API version | `v23.0` |
    /// | `INSTAGRAM_SEND_TIMEOUT_SECS` | Send timeout | `10` |
    /// | `DELIVERY_MAX_ATTEMPTS` | Send attempts | `3` |
    /// | `DELIVERY_FAIL_FAST` | Stop retrying on 400/401/403 | `false` |
    /// | `AZURE_OPENAI_EMBEDDINGS_*` | Embeddings endpoint, key, deployment, version | chat endpoint and key |
    /// | `AGENT_RETRIEVAL_TOP_K` | Retrieved passages | `20` |
    ///
    /// Every name in [`REQUIRED_VARIABLES`] must be set; all missing ones are
    /// reported together.
    pub fn from_env() -> Result<Self, ConfigError> {
        let missing: Vec<String> = REQUIRED_VARIABLES
            .iter()
            .filter(|key| var(key).is_none())
            .map(|key| key.to_string())
            .collect();
        if !missing.is_empty() {
            return Err(ConfigError::MissingVariables(missing));
        }
        let required = |key: &str| var(key).unwrap_or_default();

        let addr_value = var("SERVER_ADDR").unwrap_or_else(|| "0.0.0.0:3000".to_string());
        let addr = addr_value.parse().map_err(|_| ConfigError::Invalid {
            name: "SERVER_ADDR".to_string(),
            reason: format!("not a socket address: {}", addr_value),
        })?;

        let graph = GraphConfig::new(required("INSTAGRAM_ACCESS_TOKEN"))
            .with_base_url(var("INSTAGRAM_API_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()))
            .with_api_version(var("INSTAGRAM_API_VERSION").unwrap_or_else(|| DEFAULT_API_VERSION.to_string()))
            .with_send_timeout(Duration::from_secs(parsed("INSTAGRAM_SEND_TIMEOUT_SECS", 10)));

        let retry = RetryPolicy {
            max_attempts: parsed("DELIVERY_MAX_ATTEMPTS", 3),
            fail_fast: flag("DELIVERY_FAIL_FAST", false),
            ..RetryPolicy::default()
        };

        let azure = AzureBrainConfig::from_env().map_err(|e| ConfigError::Invalid {
            name: "AZURE_OPENAI".to_string(),
            reason: e.to_string(),
        })?;

        let embeddings = EmbeddingsConfig {
            endpoint: var("AZURE_OPENAI_EMBEDDINGS_ENDPOINT")
                .map(|e| e.trim_end_matches('/').to_string())
                .unwrap_or_else(|| azure.endpoint.clone()),
            api_key: var("AZURE_OPENAI_EMBEDDINGS_API_KEY")
                .unwrap_or_else(|| azure.api_key.clone()),
            deployment: var("AZURE_OPENAI_EMBEDDINGS_DEPLOYMENT_NAME")
                .unwrap_or_else(|| DEFAULT_EMBEDDINGS_DEPLOYMENT.to_string()),
            api_version: var("AZURE_OPENAI_EMBEDDINGS_API_VERSION")
                .unwrap_or_else(|| DEFAULT_EMBEDDINGS_API_VERSION.to_string()),
        };

        let agent = AgentConfig::from_env().map_err(|e| ConfigError::Invalid {
            name: "AGENT_PROMPT_FILE".to_string(),
            reason: e.to_string(),
        })?;

        Ok(Self {
            environment: var("APP_ENV")
                .unwrap_or_else(|| "development".to_string())
                .to_ascii_lowercase(),
            addr,
            database_url: var("SQLITE_PATH")
                .unwrap_or_else(|| "sqlite:leads.db?mode=rwc".to_string()),
            migrate: flag("LEAD_DB_MIGRATE", true),
            allow_unsigned: flag("WEBHOOK_ALLOW_UNSIGNED", false),
            verify_token: required("INSTAGRAM_VERIFY_TOKEN"),
            app_secret: required("INSTAGRAM_APP_SECRET"),
            graph,
            retry,
            azure,
            embeddings,
            supabase: SupabaseConfig::new(required("SUPABASE_URL"), required("SUPABASE_SERVICE_KEY")),
            serpapi: SerpApiConfig::new(required("SERPAPI_API_KEY")),
            retrieval_top_k: parsed("AGENT_RETRIEVAL_TOP_K", DEFAULT_TOP_K),
            agent,
        })
    }

    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// Whether unsigned webhooks are let through.
    pub fn unsigned_allowed(&self) -> bool {
        self.allow_unsigned && !self.is_production()
    }
}

/// Configuration errors.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required environment variables: {}", .0.join(", "))]
    MissingVariables(Vec<String>),

    #[error("invalid {name}: {reason}")]
    Invalid { name: String, reason: String },
}
