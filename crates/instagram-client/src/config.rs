//! Graph API connection settings.

use std::fmt;
use std::time::Duration;

/// Default Graph API host.
pub const DEFAULT_BASE_URL: &str = "https://graph.instagram.com";

/// Default Graph API version.
pub const DEFAULT_API_VERSION: &str = "v23.0";

/// Configuration for the Graph API client.
#[derive(Clone)]
pub struct GraphConfig {
    /// Base URL without trailing slash (e.g., "https://graph.instagram.com").
    pub base_url: String,
    /// API version path segment (e.g., "v23.0").
    pub api_version: String,
    /// Page or Instagram user access token.
    pub access_token: String,
    /// Timeout for message sends.
    pub send_timeout: Duration,
    /// Timeout for token validation.
    pub validate_timeout: Duration,
}

impl GraphConfig {
    /// Create a configuration with default host, version and timeouts.
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_version: DEFAULT_API_VERSION.to_string(),
            access_token: access_token.into(),
            send_timeout: Duration::from_secs(10),
            validate_timeout: Duration::from_secs(5),
        }
    }

    /// Override the base URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Override the API version.
    pub fn with_api_version(mut self, api_version: impl Into<String>) -> Self {
        self.api_version = api_version.into();
        self
    }

    /// Override the send timeout.
    pub fn with_send_timeout(mut self, timeout: Duration) -> Self {
        self.send_timeout = timeout;
        self
    }

    /// Get the messaging endpoint URL.
    pub fn messages_url(&self) -> String {
        format!("{}/{}/me/messages", self.base_url, self.api_version)
    }

    /// Get the token introspection endpoint URL.
    pub fn me_url(&self) -> String {
        format!("{}/{}/me", self.base_url, self.api_version)
    }
}

impl fmt::Debug for GraphConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GraphConfig")
            .field("base_url", &self.base_url)
            .field("api_version", &self.api_version)
            .field("access_token", &"[redacted]")
            .field("send_timeout", &self.send_timeout)
            .field("validate_timeout", &self.validate_timeout)
            .finish()
    }
}
