//! Live web search through SerpAPI's Google engine.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use brain_core::QueryInput;
use serde::Deserialize;
use tracing::{info, warn};

use crate::error::ToolError;
use crate::tool::{Tool, ToolOutput};

/// Returned to the model when the search found nothing.
pub const NO_RESULTS: &str = "Nenhum resultado encontrado para esta busca.";

/// Returned to the model when the search itself failed.
pub const SEARCH_FAILED: &str = "Erro ao buscar informações. Tente novamente mais tarde.";

/// One organic search result.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SearchHit {
    pub title: String,
    pub link: String,
    #[serde(default)]
    pub snippet: String,
}

/// Backend able to run a web search.
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Up to `num_results` organic results.
    async fn search(&self, query: &str, num_results: usize) -> Result<Vec<SearchHit>, ToolError>;
}

/// SerpAPI settings.
#[derive(Clone)]
pub struct SerpApiConfig {
    pub api_key: String,
    pub base_url: String,
    /// Country (`gl`).
    pub country: String,
    /// Interface language (`hl`).
    pub language: String,
    pub google_domain: String,
    pub timeout: Duration,
}

impl SerpApiConfig {
    /// Brazilian Portuguese Google search with default endpoint and timeout.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://serpapi.com/search".to_string(),
            country: "br".to_string(),
            language: "pt".to_string(),
            google_domain: "google.com".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

impl fmt::Debug for SerpApiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SerpApiConfig")
            .field("api_key", &"[redacted]")
            .field("base_url", &self.base_url)
            .field("country", &self.country)
            .field("language", &self.language)
            .field("google_domain", &self.google_domain)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct SerpApiResponse {
    #[serde(default)]
    organic_results: Vec<SearchHit>,
}

/// [`WebSearch`] backed by SerpAPI.
pub struct SerpApi {
    http: reqwest::Client,
    config: SerpApiConfig,
}

impl SerpApi {
    pub fn new(config: SerpApiConfig) -> Result<Self, ToolError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }
}

#[async_trait]
impl WebSearch for SerpApi {
    async fn search(&self, query: &str, num_results: usize) -> Result<Vec<SearchHit>, ToolError> {
        let num = num_results.to_string();
        let response = self
            .http
            .get(&self.config.base_url)
            .query(&[
                ("q", query),
                ("api_key", self.config.api_key.as_str()),
                ("engine", "google"),
                ("gl", self.config.country.as_str()),
                ("hl", self.config.language.as_str()),
                ("google_domain", self.config.google_domain.as_str()),
                ("num", num.as_str()),
            ])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ToolError::from_response(response).await);
        }

        let body: SerpApiResponse = response.json().await?;
        Ok(body.organic_results.into_iter().take(num_results).collect())
    }
}

/// Format hits as numbered title / snippet / link blocks.
pub fn format_results(hits: &[SearchHit]) -> String {
    let blocks: Vec<String> = hits
        .iter()
        .enumerate()
        .map(|(i, hit)| {
            format!(
                "{}. {}\n   {}\n   Link: {}",
                i + 1,
                hit.title,
                hit.snippet,
                hit.link
            )
        })
        .collect();

    format!("Resultados da busca:\n\n{}", blocks.join("\n\n"))
}

/// The `search_web` tool: live results about exams, notices and news.
pub struct SearchWeb {
    backend: Arc<dyn WebSearch>,
    num_results: usize,
}

impl SearchWeb {
    /// Create the tool over `backend`, returning up to five results.
    pub fn new(backend: Arc<dyn WebSearch>) -> Self {
        Self {
            backend,
            num_results: 5,
        }
    }

    /// Override the number of results.
    pub fn with_num_results(mut self, num_results: usize) -> Self {
        self.num_results = num_results.max(1);
        self
    }
}

#[async_trait]
impl Tool for SearchWeb {
    fn name(&self) -> &str {
        "search_web"
    }

    fn description(&self) -> &str {
        "Busca informações atualizadas na web sobre editais, vagas, autorizações de concursos, \
         notícias recentes sobre órgãos públicos, OAB, ENEM, vestibulares e outros temas \
         relevantes para concurseiros."
    }

    fn query_description(&self) -> &str {
        "A query de busca"
    }

    async fn execute(&self, input: QueryInput) -> Result<ToolOutput, ToolError> {
        let query = input.query.trim();
        if query.is_empty() {
            return Err(ToolError::InvalidInput("empty query".to_string()));
        }

        match self.backend.search(query, self.num_results).await {
            Ok(hits) if hits.is_empty() => {
                warn!("Web search returned nothing for '{}'", query);
                Ok(ToolOutput::success(NO_RESULTS))
            }
            Ok(hits) => {
                info!("Web search returned {} results for '{}'", hits.len(), query);
                Ok(ToolOutput::success(format_results(&hits)))
            }
            Err(e) => {
                warn!("Web search failed for '{}': {}", query, e);
                Ok(ToolOutput::failure(SEARCH_FAILED))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FakeSearch(Result<Vec<SearchHit>, String>);

    #[async_trait]
    impl WebSearch for FakeSearch {
        async fn search(&self, _query: &str, num: usize) -> Result<Vec<SearchHit>, ToolError> {
            match &self.0 {
                Ok(hits) => Ok(hits.iter().take(num).cloned().collect()),
                Err(e) => Err(ToolError::ExecutionFailed(e.clone())),
            }
        }
    }

    fn hit(n: usize) -> SearchHit {
        SearchHit {
            title: format!("Concurso PF {}", n),
            link: format!("https://example.com/{}", n),
            snippet: format!("Edital {}", n),
        }
    }

    #[test]
    fn test_format_results() {
        let formatted = format_results(&[hit(1), hit(2)]);
        assert_eq!(
            formatted,
            "Resultados da busca:\n\n\
             1. Concurso PF 1\n   Edital 1\n   Link: https://example.com/1\n\n\
             2. Concurso PF 2\n   Edital 2\n   Link: https://example.com/2"
        );
    }

    #[tokio::test]
    async fn test_search_web_formats_hits() {
        let tool = SearchWeb::new(Arc::new(FakeSearch(Ok((1..=8).map(hit).collect()))));

        let output = tool.execute(QueryInput::new("concurso PF")).await.unwrap();
        assert!(output.success);
        assert!(output.content.starts_with("Resultados da busca:"));
        assert!(output.content.contains("5. Concurso PF 5"));
        assert!(!output.content.contains("6. "));
    }

    #[tokio::test]
    async fn test_search_web_no_results() {
        let tool = SearchWeb::new(Arc::new(FakeSearch(Ok(vec![]))));
        let output = tool.execute(QueryInput::new("x")).await.unwrap();
        assert_eq!(output.content, NO_RESULTS);
    }

    #[tokio::test]
    async fn test_search_web_failure_is_explicit() {
        let tool = SearchWeb::new(Arc::new(FakeSearch(Err("boom".to_string()))));
        let output = tool.execute(QueryInput::new("x")).await.unwrap();
        assert!(!output.success);
        assert_eq!(output.content, SEARCH_FAILED);
    }

    #[test]
    fn test_serpapi_response_tolerates_missing_fields() {
        let body = r#"{"search_metadata": {}, "organic_results": [{"title": "t", "link": "l"}]}"#;
        let parsed: SerpApiResponse = serde_json::from_str(body).unwrap();
        assert_eq!(parsed.organic_results[0].snippet, "");

        let empty: SerpApiResponse = serde_json::from_str("{}").unwrap();
        assert!(empty.organic_results.is_empty());
    }
}
