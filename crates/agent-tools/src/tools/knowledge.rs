//! Knowledge retrieval over the product knowledge base.
//!
//! The query is embedded with an Azure OpenAI embeddings deployment and
//! matched against the Supabase `knowledge_base` table through its
//! `match_documents` RPC.

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use brain_core::QueryInput;
use serde::Deserialize;
use serde_json::json;
use tracing::{debug, info, warn};

use crate::error::ToolError;
use crate::tool::{Tool, ToolOutput};

/// Returned to the model when nothing relevant was found.
pub const NO_DOCUMENTS: &str = "Nenhum documento relevante encontrado na base de conhecimento.";

/// Default number of passages retrieved per query.
pub const DEFAULT_TOP_K: usize = 20;

/// Backend able to return the passages most similar to a query.
#[async_trait]
pub trait KnowledgeBase: Send + Sync {
    /// Up to `top_k` passage texts, most similar first.
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<String>, ToolError>;
}

/// Azure OpenAI embeddings deployment.
#[derive(Clone)]
pub struct EmbeddingsConfig {
    /// Resource endpoint (e.g., "https://forefy.openai.azure.com").
    pub endpoint: String,
    pub api_key: String,
    pub deployment: String,
    pub api_version: String,
}

impl EmbeddingsConfig {
    fn url(&self) -> String {
        format!(
            "{}/openai/deployments/{}/embeddings?api-version={}",
            self.endpoint.trim_end_matches('/'),
            self.deployment,
            self.api_version
        )
    }
}

impl fmt::Debug for EmbeddingsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EmbeddingsConfig")
            .field("endpoint", &self.endpoint)
            .field("api_key", &"[redacted]")
            .field("deployment", &self.deployment)
            .field("api_version", &self.api_version)
            .finish()
    }
}

/// Supabase project holding the vector table.
#[derive(Clone)]
pub struct SupabaseConfig {
    pub url: String,
    pub service_key: String,
    /// Name of the similarity RPC.
    pub query_name: String,
}

impl SupabaseConfig {
    pub fn new(url: impl Into<String>, service_key: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            service_key: service_key.into(),
            query_name: "match_documents".to_string(),
        }
    }

    fn rpc_url(&self) -> String {
        format!(
            "{}/rest/v1/rpc/{}",
            self.url.trim_end_matches('/'),
            self.query_name
        )
    }
}

impl fmt::Debug for SupabaseConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SupabaseConfig")
            .field("url", &self.url)
            .field("service_key", &"[redacted]")
            .field("query_name", &self.query_name)
            .finish()
    }
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug, Deserialize)]
struct MatchedDocument {
    content: String,
    #[serde(default)]
    similarity: Option<f64>,
}

/// [`KnowledgeBase`] backed by Azure embeddings and a Supabase RPC.
pub struct SupabaseKnowledgeBase {
    http: reqwest::Client,
    embeddings: EmbeddingsConfig,
    supabase: SupabaseConfig,
}

impl SupabaseKnowledgeBase {
    /// Create the backend.
    pub fn new(embeddings: EmbeddingsConfig, supabase: SupabaseConfig) -> Result<Self, ToolError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(15))
            .build()?;

        Ok(Self {
            http,
            embeddings,
            supabase,
        })
    }

    async fn embed(&self, query: &str) -> Result<Vec<f32>, ToolError> {
        let response = self
            .http
            .post(self.embeddings.url())
            .header("api-key", &self.embeddings.api_key)
            .json(&json!({ "input": query }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ToolError::from_response(response).await);
        }

        let body: EmbeddingResponse = response.json().await?;
        body.data
            .into_iter()
            .next()
            .map(|d| d.embedding)
            .ok_or_else(|| ToolError::ExecutionFailed("empty embeddings response".to_string()))
    }
}

#[async_trait]
impl KnowledgeBase for SupabaseKnowledgeBase {
    async fn search(&self, query: &str, top_k: usize) -> Result<Vec<String>, ToolError> {
        let embedding = self.embed(query).await?;

        let response = self
            .http
            .post(self.supabase.rpc_url())
            .header("apikey", &self.supabase.service_key)
            .bearer_auth(&self.supabase.service_key)
            .json(&json!({
                "query_embedding": embedding,
                "match_count": top_k,
                "filter": {}
            }))
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(ToolError::from_response(response).await);
        }

        let matches: Vec<MatchedDocument> = response.json().await?;
        if let Some(best) = matches.first().and_then(|m| m.similarity) {
            debug!("Best knowledge match similarity: {:.3}", best);
        }

        Ok(matches.into_iter().map(|m| m.content).collect())
    }
}

/// The `documents` tool: retrieval over the product knowledge base.
pub struct Documents {
    backend: Arc<dyn KnowledgeBase>,
    top_k: usize,
}

impl Documents {
    /// Create the tool over `backend`, retrieving `top_k` passages per call.
    pub fn new(backend: Arc<dyn KnowledgeBase>, top_k: usize) -> Self {
        Self {
            backend,
            top_k: top_k.max(1),
        }
    }
}

#[async_trait]
impl Tool for Documents {
    fn name(&self) -> &str {
        "documents"
    }

    fn description(&self) -> &str {
        "Base vetorial Forefy: conhecimento curado sobre o produto Forefy (preparação para \
         concursos). Contém promessa central, posicionamento, públicos e dores, benefícios, \
         metodologia, objeções comuns e respostas, planos e preços. Use SEMPRE que a pergunta \
         do cliente for sobre o Forefy."
    }

    fn query_description(&self) -> &str {
        "A pergunta ou termo de busca"
    }

    async fn execute(&self, input: QueryInput) -> Result<ToolOutput, ToolError> {
        let query = input.query.trim();
        if query.is_empty() {
            return Err(ToolError::InvalidInput("empty query".to_string()));
        }

        match self.backend.search(query, self.top_k).await {
            Ok(passages) if passages.is_empty() => {
                info!("Knowledge search returned nothing for '{}'", query);
                Ok(ToolOutput::success(NO_DOCUMENTS))
            }
            Ok(passages) => {
                info!("Knowledge search returned {} passages", passages.len());
                Ok(ToolOutput::success(passages.join("\n\n")))
            }
            Err(e) => {
                warn!("Knowledge search failed for '{}': {}", query, e);
                Ok(ToolOutput::failure(NO_DOCUMENTS))
            }
        }
    }
}
