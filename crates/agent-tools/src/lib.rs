//! Tool registry and implementations for the Instagram sales agent.
//!
//! This crate provides the two capabilities the model may call mid-run and
//! a [`ToolRegistry`] that exposes them to a brain as a
//! [`brain_core::ToolExecutor`].
//!
//! # Built-in Tools
//!
//! - [`Documents`] (`documents`) - Retrieval over the product knowledge base
//!   (Azure embeddings + Supabase `match_documents`).
//! - [`SearchWeb`] (`search_web`) - Live Google results via SerpAPI.
//!
//! Both accept a single query. Backend failures never surface as errors to
//! the model: the tools answer with an explicit "no results" or "search
//! failed" text instead.
//!
//! # Example
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use agent_tools::{sales_registry, SerpApi, SerpApiConfig, SupabaseKnowledgeBase};
//!
//! let knowledge = Arc::new(SupabaseKnowledgeBase::new(embeddings, supabase)?);
//! let search = Arc::new(SerpApi::new(SerpApiConfig::new(api_key))?);
//! let registry = sales_registry(knowledge, search, 20);
//! assert_eq!(registry.list_tools(), vec!["documents", "search_web"]);
//! ```

mod error;
mod registry;
mod tool;
pub mod tools;

use std::sync::Arc;
use std::time::Duration;

pub use error::ToolError;
pub use registry::ToolRegistry;
pub use tool::{Tool, ToolOutput};
pub use tools::{
    format_results, Documents, EmbeddingsConfig, KnowledgeBase, SearchHit, SearchWeb, SerpApi,
    SerpApiConfig, SupabaseConfig, SupabaseKnowledgeBase, WebSearch, DEFAULT_TOP_K, NO_DOCUMENTS,
    NO_RESULTS, SEARCH_FAILED,
};

// Re-export async_trait for convenience
pub use async_trait::async_trait;

/// Default time budget for a single tool call.
pub const DEFAULT_TOOL_TIMEOUT: Duration = Duration::from_secs(20);

/// Create the registry exposed to the sales agent.
pub fn sales_registry(
    knowledge: Arc<dyn KnowledgeBase>,
    search: Arc<dyn WebSearch>,
    top_k: usize,
) -> ToolRegistry {
    let mut registry = ToolRegistry::new().with_timeout(DEFAULT_TOOL_TIMEOUT);
    registry.register(Documents::new(knowledge, top_k));
    registry.register(SearchWeb::new(search));
    registry
}
