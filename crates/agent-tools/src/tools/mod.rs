//! Built-in tool implementations.

mod knowledge;
mod web_search;

pub use knowledge::{
    Documents, EmbeddingsConfig, KnowledgeBase, SupabaseConfig, SupabaseKnowledgeBase,
    DEFAULT_TOP_K, NO_DOCUMENTS,
};
pub use web_search::{
    format_results, SearchHit, SearchWeb, SerpApi, SerpApiConfig, WebSearch, NO_RESULTS,
    SEARCH_FAILED,
};
