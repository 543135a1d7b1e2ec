//! The two search backends the Research agent's tools wrap: a PDF
//! vector search index and a web search engine.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from either search backend.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SearchError {
    /// The backend request failed (network, timeout, backend-side error).
    #[error("search request failed: {0}")]
    RequestFailed(String),

    /// Catch-all.
    #[error("{0}")]
    Other(#[from] Box<dyn std::error::Error + Send + Sync>),
}

/// One hit from the PDF vector search index.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorHit {
    /// Matched passage text.
    pub text: String,
    /// Source document identifier (e.g. filename or citation key).
    pub source: String,
    /// Page number within the source document.
    pub page: u32,
    /// Similarity score, typically in `[0.0, 1.0]`.
    pub score: f64,
}

/// The corpus vector search index.
#[async_trait]
pub trait VectorSearch: Send + Sync {
    /// Return up to `top_k` passages scoring at least `min_score`.
    async fn search(
        &self,
        query: &str,
        top_k: usize,
        min_score: f64,
    ) -> Result<Vec<VectorHit>, SearchError>;
}

/// One hit from a web search engine.
#[derive(Debug, Clone, PartialEq)]
pub struct WebHit {
    /// Page title.
    pub title: String,
    /// Page URL.
    pub url: String,
    /// Extracted page content or snippet.
    pub content: String,
}

/// The web search engine used as a fallback for out-of-corpus queries.
#[async_trait]
pub trait WebSearch: Send + Sync {
    /// Return up to `max_results` web hits for `query`.
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<WebHit>, SearchError>;
}
