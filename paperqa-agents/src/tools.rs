//! The two tools registered for the Research agent.

use paperqa_provider::{VectorSearch, WebSearch};
use paperqa_tool::{ToolDyn, ToolError};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Name of the PDF retrieval tool.
pub const PDF_RETRIEVAL: &str = "pdf_retrieval";
/// Name of the web search tool.
pub const WEB_SEARCH: &str = "web_search";

/// Wraps a [`VectorSearch`] backend as a named, string-in/string-out tool.
pub struct PdfRetrievalTool<S: VectorSearch> {
    search: Arc<S>,
    top_k: usize,
    min_score: f64,
}

impl<S: VectorSearch> PdfRetrievalTool<S> {
    /// Build a tool over a vector search backend.
    pub fn new(search: Arc<S>, top_k: usize, min_score: f64) -> Self {
        Self { search, top_k: top_k.min(5), min_score }
    }
}

impl<S: VectorSearch + Send + Sync + 'static> ToolDyn for PdfRetrievalTool<S> {
    fn name(&self) -> &str {
        PDF_RETRIEVAL
    }

    fn description(&self) -> &str {
        "Search the private PDF corpus for passages relevant to a query. \
         Returns the top matching chunks with source filename, page, and similarity."
    }

    fn call(&self, query: &str) -> Pin<Box<dyn Future<Output = Result<String, ToolError>> + Send + '_>> {
        let query = query.to_string();
        Box::pin(async move {
            let hits = match self.search.search(&query, self.top_k, self.min_score).await {
                Ok(hits) => hits,
                Err(e) => return Ok(format!("error: pdf_retrieval failed: {e}")),
            };
            if hits.is_empty() {
                return Ok("No matching passages found in the corpus.".to_string());
            }
            let blocks: Vec<String> = hits
                .iter()
                .map(|hit| {
                    format!(
                        "Source: {} (Page {})\nContent: {}\nSimilarity: {:.2}",
                        hit.source, hit.page, hit.text, hit.score
                    )
                })
                .collect();
            Ok(blocks.join("\n\n"))
        })
    }
}

/// Wraps a [`WebSearch`] backend as a named, string-in/string-out tool.
pub struct WebSearchTool<S: WebSearch> {
    search: Arc<S>,
    max_results: usize,
}

impl<S: WebSearch> WebSearchTool<S> {
    /// Build a tool over a web search backend.
    pub fn new(search: Arc<S>, max_results: usize) -> Self {
        Self { search, max_results: max_results.min(5) }
    }
}

impl<S: WebSearch + Send + Sync + 'static> ToolDyn for WebSearchTool<S> {
    fn name(&self) -> &str {
        WEB_SEARCH
    }

    fn description(&self) -> &str {
        "Search the public web for information not present in the private corpus. \
         Returns matching pages with title, URL, and content."
    }

    fn call(&self, query: &str) -> Pin<Box<dyn Future<Output = Result<String, ToolError>> + Send + '_>> {
        let query = query.to_string();
        Box::pin(async move {
            let hits = match self.search.search(&query, self.max_results).await {
                Ok(hits) => hits,
                Err(e) => return Ok(format!("error: web_search failed: {e}")),
            };
            if hits.is_empty() {
                return Ok("No web results found.".to_string());
            }
            let blocks: Vec<String> = hits
                .iter()
                .map(|hit| format!("Title: {}\nURL: {}\nContent: {}", hit.title, hit.url, hit.content))
                .collect();
            Ok(blocks.join("\n\n"))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use paperqa_provider::{SearchError, VectorHit, WebHit};

    struct StubVectorSearch(Vec<VectorHit>);

    #[async_trait]
    impl VectorSearch for StubVectorSearch {
        async fn search(&self, _query: &str, _top_k: usize, _min_score: f64) -> Result<Vec<VectorHit>, SearchError> {
            Ok(self.0.clone())
        }
    }

    struct StubWebSearch(Vec<WebHit>);

    #[async_trait]
    impl WebSearch for StubWebSearch {
        async fn search(&self, _query: &str, _max_results: usize) -> Result<Vec<WebHit>, SearchError> {
            Ok(self.0.clone())
        }
    }

    #[tokio::test]
    async fn pdf_retrieval_formats_hits() {
        let tool = PdfRetrievalTool::new(
            Arc::new(StubVectorSearch(vec![VectorHit {
                text: "attention is all you need".into(),
                source: "zhang2024.pdf".into(),
                page: 7,
                score: 0.83,
            }])),
            5,
            0.5,
        );
        let result = tool.call("attention").await.unwrap();
        assert!(result.contains("Source: zhang2024.pdf (Page 7)"));
        assert!(result.contains("Similarity: 0.83"));
    }

    #[tokio::test]
    async fn pdf_retrieval_handles_no_hits() {
        let tool = PdfRetrievalTool::new(Arc::new(StubVectorSearch(vec![])), 5, 0.5);
        let result = tool.call("nothing").await.unwrap();
        assert_eq!(result, "No matching passages found in the corpus.");
    }

    #[tokio::test]
    async fn web_search_formats_hits() {
        let tool = WebSearchTool::new(
            Arc::new(StubWebSearch(vec![WebHit {
                title: "OpenAI announcement".into(),
                url: "https://openai.com/news".into(),
                content: "...".into(),
            }])),
            5,
        );
        let result = tool.call("openai").await.unwrap();
        assert!(result.contains("Title: OpenAI announcement"));
    }

    #[test]
    fn tool_names_match_registry_contract() {
        assert_eq!(PDF_RETRIEVAL, "pdf_retrieval");
        assert_eq!(WEB_SEARCH, "web_search");
    }
}
