//! Web search handler.
//!
//! Returns the search service's direct answer when it has one; otherwise the
//! result snippets are handed to the model to compose an answer.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use aprime_core::types::IntentCategory;

use crate::backend::{ModelHandle, WebSearch};
use crate::error::{HandlerError, TAVILY_NOT_CONFIGURED};
use crate::handler::{expect_text, Handler};
use crate::payload::Payload;
use crate::prompts;

/// Reply when the search produced neither an answer nor any snippet.
pub const NO_RESULTS: &str =
    "I searched online, but couldn't find any relevant information to answer your question.";

pub struct WebSearchHandler {
    search: Option<Arc<dyn WebSearch>>,
    model: ModelHandle,
}

impl WebSearchHandler {
    pub fn new(search: Option<Arc<dyn WebSearch>>, model: ModelHandle) -> Self {
        Self { search, model }
    }
}

#[async_trait]
impl Handler for WebSearchHandler {
    fn category(&self) -> IntentCategory {
        IntentCategory::Search
    }

    async fn invoke(&self, payload: &Payload) -> Result<String, HandlerError> {
        let query = expect_text(payload, "search")?;
        let search = self
            .search
            .as_ref()
            .ok_or_else(|| HandlerError::Configuration(TAVILY_NOT_CONFIGURED.to_string()))?;

        let response = search.search(query).await?;
        if let Some(answer) = response.answer.filter(|a| !a.trim().is_empty()) {
            return Ok(answer);
        }

        let snippets = response
            .results
            .iter()
            .map(|r| r.content.trim())
            .filter(|c| !c.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        if snippets.is_empty() {
            return Ok(NO_RESULTS.to_string());
        }

        debug!(snippet_len = snippets.len(), "Composing answer from search results");
        self.model
            .ask(prompts::SEARCH, prompts::search_results(&snippets, query))
            .await
    }

    fn describe(&self) -> &'static str {
        "Search the web"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::{MockLlm, MockSearch};

    #[tokio::test]
    async fn test_search_returns_direct_answer() {
        let llm = Arc::new(MockLlm::replying("unused"));
        let handler = WebSearchHandler::new(
            Some(Arc::new(MockSearch::with_answer("42 degrees"))),
            ModelHandle::new(llm.clone(), "m"),
        );
        let reply = handler
            .invoke(&Payload::Text("current temperature".into()))
            .await
            .unwrap();
        assert_eq!(reply, "42 degrees");
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_search_composes_from_snippets() {
        let llm = Arc::new(MockLlm::echo());
        let search = Arc::new(MockSearch::with_snippets(&["first fact", "  ", "second fact"]));
        let handler = WebSearchHandler::new(
            Some(search.clone() as Arc<dyn WebSearch>),
            ModelHandle::new(llm.clone(), "m"),
        );
        let reply = handler
            .invoke(&Payload::Text("latest rust release".into()))
            .await
            .unwrap();
        assert_eq!(
            reply,
            "Web Search Results: first fact second fact\n\nBased on these results, please answer the query: 'latest rust release'"
        );
        assert_eq!(search.queries(), vec!["latest rust release".to_string()]);
        assert_eq!(llm.calls()[0].1[0].content, prompts::SEARCH);
    }

    #[tokio::test]
    async fn test_search_without_results() {
        let handler = WebSearchHandler::new(
            Some(Arc::new(MockSearch::empty())),
            ModelHandle::disabled(),
        );
        let reply = handler.invoke(&Payload::Text("q".into())).await.unwrap();
        assert_eq!(reply, NO_RESULTS);
    }

    #[tokio::test]
    async fn test_search_without_key() {
        let handler = WebSearchHandler::new(None, ModelHandle::disabled());
        let err = handler
            .invoke(&Payload::Text("q".into()))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), TAVILY_NOT_CONFIGURED);
    }

    #[tokio::test]
    async fn test_search_failure_propagates() {
        let handler = WebSearchHandler::new(
            Some(Arc::new(MockSearch::failing(502))),
            ModelHandle::disabled(),
        );
        let err = handler
            .invoke(&Payload::Text("q".into()))
            .await
            .unwrap_err();
        assert!(err.is_retryable());
    }
}
