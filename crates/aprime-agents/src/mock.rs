//! Deterministic in-process backends.
//!
//! Used by the test suites of this and downstream crates to drive handlers,
//! the router and the HTTP surface without network access. Every mock
//! records the requests it receives.

use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;

use crate::backend::{GeneratedImage, ImageGenerator, LlmClient, SearchResponse, SearchResult, WebSearch};
use crate::error::HandlerError;
use crate::payload::{PromptMessage, PromptRole};

#[derive(Clone, Debug)]
enum Behavior<T> {
    Reply(T),
    Echo,
    Fail(u16),
    Panic,
}

fn failure(status: u16) -> HandlerError {
    HandlerError::Upstream {
        status,
        message: "mock failure".to_string(),
    }
}

// =============================================================================
// MockLlm
// =============================================================================

/// A scripted chat-completion backend.
pub struct MockLlm {
    behavior: Behavior<String>,
    delay: Option<Duration>,
    calls: Mutex<Vec<(String, Vec<PromptMessage>)>>,
}

impl MockLlm {
    fn with_behavior(behavior: Behavior<String>) -> Self {
        Self {
            behavior,
            delay: None,
            calls: Mutex::new(Vec::new()),
        }
    }

    /// Always answer with `reply`.
    pub fn replying(reply: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Reply(reply.into()))
    }

    /// Answer with the content of the last user message.
    pub fn echo() -> Self {
        Self::with_behavior(Behavior::Echo)
    }

    /// Fail every call with an upstream error of the given status.
    pub fn failing(status: u16) -> Self {
        Self::with_behavior(Behavior::Fail(status))
    }

    /// Panic inside every call.
    pub fn panicking() -> Self {
        Self::with_behavior(Behavior::Panic)
    }

    /// Sleep before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Every `(model, messages)` pair received so far.
    pub fn calls(&self) -> Vec<(String, Vec<PromptMessage>)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().map(|c| c.len()).unwrap_or_default()
    }
}

#[async_trait]
impl LlmClient for MockLlm {
    async fn complete(
        &self,
        model: &str,
        messages: &[PromptMessage],
    ) -> Result<String, HandlerError> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((model.to_string(), messages.to_vec()));
        }
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        match &self.behavior {
            Behavior::Reply(reply) => Ok(reply.clone()),
            Behavior::Echo => Ok(messages
                .iter()
                .rev()
                .find(|m| m.role == PromptRole::User)
                .map(|m| m.content.clone())
                .unwrap_or_default()),
            Behavior::Fail(status) => Err(failure(*status)),
            Behavior::Panic => panic!("mock llm panicked"),
        }
    }
}

// =============================================================================
// MockSearch
// =============================================================================

/// A scripted web search backend.
pub struct MockSearch {
    behavior: Behavior<SearchResponse>,
    queries: Mutex<Vec<String>>,
}

impl MockSearch {
    fn with_behavior(behavior: Behavior<SearchResponse>) -> Self {
        Self {
            behavior,
            queries: Mutex::new(Vec::new()),
        }
    }

    /// Respond with a direct answer.
    pub fn with_answer(answer: impl Into<String>) -> Self {
        Self::with_behavior(Behavior::Reply(SearchResponse {
            answer: Some(answer.into()),
            results: Vec::new(),
        }))
    }

    /// Respond with snippets only, one result per entry.
    pub fn with_snippets(snippets: &[&str]) -> Self {
        let results = snippets
            .iter()
            .enumerate()
            .map(|(i, content)| SearchResult {
                title: format!("Result {}", i + 1),
                url: format!("https://example.com/{}", i + 1),
                content: content.to_string(),
            })
            .collect();
        Self::with_behavior(Behavior::Reply(SearchResponse {
            answer: None,
            results,
        }))
    }

    /// Respond with nothing at all.
    pub fn empty() -> Self {
        Self::with_behavior(Behavior::Reply(SearchResponse::default()))
    }

    pub fn failing(status: u16) -> Self {
        Self::with_behavior(Behavior::Fail(status))
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().map(|q| q.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl WebSearch for MockSearch {
    async fn search(&self, query: &str) -> Result<SearchResponse, HandlerError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.to_string());
        }
        match &self.behavior {
            Behavior::Reply(response) => Ok(response.clone()),
            Behavior::Echo => Ok(SearchResponse {
                answer: Some(query.to_string()),
                results: Vec::new(),
            }),
            Behavior::Fail(status) => Err(failure(*status)),
            Behavior::Panic => panic!("mock search panicked"),
        }
    }
}

// =============================================================================
// MockImages
// =============================================================================

/// A scripted image generation backend.
pub struct MockImages {
    behavior: Behavior<Vec<u8>>,
    prompts: Mutex<Vec<String>>,
}

impl MockImages {
    fn with_behavior(behavior: Behavior<Vec<u8>>) -> Self {
        Self {
            behavior,
            prompts: Mutex::new(Vec::new()),
        }
    }

    /// Return the given bytes as a PNG.
    pub fn returning(bytes: Vec<u8>) -> Self {
        Self::with_behavior(Behavior::Reply(bytes))
    }

    pub fn failing(status: u16) -> Self {
        Self::with_behavior(Behavior::Fail(status))
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl ImageGenerator for MockImages {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, HandlerError> {
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        let bytes = match &self.behavior {
            Behavior::Reply(bytes) => bytes.clone(),
            Behavior::Echo => prompt.as_bytes().to_vec(),
            Behavior::Fail(status) => return Err(failure(*status)),
            Behavior::Panic => panic!("mock images panicked"),
        };
        Ok(GeneratedImage {
            bytes,
            format: "png".to_string(),
        })
    }
}
