//! Handler registry and trait definition.
//!
//! Defines the `Handler` async trait and the category-keyed registry the
//! dispatcher looks handlers up in.

pub mod chat;
pub mod code;
pub mod identity;
pub mod image;
pub mod knowledge;
pub mod qna;
pub mod summarize;
pub mod web_search;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;

use aprime_core::types::IntentCategory;

use crate::backend::Backends;
use crate::error::HandlerError;
use crate::payload::Payload;

pub use chat::ChatHandler;
pub use code::CodeHandler;
pub use identity::IdentityHandler;
pub use image::ImageHandler;
pub use knowledge::KnowledgeHandler;
pub use qna::QnaHandler;
pub use summarize::SummarizeHandler;
pub use web_search::WebSearchHandler;

/// A capability that answers one category of turn.
#[async_trait]
pub trait Handler: Send + Sync {
    /// The category this handler serves.
    fn category(&self) -> IntentCategory;

    /// Produce the assistant response for a shaped payload.
    async fn invoke(&self, payload: &Payload) -> Result<String, HandlerError>;

    /// Short human-readable description, used in logs.
    fn describe(&self) -> &'static str;
}

/// Extract the text of a `Payload::Text`, rejecting every other shape.
pub(crate) fn expect_text<'a>(
    payload: &'a Payload,
    handler: &str,
) -> Result<&'a str, HandlerError> {
    match payload {
        Payload::Text(text) => Ok(text),
        other => Err(HandlerError::InvalidPayload(format!(
            "{} handler expects text, got {}",
            handler,
            other.kind()
        ))),
    }
}

/// Category to handler table, built once at startup.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: HashMap<IntentCategory, Arc<dyn Handler>>,
}

impl HandlerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry with one handler per category, wired to `backends`.
    pub fn with_defaults(backends: &Backends) -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(IdentityHandler::new(
            backends.text.clone(),
            backends.persona.clone(),
        )));
        registry.register(Arc::new(SummarizeHandler::new(backends.text.clone())));
        registry.register(Arc::new(WebSearchHandler::new(
            backends.search.clone(),
            backends.text.clone(),
        )));
        registry.register(Arc::new(KnowledgeHandler::new(backends.text.clone())));
        registry.register(Arc::new(QnaHandler::new(backends.text.clone())));
        registry.register(Arc::new(CodeHandler::new(backends.text.clone())));
        registry.register(Arc::new(ImageHandler::new(backends.images.clone())));
        registry.register(Arc::new(ChatHandler::new(backends.text.clone())));
        registry
    }

    /// Register a handler under its own category, returning the one it replaced.
    pub fn register(&mut self, handler: Arc<dyn Handler>) -> Option<Arc<dyn Handler>> {
        self.handlers.insert(handler.category(), handler)
    }

    pub fn get(&self, category: IntentCategory) -> Option<Arc<dyn Handler>> {
        self.handlers.get(&category).cloned()
    }

    /// The handler for `category`, falling back to the chat handler.
    pub fn resolve(&self, category: IntentCategory) -> Option<Arc<dyn Handler>> {
        self.get(category)
            .or_else(|| self.get(IntentCategory::Chat))
    }

    /// Registered categories in declaration order.
    pub fn categories(&self) -> Vec<IntentCategory> {
        IntentCategory::ALL
            .into_iter()
            .filter(|c| self.handlers.contains_key(c))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }
}

impl std::fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandlerRegistry")
            .field("categories", &self.categories())
            .finish()
    }
}
