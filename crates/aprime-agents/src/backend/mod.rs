//! External service backends and the bundle handlers are built from.
//!
//! Each backend is a trait so handlers can be exercised against the
//! deterministic implementations in [`crate::mock`]; the reqwest-based
//! implementations live in the submodules.

pub mod groq;
pub mod stability;
pub mod tavily;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use base64::Engine;
use serde::Deserialize;
use tracing::info;

use aprime_core::config::ProvidersConfig;

use crate::error::{HandlerError, GROQ_NOT_CONFIGURED};
use crate::payload::PromptMessage;

pub use groq::GroqClient;
pub use stability::StabilityClient;
pub use tavily::TavilyClient;

// =============================================================================
// Backend traits
// =============================================================================

/// An OpenAI-compatible chat-completion service.
#[async_trait]
pub trait LlmClient: Send + Sync {
    /// Run one completion and return the first choice's text.
    async fn complete(&self, model: &str, messages: &[PromptMessage])
        -> Result<String, HandlerError>;
}

/// A single web search hit.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub content: String,
}

/// Web search output: an optional direct answer plus result snippets.
#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub answer: Option<String>,
    #[serde(default)]
    pub results: Vec<SearchResult>,
}

#[async_trait]
pub trait WebSearch: Send + Sync {
    async fn search(&self, query: &str) -> Result<SearchResponse, HandlerError>;
}

/// Raw image bytes returned by an image generation service.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GeneratedImage {
    pub bytes: Vec<u8>,
    /// File format as requested, e.g. `png`.
    pub format: String,
}

impl GeneratedImage {
    /// Inline `data:` URL the frontend can render directly.
    pub fn to_data_url(&self) -> String {
        let encoded = base64::engine::general_purpose::STANDARD.encode(&self.bytes);
        format!("data:image/{};base64,{}", self.format, encoded)
    }
}

#[async_trait]
pub trait ImageGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, HandlerError>;
}

// =============================================================================
// ModelHandle
// =============================================================================

/// An LLM client bound to one model name, or disabled when no key is set.
#[derive(Clone)]
pub struct ModelHandle {
    client: Option<Arc<dyn LlmClient>>,
    model: String,
}

impl ModelHandle {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>) -> Self {
        Self {
            client: Some(client),
            model: model.into(),
        }
    }

    pub fn disabled() -> Self {
        Self {
            client: None,
            model: String::new(),
        }
    }

    pub fn is_configured(&self) -> bool {
        self.client.is_some()
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn complete(&self, messages: &[PromptMessage]) -> Result<String, HandlerError> {
        let client = self
            .client
            .as_ref()
            .ok_or_else(|| HandlerError::Configuration(GROQ_NOT_CONFIGURED.to_string()))?;
        client.complete(&self.model, messages).await
    }

    /// Single-shot completion: one system prompt and one user message.
    pub async fn ask(&self, system: &str, user: impl Into<String>) -> Result<String, HandlerError> {
        self.complete(&[PromptMessage::system(system), PromptMessage::user(user)])
            .await
    }
}

impl std::fmt::Debug for ModelHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ModelHandle")
            .field("model", &self.model)
            .field("configured", &self.is_configured())
            .finish()
    }
}

// =============================================================================
// Backends
// =============================================================================

/// Everything the handlers and the router need, resolved once at startup.
#[derive(Clone)]
pub struct Backends {
    /// Model used by the text handlers.
    pub text: ModelHandle,
    /// Low-latency model used for intent routing.
    pub router: ModelHandle,
    pub search: Option<Arc<dyn WebSearch>>,
    pub images: Option<Arc<dyn ImageGenerator>>,
    /// Persona text for identity questions.
    pub persona: Option<Arc<str>>,
}

impl Backends {
    /// Every capability disabled.
    pub fn disabled() -> Self {
        Self {
            text: ModelHandle::disabled(),
            router: ModelHandle::disabled(),
            search: None,
            images: None,
            persona: None,
        }
    }

    /// Build the HTTP backends for every provider that has an API key.
    pub fn from_config(
        providers: &ProvidersConfig,
        persona: Option<String>,
    ) -> Result<Self, HandlerError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(providers.request_timeout_secs))
            .build()
            .map_err(|e| HandlerError::Network(format!("Failed to build HTTP client: {}", e)))?;

        let mut backends = Self::disabled();
        backends.persona = persona.filter(|p| !p.trim().is_empty()).map(Arc::from);

        if let Some(key) = usable_key(&providers.groq.api_key) {
            let client: Arc<dyn LlmClient> = Arc::new(GroqClient::new(
                http.clone(),
                &providers.groq.base_url,
                key,
            ));
            backends.text = ModelHandle::new(client.clone(), &providers.groq.model);
            backends.router = ModelHandle::new(client, &providers.groq.router_model);
        }

        if let Some(key) = usable_key(&providers.tavily.api_key) {
            backends.search = Some(Arc::new(TavilyClient::new(
                http.clone(),
                &providers.tavily,
                key,
            )));
        }

        if let Some(key) = usable_key(&providers.stability.api_key) {
            backends.images = Some(Arc::new(StabilityClient::new(
                http,
                &providers.stability,
                key,
            )));
        }

        info!(
            text = backends.text.is_configured(),
            search = backends.search.is_some(),
            images = backends.images.is_some(),
            persona = backends.persona.is_some(),
            "Backends initialized"
        );
        Ok(backends)
    }
}

impl std::fmt::Debug for Backends {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Backends")
            .field("text", &self.text)
            .field("router", &self.router)
            .field("search", &self.search.is_some())
            .field("images", &self.images.is_some())
            .field("persona", &self.persona.is_some())
            .finish()
    }
}

fn usable_key(key: &Option<String>) -> Option<&str> {
    key.as_deref().map(str::trim).filter(|k| !k.is_empty())
}

/// Turn a non-success response into an `Upstream` error, pulling the most
/// specific message the body offers.
pub(crate) async fn upstream_error(response: reqwest::Response) -> HandlerError {
    let status = response.status().as_u16();
    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Failed to read error body".to_string());
    HandlerError::Upstream {
        status,
        message: extract_error_message(&body),
    }
}

fn extract_error_message(body: &str) -> String {
    let parsed: Option<serde_json::Value> = serde_json::from_str(body).ok();
    let from_json = parsed.as_ref().and_then(|v| {
        v.pointer("/error/message")
            .or_else(|| v.get("detail"))
            .or_else(|| v.pointer("/errors/0"))
            .or_else(|| v.get("message"))
            .and_then(|m| m.as_str())
            .map(str::to_string)
    });
    from_json.unwrap_or_else(|| body.chars().take(300).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_url_encoding() {
        let image = GeneratedImage {
            bytes: vec![0x89, b'P', b'N', b'G'],
            format: "png".to_string(),
        };
        assert_eq!(image.to_data_url(), "data:image/png;base64,iVBORw==");
    }

    #[test]
    fn test_extract_error_message_variants() {
        assert_eq!(
            extract_error_message(r#"{"error":{"message":"invalid api key"}}"#),
            "invalid api key"
        );
        assert_eq!(extract_error_message(r#"{"detail":"bad query"}"#), "bad query");
        assert_eq!(
            extract_error_message(r#"{"errors":["prompt too long"]}"#),
            "prompt too long"
        );
        assert_eq!(extract_error_message("gateway timeout"), "gateway timeout");
    }

    #[test]
    fn test_from_config_without_keys_disables_everything() {
        let backends = Backends::from_config(&ProvidersConfig::default(), None).unwrap();
        assert!(!backends.text.is_configured());
        assert!(!backends.router.is_configured());
        assert!(backends.search.is_none());
        assert!(backends.images.is_none());
        assert!(backends.persona.is_none());
    }

    #[test]
    fn test_from_config_with_keys() {
        let mut providers = ProvidersConfig::default();
        providers.groq.api_key = Some("gsk_test".to_string());
        providers.tavily.api_key = Some("   ".to_string());
        providers.stability.api_key = Some("sk-test".to_string());

        let backends =
            Backends::from_config(&providers, Some("About A-Prime".to_string())).unwrap();
        assert!(backends.text.is_configured());
        assert_eq!(backends.router.model(), providers.groq.router_model);
        assert!(backends.search.is_none());
        assert!(backends.images.is_some());
        assert_eq!(backends.persona.as_deref(), Some("About A-Prime"));
    }

    #[tokio::test]
    async fn test_disabled_model_handle_reports_configuration() {
        let err = ModelHandle::disabled().ask("sys", "hi").await.unwrap_err();
        assert!(matches!(err, HandlerError::Configuration(ref m) if m == GROQ_NOT_CONFIGURED));
    }
}
