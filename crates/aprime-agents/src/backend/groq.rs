//! Groq chat completions over the OpenAI-compatible HTTP API.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::backend::{upstream_error, LlmClient};
use crate::error::HandlerError;
use crate::payload::PromptMessage;

pub struct GroqClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
}

impl GroqClient {
    pub fn new(http: reqwest::Client, base_url: &str, api_key: &str) -> Self {
        Self {
            http,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
            api_key: api_key.to_string(),
        }
    }
}

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [PromptMessage],
}

#[derive(Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl LlmClient for GroqClient {
    async fn complete(
        &self,
        model: &str,
        messages: &[PromptMessage],
    ) -> Result<String, HandlerError> {
        debug!(model, messages = messages.len(), "Groq completion request");

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&CompletionRequest { model, messages })
            .send()
            .await?;

        if !response.status().is_success() {
            let err = upstream_error(response).await;
            warn!(error = %err, "Groq completion failed");
            return Err(err);
        }

        let parsed: CompletionResponse = response.json().await?;
        parsed
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .filter(|content| !content.trim().is_empty())
            .ok_or_else(|| HandlerError::InvalidResponse("Groq returned no content".to_string()))
    }
}
