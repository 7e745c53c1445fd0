//! Stability AI image generation.

use async_trait::async_trait;
use reqwest::multipart::Form;
use tracing::{debug, warn};

use aprime_core::config::StabilityConfig;

use crate::backend::{upstream_error, GeneratedImage, ImageGenerator};
use crate::error::HandlerError;

pub struct StabilityClient {
    http: reqwest::Client,
    endpoint: String,
    api_key: String,
    output_format: String,
}

impl StabilityClient {
    pub fn new(http: reqwest::Client, config: &StabilityConfig, api_key: &str) -> Self {
        Self {
            http,
            endpoint: config.base_url.clone(),
            api_key: api_key.to_string(),
            output_format: config.output_format.clone(),
        }
    }
}

#[async_trait]
impl ImageGenerator for StabilityClient {
    async fn generate(&self, prompt: &str) -> Result<GeneratedImage, HandlerError> {
        debug!(prompt_len = prompt.len(), format = %self.output_format, "Stability request");

        let form = Form::new()
            .text("prompt", prompt.to_string())
            .text("output_format", self.output_format.clone());

        let response = self
            .http
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .header(reqwest::header::ACCEPT, "image/*")
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let err = upstream_error(response).await;
            warn!(error = %err, "Stability image generation failed");
            return Err(err);
        }

        let bytes = response.bytes().await?;
        if bytes.is_empty() {
            return Err(HandlerError::InvalidResponse(
                "Stability returned an empty image".to_string(),
            ));
        }

        Ok(GeneratedImage {
            bytes: bytes.to_vec(),
            format: self.output_format.clone(),
        })
    }
}
