//! Image generation handler.

use std::sync::Arc;

use async_trait::async_trait;

use aprime_core::types::IntentCategory;

use crate::backend::ImageGenerator;
use crate::error::{HandlerError, STABILITY_NOT_CONFIGURED};
use crate::handler::{expect_text, Handler};
use crate::payload::Payload;

pub struct ImageHandler {
    images: Option<Arc<dyn ImageGenerator>>,
}

impl ImageHandler {
    pub fn new(images: Option<Arc<dyn ImageGenerator>>) -> Self {
        Self { images }
    }
}

#[async_trait]
impl Handler for ImageHandler {
    fn category(&self) -> IntentCategory {
        IntentCategory::Image
    }

    async fn invoke(&self, payload: &Payload) -> Result<String, HandlerError> {
        let prompt = expect_text(payload, "image")?;
        let images = self
            .images
            .as_ref()
            .ok_or_else(|| HandlerError::Configuration(STABILITY_NOT_CONFIGURED.to_string()))?;
        if prompt.trim().is_empty() {
            return Err(HandlerError::InvalidPayload(
                "image prompt must not be empty".to_string(),
            ));
        }

        let image = images.generate(prompt).await?;
        tracing::info!(bytes = image.bytes.len(), "Generated image");
        Ok(image.to_data_url())
    }

    fn describe(&self) -> &'static str {
        "Generate an image"
    }
}
