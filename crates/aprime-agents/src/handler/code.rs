//! Code generation handler.

use async_trait::async_trait;

use aprime_core::types::IntentCategory;

use crate::backend::ModelHandle;
use crate::error::HandlerError;
use crate::handler::{expect_text, Handler};
use crate::payload::Payload;
use crate::prompts;

pub struct CodeHandler {
    model: ModelHandle,
}

impl CodeHandler {
    pub fn new(model: ModelHandle) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Handler for CodeHandler {
    fn category(&self) -> IntentCategory {
        IntentCategory::Code
    }

    async fn invoke(&self, payload: &Payload) -> Result<String, HandlerError> {
        let prompt = expect_text(payload, "code")?;
        self.model.ask(prompts::CODE, prompt).await
    }

    fn describe(&self) -> &'static str {
        "Generate code"
    }
}
