//! Knowledge handler: answers from the model alone, without web access.

use async_trait::async_trait;

use aprime_core::types::IntentCategory;

use crate::backend::ModelHandle;
use crate::error::HandlerError;
use crate::handler::{expect_text, Handler};
use crate::payload::Payload;
use crate::prompts;

pub struct KnowledgeHandler {
    model: ModelHandle,
}

impl KnowledgeHandler {
    pub fn new(model: ModelHandle) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Handler for KnowledgeHandler {
    fn category(&self) -> IntentCategory {
        IntentCategory::Knowledge
    }

    async fn invoke(&self, payload: &Payload) -> Result<String, HandlerError> {
        let query = expect_text(payload, "knowledge")?;
        self.model.ask(prompts::KNOWLEDGE, query).await
    }

    fn describe(&self) -> &'static str {
        "Answer from model knowledge"
    }
}
