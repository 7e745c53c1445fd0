//! Summarize handler.

use async_trait::async_trait;

use aprime_core::types::IntentCategory;

use crate::backend::ModelHandle;
use crate::error::HandlerError;
use crate::handler::{expect_text, Handler};
use crate::payload::Payload;
use crate::prompts;

pub struct SummarizeHandler {
    model: ModelHandle,
}

impl SummarizeHandler {
    pub fn new(model: ModelHandle) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Handler for SummarizeHandler {
    fn category(&self) -> IntentCategory {
        IntentCategory::Summarize
    }

    async fn invoke(&self, payload: &Payload) -> Result<String, HandlerError> {
        let text = expect_text(payload, "summarize")?;
        self.model
            .ask(prompts::SUMMARIZE, prompts::summarize_request(text))
            .await
    }

    fn describe(&self) -> &'static str {
        "Summarize a piece of text"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockLlm;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_summarize_wraps_text() {
        let llm = Arc::new(MockLlm::replying("Short version."));
        let handler = SummarizeHandler::new(ModelHandle::new(llm.clone(), "m"));
        let reply = handler
            .invoke(&Payload::Text("A very long article".into()))
            .await
            .unwrap();
        assert_eq!(reply, "Short version.");

        let (_, messages) = &llm.calls()[0];
        assert_eq!(messages[0].content, prompts::SUMMARIZE);
        assert_eq!(
            messages[1].content,
            "Summarize the following text: A very long article"
        );
    }

    #[tokio::test]
    async fn test_summarize_rejects_conversation() {
        let handler = SummarizeHandler::new(ModelHandle::disabled());
        let err = handler
            .invoke(&Payload::Conversation(vec![]))
            .await
            .unwrap_err();
        assert!(matches!(err, HandlerError::InvalidPayload(_)));
    }
}
