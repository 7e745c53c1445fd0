//! Identity handler.
//!
//! Answers questions about the assistant from the persona text loaded at
//! startup.

use std::sync::Arc;

use async_trait::async_trait;

use aprime_core::types::IntentCategory;

use crate::backend::ModelHandle;
use crate::error::HandlerError;
use crate::handler::{expect_text, Handler};
use crate::payload::Payload;
use crate::prompts;

/// Reply used when no persona text was loaded.
pub const IDENTITY_UNAVAILABLE: &str =
    "I'm sorry, my identity context is not available right now.";

pub struct IdentityHandler {
    model: ModelHandle,
    persona: Option<Arc<str>>,
}

impl IdentityHandler {
    pub fn new(model: ModelHandle, persona: Option<Arc<str>>) -> Self {
        Self { model, persona }
    }
}

#[async_trait]
impl Handler for IdentityHandler {
    fn category(&self) -> IntentCategory {
        IntentCategory::Identity
    }

    async fn invoke(&self, payload: &Payload) -> Result<String, HandlerError> {
        let question = expect_text(payload, "identity")?;
        let Some(persona) = self.persona.as_deref() else {
            return Ok(IDENTITY_UNAVAILABLE.to_string());
        };
        self.model
            .ask(prompts::IDENTITY, prompts::identity_question(persona, question))
            .await
    }

    fn describe(&self) -> &'static str {
        "Answer questions about the assistant"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockLlm;

    #[tokio::test]
    async fn test_identity_without_persona() {
        let llm = Arc::new(MockLlm::replying("unused"));
        let handler = IdentityHandler::new(ModelHandle::new(llm.clone(), "m"), None);
        let reply = handler
            .invoke(&Payload::Text("who are you".into()))
            .await
            .unwrap();
        assert_eq!(reply, IDENTITY_UNAVAILABLE);
        assert_eq!(llm.call_count(), 0);
    }

    #[tokio::test]
    async fn test_identity_sends_persona_as_context() {
        let llm = Arc::new(MockLlm::replying("I am A-Prime."));
        let handler = IdentityHandler::new(
            ModelHandle::new(llm.clone(), "m"),
            Some(Arc::from("A-Prime is a multi-agent assistant.")),
        );
        let reply = handler
            .invoke(&Payload::Text("who built you?".into()))
            .await
            .unwrap();
        assert_eq!(reply, "I am A-Prime.");

        let (_, messages) = &llm.calls()[0];
        assert_eq!(messages[0].content, prompts::IDENTITY);
        assert!(messages[1].content.contains("A-Prime is a multi-agent assistant."));
        assert!(messages[1].content.ends_with("Question: who built you?"));
    }

    #[tokio::test]
    async fn test_identity_without_model_is_configuration_error() {
        let handler = IdentityHandler::new(ModelHandle::disabled(), Some(Arc::from("persona")));
        let err = handler
            .invoke(&Payload::Text("who are you".into()))
            .await
            .unwrap_err();
        assert!(err.is_configuration());
    }
}
