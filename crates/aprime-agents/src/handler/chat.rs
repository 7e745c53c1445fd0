//! General conversation handler.
//!
//! Sends the bounded conversation as is, behind the chat system prompt.

use async_trait::async_trait;

use aprime_core::types::IntentCategory;

use crate::backend::ModelHandle;
use crate::error::HandlerError;
use crate::handler::Handler;
use crate::payload::{Payload, PromptMessage};
use crate::prompts;

pub struct ChatHandler {
    model: ModelHandle,
}

impl ChatHandler {
    pub fn new(model: ModelHandle) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Handler for ChatHandler {
    fn category(&self) -> IntentCategory {
        IntentCategory::Chat
    }

    async fn invoke(&self, payload: &Payload) -> Result<String, HandlerError> {
        let mut messages = vec![PromptMessage::system(prompts::CHAT)];
        match payload {
            Payload::Conversation(turns) if turns.is_empty() => {
                return Err(HandlerError::InvalidPayload(
                    "conversation must not be empty".to_string(),
                ));
            }
            Payload::Conversation(turns) => messages.extend(turns.iter().cloned()),
            Payload::Text(text) => messages.push(PromptMessage::user(text.clone())),
            Payload::Grounded { question, .. } => {
                messages.push(PromptMessage::user(question.clone()))
            }
        }
        self.model.complete(&messages).await
    }

    fn describe(&self) -> &'static str {
        "Free conversation"
    }
}
