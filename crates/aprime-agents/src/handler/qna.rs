//! Question answering grounded on the preceding message.

use async_trait::async_trait;

use aprime_core::types::IntentCategory;

use crate::backend::ModelHandle;
use crate::error::HandlerError;
use crate::handler::Handler;
use crate::payload::Payload;
use crate::prompts;

pub struct QnaHandler {
    model: ModelHandle,
}

impl QnaHandler {
    pub fn new(model: ModelHandle) -> Self {
        Self { model }
    }
}

#[async_trait]
impl Handler for QnaHandler {
    fn category(&self) -> IntentCategory {
        IntentCategory::Qna
    }

    async fn invoke(&self, payload: &Payload) -> Result<String, HandlerError> {
        let Payload::Grounded { context, question } = payload else {
            return Err(HandlerError::InvalidPayload(format!(
                "qna handler expects grounded input, got {}",
                payload.kind()
            )));
        };
        self.model
            .ask(prompts::QNA, prompts::grounded_question(context, question))
            .await
    }

    fn describe(&self) -> &'static str {
        "Answer a question about the previous message"
    }
}
