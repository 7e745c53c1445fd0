//! Routes a classified turn to exactly one handler.
//!
//! The handler runs in its own task under a timeout. Whatever goes wrong in
//! there (an error, the timeout, a panic) comes back as response text.

use std::time::Duration;

use tracing::{debug, warn};

use aprime_agents::{HandlerError, HandlerRegistry, Payload};
use aprime_core::types::IntentCategory;

use crate::context::ConversationContext;
use crate::types::{Classification, ClassifiedPayload};

/// Reply for any handler failure that is not a disabled capability.
pub const GENERIC_FAILURE: &str =
    "Sorry, I ran into a problem while processing your request. Please try again.";

/// Shape the handler input for `category` from the turn's context.
pub fn shape_payload(category: IntentCategory, context: &ConversationContext) -> Payload {
    let preceding = context.preceding().map(|m| m.content.clone());
    match category {
        IntentCategory::Summarize => {
            Payload::Text(preceding.unwrap_or_else(|| context.turn.clone()))
        }
        IntentCategory::Qna => Payload::Grounded {
            context: preceding.unwrap_or_else(|| context.turn.clone()),
            question: context.turn.clone(),
        },
        IntentCategory::Chat => Payload::Conversation(context.to_prompt_messages()),
        _ => Payload::Text(context.turn.clone()),
    }
}

/// Invokes handlers from a fixed registry.
#[derive(Clone, Debug)]
pub struct Dispatcher {
    registry: HandlerRegistry,
    timeout: Duration,
}

impl Dispatcher {
    pub fn new(registry: HandlerRegistry, timeout: Duration) -> Self {
        Self { registry, timeout }
    }

    /// Produce the response text for a classified turn. Never fails.
    pub async fn dispatch(
        &self,
        classification: &Classification,
        context: &ConversationContext,
    ) -> String {
        if let ClassifiedPayload::Answer(answer) = &classification.payload {
            debug!(category = %classification.category, "Answered without handler");
            return answer.clone();
        }

        let Some(handler) = self.registry.resolve(classification.category) else {
            warn!(category = %classification.category, "No handler registered");
            return GENERIC_FAILURE.to_string();
        };

        // Shape for the handler that will actually run, which differs from
        // the classified category after a fallback to chat.
        let category = handler.category();
        let payload = shape_payload(category, context);
        debug!(
            classified = %classification.category,
            handler = %category,
            payload = payload.kind(),
            "Dispatching turn: {}",
            handler.describe()
        );

        let mut task = tokio::spawn(async move { handler.invoke(&payload).await });
        match tokio::time::timeout(self.timeout, &mut task).await {
            Ok(Ok(Ok(response))) => response,
            Ok(Ok(Err(HandlerError::Configuration(message)))) => {
                debug!(handler = %category, "Capability disabled");
                message
            }
            Ok(Ok(Err(e))) => {
                warn!(handler = %category, error = %e, retryable = e.is_retryable(), "Handler failed");
                GENERIC_FAILURE.to_string()
            }
            Ok(Err(join_err)) => {
                warn!(handler = %category, error = %join_err, "Handler task aborted");
                GENERIC_FAILURE.to_string()
            }
            Err(_) => {
                task.abort();
                warn!(handler = %category, timeout_secs = self.timeout.as_secs(), "Handler timed out");
                GENERIC_FAILURE.to_string()
            }
        }
    }
}
