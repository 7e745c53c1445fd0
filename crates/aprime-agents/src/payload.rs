use serde::{Deserialize, Serialize};

use aprime_core::types::{Message, Role};

/// Role of a message in a chat-completion request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptRole {
    System,
    User,
    Assistant,
}

/// One entry of a chat-completion request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromptMessage {
    pub role: PromptRole,
    pub content: String,
}

impl PromptMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: PromptRole::Assistant,
            content: content.into(),
        }
    }
}

impl From<&Message> for PromptMessage {
    fn from(msg: &Message) -> Self {
        let role = match msg.role {
            Role::User => PromptRole::User,
            Role::Assistant => PromptRole::Assistant,
        };
        Self {
            role,
            content: msg.content.clone(),
        }
    }
}

/// Handler input, shaped per category by the dispatcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Payload {
    /// A single piece of text: the utterance, or the text to summarize.
    Text(String),
    /// A question answered against a piece of context.
    Grounded { context: String, question: String },
    /// The bounded conversation, oldest first, ending with the new turn.
    Conversation(Vec<PromptMessage>),
}

impl Payload {
    pub fn kind(&self) -> &'static str {
        match self {
            Payload::Text(_) => "text",
            Payload::Grounded { .. } => "grounded",
            Payload::Conversation(_) => "conversation",
        }
    }
}
