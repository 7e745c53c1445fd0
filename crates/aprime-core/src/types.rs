use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Title every session starts with until the first real message names it.
pub const PLACEHOLDER_TITLE: &str = "New Chat";

// =============================================================================
// Enums
// =============================================================================

/// The closed set of task categories a user turn can be routed to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentCategory {
    /// Questions about the assistant itself and its developer.
    Identity,
    /// Condense the previous message (or the utterance itself).
    Summarize,
    /// Live web search.
    Search,
    /// Answer from model knowledge, no web access.
    Knowledge,
    /// Answer a question grounded on the previous message.
    Qna,
    /// Code generation.
    Code,
    /// Image generation.
    Image,
    /// Free conversation over the bounded history.
    Chat,
}

impl IntentCategory {
    /// Every category, in declaration order.
    pub const ALL: [IntentCategory; 8] = [
        IntentCategory::Identity,
        IntentCategory::Summarize,
        IntentCategory::Search,
        IntentCategory::Knowledge,
        IntentCategory::Qna,
        IntentCategory::Code,
        IntentCategory::Image,
        IntentCategory::Chat,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            IntentCategory::Identity => "identity",
            IntentCategory::Summarize => "summarize",
            IntentCategory::Search => "search",
            IntentCategory::Knowledge => "knowledge",
            IntentCategory::Qna => "qna",
            IntentCategory::Code => "code",
            IntentCategory::Image => "image",
            IntentCategory::Chat => "chat",
        }
    }
}

impl fmt::Display for IntentCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IntentCategory {
    type Err = String;

    /// Parses a category token. The router tokens of the first deployment
    /// (`tavily_search`, `groq_search`) are still accepted.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "identity" => Ok(IntentCategory::Identity),
            "summarize" => Ok(IntentCategory::Summarize),
            "search" | "tavily_search" => Ok(IntentCategory::Search),
            "knowledge" | "groq_search" => Ok(IntentCategory::Knowledge),
            "qna" => Ok(IntentCategory::Qna),
            "code" => Ok(IntentCategory::Code),
            "image" => Ok(IntentCategory::Image),
            "chat" => Ok(IntentCategory::Chat),
            _ => Err(format!("Unknown intent category: {}", s)),
        }
    }
}

/// Author of a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    User,
    Assistant,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Assistant => "assistant",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Role {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Role::User),
            "assistant" => Ok(Role::Assistant),
            _ => Err(format!("Unknown role: {}", s)),
        }
    }
}

// =============================================================================
// Domain structs
// =============================================================================

/// A persisted, titled conversation thread.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub last_modified: DateTime<Utc>,
    /// Set once the title has been derived or assigned. Tracked apart from
    /// the title text, which may legitimately equal the placeholder.
    #[serde(default)]
    pub title_derived: bool,
}

impl Session {
    /// A fresh session created at `now`, carrying the placeholder title.
    pub fn new(now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            title: PLACEHOLDER_TITLE.to_string(),
            created_at: now,
            last_modified: now,
            title_derived: false,
        }
    }

    /// Whether the next turn should derive the title.
    pub fn needs_title(&self) -> bool {
        !self.title_derived
    }
}

/// A single immutable entry in a session's log.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub id: String,
    pub session_id: String,
    pub role: Role,
    pub content: String,
    pub timestamp: DateTime<Utc>,
    /// Content embeds a base64 image payload.
    pub is_image: bool,
    /// Content embeds a fenced code block.
    pub is_code: bool,
}

impl Message {
    /// Build a new message, deriving the content flags at write time.
    pub fn new(session_id: impl Into<String>, role: Role, content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            id: Uuid::new_v4().to_string(),
            session_id: session_id.into(),
            role,
            is_image: content_is_image(&content),
            is_code: content_is_code(&content),
            content,
            timestamp: Utc::now(),
        }
    }
}

/// Whether the content carries an inline `data:image/...` payload.
pub fn content_is_image(content: &str) -> bool {
    content.contains("data:image")
}

/// Whether the content carries a triple-backtick code fence.
pub fn content_is_code(content: &str) -> bool {
    content.contains("```")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_round_trips_through_str() {
        for category in IntentCategory::ALL {
            let parsed: IntentCategory = category.as_str().parse().unwrap();
            assert_eq!(parsed, category);
        }
    }

    #[test]
    fn test_category_legacy_aliases() {
        assert_eq!(
            "tavily_search".parse::<IntentCategory>().unwrap(),
            IntentCategory::Search
        );
        assert_eq!(
            "groq_search".parse::<IntentCategory>().unwrap(),
            IntentCategory::Knowledge
        );
    }

    #[test]
    fn test_category_rejects_unknown() {
        assert!("weather".parse::<IntentCategory>().is_err());
        assert!("".parse::<IntentCategory>().is_err());
        assert!("Chat".parse::<IntentCategory>().is_err());
    }

    #[test]
    fn test_category_serde_snake_case() {
        let json = serde_json::to_string(&IntentCategory::Knowledge).unwrap();
        assert_eq!(json, "\"knowledge\"");
        let back: IntentCategory = serde_json::from_str("\"qna\"").unwrap();
        assert_eq!(back, IntentCategory::Qna);
    }

    #[test]
    fn test_role_display_and_parse() {
        assert_eq!(Role::User.to_string(), "user");
        assert_eq!(Role::Assistant.to_string(), "assistant");
        assert_eq!("assistant".parse::<Role>().unwrap(), Role::Assistant);
        assert!("system".parse::<Role>().is_err());
    }

    #[test]
    fn test_new_session_needs_title() {
        let now = Utc::now();
        let session = Session::new(now);
        assert_eq!(session.title, PLACEHOLDER_TITLE);
        assert!(session.needs_title());
        assert!(Uuid::parse_str(&session.id).is_ok());
        assert_eq!(session.created_at, now);
        assert_eq!(session.last_modified, now);
    }

    #[test]
    fn test_session_deserializes_without_derived_flag() {
        let json = r#"{"id":"s1","title":"Trip","created_at":"2024-01-01T00:00:00Z","last_modified":"2024-01-01T00:00:00Z"}"#;
        let session: Session = serde_json::from_str(json).unwrap();
        assert!(!session.title_derived);
    }

    #[test]
    fn test_message_flags_plain_text() {
        let msg = Message::new("s1", Role::User, "hello there");
        assert!(!msg.is_image);
        assert!(!msg.is_code);
    }

    #[test]
    fn test_message_flags_image() {
        let msg = Message::new("s1", Role::Assistant, "data:image/png;base64,iVBORw0KGgo=");
        assert!(msg.is_image);
        assert!(!msg.is_code);
    }

    #[test]
    fn test_message_flags_code() {
        let msg = Message::new("s1", Role::Assistant, "```rust\nfn main() {}\n```");
        assert!(msg.is_code);
        assert!(!msg.is_image);
    }
}
