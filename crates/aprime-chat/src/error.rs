//! Error types for the chat engine.

use aprime_core::error::AprimeError;

/// Errors from the chat engine.
///
/// Handler and classification failures never surface here; they are turned
/// into response text. Only validation and store failures do.
#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("message cannot be empty")]
    EmptyMessage,
    #[error("message exceeds maximum length of {0} characters")]
    MessageTooLong(usize),
    #[error("session not found: {0}")]
    SessionNotFound(String),
    #[error("storage error: {0}")]
    Storage(String),
}

impl From<AprimeError> for ChatError {
    fn from(err: AprimeError) -> Self {
        match err {
            AprimeError::NotFound(what) => ChatError::SessionNotFound(what),
            other => ChatError::Storage(other.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_error_display() {
        assert_eq!(ChatError::EmptyMessage.to_string(), "message cannot be empty");
        assert_eq!(
            ChatError::MessageTooLong(8000).to_string(),
            "message exceeds maximum length of 8000 characters"
        );
        assert_eq!(
            ChatError::SessionNotFound("abc".to_string()).to_string(),
            "session not found: abc"
        );
        assert_eq!(
            ChatError::Storage("disk full".to_string()).to_string(),
            "storage error: disk full"
        );
    }

    #[test]
    fn test_from_aprime_error() {
        let err: ChatError = AprimeError::Storage("locked".to_string()).into();
        assert!(matches!(err, ChatError::Storage(ref m) if m.contains("locked")));

        let err: ChatError = AprimeError::NotFound("session x".to_string()).into();
        assert!(matches!(err, ChatError::SessionNotFound(_)));
    }
}
