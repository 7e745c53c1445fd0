//! Bounded conversation context.
//!
//! Builds the slice of prior messages handed to a handler for one turn and
//! enforces the per-session message ceiling.

use aprime_agents::PromptMessage;
use aprime_core::types::Message;

/// Fixed reply once a session has reached its message ceiling.
pub const LIMIT_REACHED_NOTICE: &str =
    "This chat has reached its message limit. Please start a new chat to continue.";

// =============================================================================
// ContextWindow
// =============================================================================

/// Selects the most recent `size` messages of a session.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ContextWindow {
    size: usize,
}

impl ContextWindow {
    pub fn new(size: usize) -> Self {
        Self { size }
    }

    /// The last `min(len, size)` messages of `history`, oldest first,
    /// followed by the new (not yet persisted) turn.
    pub fn build(&self, history: &[Message], turn: &str) -> ConversationContext {
        let start = history.len().saturating_sub(self.size);
        ConversationContext {
            prior: history[start..].to_vec(),
            turn: turn.to_string(),
        }
    }

    /// Whether a session holding `count` messages may take no more turns.
    pub fn at_ceiling(count: usize, ceiling: usize) -> bool {
        count >= ceiling
    }
}

// =============================================================================
// ConversationContext
// =============================================================================

/// The window built for one turn.
#[derive(Clone, Debug, PartialEq)]
pub struct ConversationContext {
    /// Prior messages inside the window, oldest first.
    pub prior: Vec<Message>,
    /// The new user utterance.
    pub turn: String,
}

impl ConversationContext {
    /// The message right before the new turn, if the window has one.
    pub fn preceding(&self) -> Option<&Message> {
        self.prior.last()
    }

    /// Prior messages plus the new turn as chat-completion messages.
    pub fn to_prompt_messages(&self) -> Vec<PromptMessage> {
        let mut messages: Vec<PromptMessage> =
            self.prior.iter().map(PromptMessage::from).collect();
        messages.push(PromptMessage::user(self.turn.clone()));
        messages
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aprime_agents::PromptRole;
    use aprime_core::types::Role;

    fn history(n: usize) -> Vec<Message> {
        (0..n)
            .map(|i| {
                let role = if i % 2 == 0 { Role::User } else { Role::Assistant };
                Message::new("s1", role, format!("m{}", i))
            })
            .collect()
    }

    #[test]
    fn test_window_keeps_most_recent() {
        let ctx = ContextWindow::new(3).build(&history(10), "now");
        let contents: Vec<&str> = ctx.prior.iter().map(|m| m.content.as_str()).collect();
        assert_eq!(contents, vec!["m7", "m8", "m9"]);
        assert_eq!(ctx.turn, "now");
    }

    #[test]
    fn test_window_shorter_history() {
        let ctx = ContextWindow::new(20).build(&history(4), "now");
        assert_eq!(ctx.prior.len(), 4);
        assert_eq!(ctx.prior[0].content, "m0");
    }

    #[test]
    fn test_window_empty_history() {
        let ctx = ContextWindow::new(20).build(&[], "first");
        assert!(ctx.prior.is_empty());
        assert!(ctx.preceding().is_none());
        assert_eq!(ctx.to_prompt_messages(), vec![PromptMessage::user("first")]);
    }

    #[test]
    fn test_window_size_zero() {
        let ctx = ContextWindow::new(0).build(&history(5), "only");
        assert!(ctx.prior.is_empty());
        assert_eq!(ctx.to_prompt_messages(), vec![PromptMessage::user("only")]);
    }

    #[test]
    fn test_preceding_is_last_prior() {
        let ctx = ContextWindow::new(5).build(&history(3), "q");
        assert_eq!(ctx.preceding().unwrap().content, "m2");
    }

    #[test]
    fn test_prompt_messages_keep_roles_and_order() {
        let ctx = ContextWindow::new(2).build(&history(4), "next");
        let prompts = ctx.to_prompt_messages();
        assert_eq!(prompts.len(), 3);
        assert_eq!(prompts[0], PromptMessage::user("m2"));
        assert_eq!(prompts[1].role, PromptRole::Assistant);
        assert_eq!(prompts[2], PromptMessage::user("next"));
    }

    #[test]
    fn test_at_ceiling() {
        assert!(!ContextWindow::at_ceiling(49, 50));
        assert!(ContextWindow::at_ceiling(50, 50));
        assert!(ContextWindow::at_ceiling(51, 50));
    }
}
