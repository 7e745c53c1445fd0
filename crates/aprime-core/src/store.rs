//! Persistence contract for sessions and their messages.

use crate::error::Result;
use crate::types::{Message, Role, Session};

/// Document-store style persistence for sessions and messages.
///
/// Every method is a single atomic operation. Identifiers are opaque
/// strings: an id that does not resolve (including a malformed one) yields
/// `None`, an empty list or `false`, never an error. Errors mean the store
/// itself is unavailable.
pub trait SessionStore: Send + Sync {
    /// Create a session with the placeholder title.
    fn create_session(&self) -> Result<Session>;

    fn get_session(&self, id: &str) -> Result<Option<Session>>;

    fn session_title(&self, id: &str) -> Result<Option<String>>;

    /// Overwrite the title and mark it derived. Returns whether the session
    /// existed.
    fn set_session_title(&self, id: &str, title: &str) -> Result<bool>;

    /// Set the derived title unless one has already been set.
    ///
    /// Compare-and-set on the session's derived flag, not on the title text.
    /// Returns whether this call set it.
    fn set_derived_title(&self, id: &str, title: &str) -> Result<bool>;

    /// All sessions, most recently modified first.
    fn list_sessions(&self) -> Result<Vec<Session>>;

    /// Delete a session and all of its messages. Returns whether it existed.
    fn delete_session(&self, id: &str) -> Result<bool>;

    /// Append a message and bump the session's `last_modified`.
    ///
    /// The message timestamp never precedes the latest one already in the
    /// session, so timestamp order matches insertion order.
    ///
    /// Fails with `AprimeError::NotFound` when the session does not exist.
    fn append_message(&self, session_id: &str, role: Role, content: &str) -> Result<Message>;

    /// Messages of a session in chronological order.
    fn list_messages(&self, session_id: &str) -> Result<Vec<Message>>;

    fn count_messages(&self, session_id: &str) -> Result<usize>;
}
