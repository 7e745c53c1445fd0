//! Session lifecycle: resolve-or-create, title derivation, deletion.

use std::sync::Arc;

use tracing::{debug, info};

use aprime_core::store::SessionStore;
use aprime_core::types::Session;

use crate::error::ChatError;

/// Characters of the first message kept in a derived title.
pub const TITLE_MAX_CHARS: usize = 50;

/// Title for a session whose first message is `message`.
///
/// The message trimmed of surrounding whitespace and cut to its first 50
/// characters, with `...` appended when the trimmed message is longer than
/// that. Blank messages produce no title.
pub fn derive_title(message: &str) -> Option<String> {
    let message = message.trim();
    if message.is_empty() {
        return None;
    }
    let head: String = message.chars().take(TITLE_MAX_CHARS).collect();
    let mut title = head.trim_end().to_string();
    if message.chars().count() > TITLE_MAX_CHARS {
        title.push_str("...");
    }
    Some(title)
}

/// Session state transitions on top of a [`SessionStore`].
#[derive(Clone)]
pub struct SessionLifecycle {
    store: Arc<dyn SessionStore>,
}

impl SessionLifecycle {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// The session for `id`, or a fresh one if `id` is absent or unknown.
    pub fn resolve_or_create(&self, id: Option<&str>) -> Result<Session, ChatError> {
        if let Some(id) = id.map(str::trim).filter(|id| !id.is_empty()) {
            if let Some(session) = self.store.get_session(id)? {
                return Ok(session);
            }
            debug!(session_id = %id, "Unknown session id, starting a new session");
        }
        let session = self.store.create_session()?;
        info!(session_id = %session.id, "Session created");
        Ok(session)
    }

    /// Derive and store the title unless the session already has one.
    ///
    /// Returns the new title only when this call set it.
    pub fn derive_title_once(
        &self,
        session_id: &str,
        first_message: &str,
    ) -> Result<Option<String>, ChatError> {
        let Some(title) = derive_title(first_message) else {
            return Ok(None);
        };
        if self.store.set_derived_title(session_id, &title)? {
            debug!(session_id = %session_id, title = %title, "Session titled");
            Ok(Some(title))
        } else {
            Ok(None)
        }
    }

    /// Delete a session and its messages.
    pub fn delete(&self, session_id: &str) -> Result<(), ChatError> {
        if self.store.delete_session(session_id)? {
            info!(session_id = %session_id, "Session deleted");
            Ok(())
        } else {
            Err(ChatError::SessionNotFound(session_id.to_string()))
        }
    }
}
