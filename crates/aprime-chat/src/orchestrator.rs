//! Chat orchestrator: central coordinator for one conversational turn.
//!
//! Wires the session lifecycle, context window, classifier and dispatcher
//! around the session store.

use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{info, warn};

use aprime_agents::{Backends, HandlerRegistry};
use aprime_core::config::{AprimeConfig, ChatConfig};
use aprime_core::store::SessionStore;
use aprime_core::types::{Message, Role, Session};

use crate::classifier::Classifier;
use crate::context::{ContextWindow, LIMIT_REACHED_NOTICE};
use crate::dispatcher::Dispatcher;
use crate::error::ChatError;
use crate::lifecycle::SessionLifecycle;
use crate::types::ChatTurn;

/// Central chat orchestrator.
pub struct ChatOrchestrator {
    store: Arc<dyn SessionStore>,
    lifecycle: SessionLifecycle,
    classifier: Classifier,
    dispatcher: Dispatcher,
    window: ContextWindow,
    max_session_messages: usize,
    max_message_chars: usize,
}

impl ChatOrchestrator {
    pub fn new(
        store: Arc<dyn SessionStore>,
        classifier: Classifier,
        dispatcher: Dispatcher,
        chat: &ChatConfig,
    ) -> Self {
        Self {
            lifecycle: SessionLifecycle::new(store.clone()),
            store,
            classifier,
            dispatcher,
            window: ContextWindow::new(chat.context_window),
            max_session_messages: chat.max_session_messages,
            max_message_chars: chat.max_message_chars,
        }
    }

    /// Build the classifier and the default handler table from configuration.
    pub fn from_config(
        store: Arc<dyn SessionStore>,
        backends: &Backends,
        config: &AprimeConfig,
    ) -> Self {
        let classifier = Classifier::new(
            backends.router.clone(),
            Duration::from_secs(config.providers.router_timeout_secs),
        )
        .with_identity_answer(config.chat.identity_answer.clone());
        let dispatcher = Dispatcher::new(
            HandlerRegistry::with_defaults(backends),
            Duration::from_secs(config.providers.request_timeout_secs),
        );
        Self::new(store, classifier, dispatcher, &config.chat)
    }

    /// Handle one user turn.
    ///
    /// The user's message is persisted before the handler runs, so it is
    /// kept even when the handler fails. Only validation and store failures
    /// return `Err`.
    pub async fn handle_message(
        &self,
        message: &str,
        session_id: Option<&str>,
    ) -> Result<ChatTurn, ChatError> {
        if message.trim().is_empty() {
            return Err(ChatError::EmptyMessage);
        }
        if message.chars().count() > self.max_message_chars {
            return Err(ChatError::MessageTooLong(self.max_message_chars));
        }

        let started = Instant::now();
        let session = self.lifecycle.resolve_or_create(session_id)?;

        let count = self.store.count_messages(&session.id)?;
        if ContextWindow::at_ceiling(count, self.max_session_messages) {
            warn!(
                session_id = %session.id,
                count,
                ceiling = self.max_session_messages,
                "Session at message limit"
            );
            self.store.append_message(&session.id, Role::User, message)?;
            return Ok(ChatTurn {
                response: LIMIT_REACHED_NOTICE.to_string(),
                session_id: session.id,
                new_title: None,
                category: None,
            });
        }

        let history = self.store.list_messages(&session.id)?;
        let context = self.window.build(&history, message);
        let classification = self.classifier.classify(message).await;

        self.store.append_message(&session.id, Role::User, message)?;
        let response = self.dispatcher.dispatch(&classification, &context).await;
        self.store
            .append_message(&session.id, Role::Assistant, &response)?;

        let new_title = if session.needs_title() {
            self.lifecycle.derive_title_once(&session.id, message)?
        } else {
            None
        };

        info!(
            session_id = %session.id,
            category = %classification.category,
            source = classification.source.as_str(),
            window = context.prior.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Turn handled"
        );

        Ok(ChatTurn {
            response,
            session_id: session.id,
            new_title,
            category: Some(classification.category),
        })
    }

    pub fn new_session(&self) -> Result<Session, ChatError> {
        self.lifecycle.resolve_or_create(None)
    }

    /// All sessions, most recently modified first.
    pub fn list_sessions(&self) -> Result<Vec<Session>, ChatError> {
        Ok(self.store.list_sessions()?)
    }

    /// Messages of a session in chronological order; empty for unknown ids.
    pub fn history(&self, session_id: &str) -> Result<Vec<Message>, ChatError> {
        Ok(self.store.list_messages(session_id)?)
    }

    pub fn delete_session(&self, session_id: &str) -> Result<(), ChatError> {
        self.lifecycle.delete(session_id)
    }
}
