//! A-Prime chat crate - turn handling for persisted conversations.
//!
//! The `ChatOrchestrator` validates a turn, resolves its session, builds the
//! bounded context window, classifies the utterance, dispatches it to exactly
//! one handler and records both sides of the exchange.

pub mod classifier;
pub mod context;
pub mod dispatcher;
pub mod error;
pub mod lifecycle;
pub mod orchestrator;
pub mod types;

pub use classifier::Classifier;
pub use context::{ContextWindow, ConversationContext};
pub use dispatcher::Dispatcher;
pub use error::ChatError;
pub use lifecycle::SessionLifecycle;
pub use orchestrator::ChatOrchestrator;
pub use types::{ChatTurn, Classification, ClassificationSource, ClassifiedPayload};
