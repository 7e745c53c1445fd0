use serde::Serialize;

use aprime_core::types::IntentCategory;

/// Which classifier layer produced a decision.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ClassificationSource {
    Keyword,
    Model,
    Fallback,
}

impl ClassificationSource {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClassificationSource::Keyword => "keyword",
            ClassificationSource::Model => "model",
            ClassificationSource::Fallback => "fallback",
        }
    }
}

/// What travels with a classification to the dispatcher.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ClassifiedPayload {
    /// Hand the raw utterance on; the dispatcher shapes it.
    Utterance,
    /// A ready-made response; no handler is called.
    Answer(String),
}

/// Result of classifying one utterance.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Classification {
    pub category: IntentCategory,
    pub payload: ClassifiedPayload,
    pub source: ClassificationSource,
}

impl Classification {
    pub fn new(category: IntentCategory, source: ClassificationSource) -> Self {
        Self {
            category,
            payload: ClassifiedPayload::Utterance,
            source,
        }
    }

    pub fn answered(category: IntentCategory, answer: String) -> Self {
        Self {
            category,
            payload: ClassifiedPayload::Answer(answer),
            source: ClassificationSource::Keyword,
        }
    }
}

/// Outcome of one handled turn.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ChatTurn {
    pub response: String,
    pub session_id: String,
    /// Set only on the turn that derived the session title.
    pub new_title: Option<String>,
    /// `None` when the session was at its message ceiling.
    pub category: Option<IntentCategory>,
}
