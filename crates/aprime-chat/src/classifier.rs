//! Intent classifier.
//!
//! Three layers, cheapest first: exact phrase triggers, one call to the
//! router model, then a word-boundary scan. Every path yields a member of
//! the closed category set; failures are logged and absorbed.

use std::sync::LazyLock;
use std::time::Duration;

use regex::Regex;
use tracing::{debug, warn};

use aprime_agents::ModelHandle;
use aprime_agents::prompts;
use aprime_core::types::IntentCategory;

use crate::types::{Classification, ClassificationSource};

// =============================================================================
// Layer 1: phrase triggers
// =============================================================================

const IDENTITY_PHRASES: &[&str] = &[
    "who are you",
    "your name",
    "who built you",
    "who developed you",
    "creator",
    "create you",
    "make you",
    "about yourself",
    "your purpose",
];

const SEARCH_PHRASES: &[&str] = &[
    "latest",
    "current",
    "today's news",
    "what is the price of",
    "what is the stock",
    "search for",
    "find information on",
];

/// Match the utterance against the phrase triggers.
///
/// Identity phrases are checked before search phrases.
pub fn keyword_match(utterance: &str) -> Option<IntentCategory> {
    let lower = utterance.to_lowercase();
    if IDENTITY_PHRASES.iter().any(|p| lower.contains(p)) {
        return Some(IntentCategory::Identity);
    }
    if SEARCH_PHRASES.iter().any(|p| lower.contains(p)) {
        return Some(IntentCategory::Search);
    }
    None
}

// =============================================================================
// Layer 3: word-boundary scan
// =============================================================================

static FALLBACK_PATTERNS: LazyLock<Vec<(IntentCategory, Regex)>> = LazyLock::new(|| {
    let mk = |category: IntentCategory, pattern: &str| {
        (
            category,
            Regex::new(pattern).expect("Invalid fallback regex"),
        )
    };
    vec![
        mk(
            IntentCategory::Image,
            r"(?i)\b(?:images?|pictures?|photos?|draw|drawing|sketch|illustrations?)\b",
        ),
        mk(IntentCategory::Search, r"(?i)\b(?:news|headlines?)\b"),
        mk(
            IntentCategory::Summarize,
            r"(?i)\b(?:summari[sz]e|summary)\b|(?i)\btl;?dr\b",
        ),
        mk(
            IntentCategory::Code,
            r"(?i)\b(?:code|functions?|scripts?|programs?|snippets?)\b|```",
        ),
    ]
});

/// Deterministic scan used when the router model cannot decide.
pub fn fallback_scan(utterance: &str) -> IntentCategory {
    FALLBACK_PATTERNS
        .iter()
        .find(|(_, re)| re.is_match(utterance))
        .map(|(category, _)| *category)
        .unwrap_or(IntentCategory::Chat)
}

// =============================================================================
// Layer 2: router model
// =============================================================================

/// Normalize a router reply to a category token.
///
/// Trims, lowercases, keeps the first word and strips quoting and
/// punctuation around it. Returns `None` for anything outside the set.
pub fn normalize_label(raw: &str) -> Option<IntentCategory> {
    let lower = raw.trim().to_lowercase();
    let token = lower.split_whitespace().next()?;
    let token: String = token
        .trim_matches(|c: char| !c.is_alphanumeric() && c != '_')
        .chars()
        .filter(|c| !matches!(c, '\'' | '"' | '`'))
        .collect();
    token.parse().ok()
}

// =============================================================================
// Classifier
// =============================================================================

/// Classifies utterances into intent categories.
#[derive(Clone, Debug)]
pub struct Classifier {
    router: ModelHandle,
    router_timeout: Duration,
    identity_answer: Option<String>,
}

impl Classifier {
    pub fn new(router: ModelHandle, router_timeout: Duration) -> Self {
        Self {
            router,
            router_timeout,
            identity_answer: None,
        }
    }

    /// Attach a canned answer returned for identity phrase matches.
    pub fn with_identity_answer(mut self, answer: Option<String>) -> Self {
        self.identity_answer = answer.filter(|a| !a.trim().is_empty());
        self
    }

    /// Classify one utterance. Never fails.
    pub async fn classify(&self, utterance: &str) -> Classification {
        if let Some(category) = keyword_match(utterance) {
            debug!(%category, "Classified by keyword");
            return match (&self.identity_answer, category) {
                (Some(answer), IntentCategory::Identity) => {
                    Classification::answered(category, answer.clone())
                }
                _ => Classification::new(category, ClassificationSource::Keyword),
            };
        }

        if self.router.is_configured() {
            match self.route(utterance).await {
                Some(category) => {
                    debug!(%category, model = self.router.model(), "Classified by router model");
                    return Classification::new(category, ClassificationSource::Model);
                }
                None => debug!("Router model gave no usable category"),
            }
        }

        let category = fallback_scan(utterance);
        debug!(%category, "Classified by fallback scan");
        Classification::new(category, ClassificationSource::Fallback)
    }

    async fn route(&self, utterance: &str) -> Option<IntentCategory> {
        let call = self.router.ask(prompts::ROUTER, utterance);
        match tokio::time::timeout(self.router_timeout, call).await {
            Ok(Ok(reply)) => {
                let category = normalize_label(&reply);
                if category.is_none() {
                    let preview: String = reply.chars().take(40).collect();
                    warn!(reply = %preview, "Router returned an invalid category");
                }
                category
            }
            Ok(Err(e)) => {
                warn!(error = %e, "Router model call failed");
                None
            }
            Err(_) => {
                warn!(timeout_secs = self.router_timeout.as_secs_f32(), "Router model timed out");
                None
            }
        }
    }
}
