use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::error::{AprimeError, Result};

/// Top-level configuration for the A-Prime backend.
///
/// Loaded from `~/.aprime/config.toml` by default. Provider API keys may be
/// left out of the file and supplied through the environment instead.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AprimeConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub chat: ChatConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl AprimeConfig {
    /// Load configuration from a TOML file.
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: AprimeConfig = toml::from_str(&content)?;
        info!("Configuration loaded from {}", path.display());
        Ok(config)
    }

    /// Load configuration from a TOML file, falling back to defaults if the
    /// file does not exist or cannot be parsed.
    pub fn load_or_default(path: &Path) -> Self {
        match Self::load(path) {
            Ok(config) => config,
            Err(e) => {
                warn!(
                    "Failed to load config from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                Self::default()
            }
        }
    }

    /// Save the current configuration to a TOML file.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AprimeError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        info!("Configuration saved to {}", path.display());
        Ok(())
    }

    /// Check cross-field constraints that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        let chat = &self.chat;
        if chat.max_session_messages <= chat.context_window {
            return Err(AprimeError::Config(format!(
                "chat.max_session_messages ({}) must be greater than chat.context_window ({})",
                chat.max_session_messages, chat.context_window
            )));
        }
        if chat.max_message_chars == 0 {
            return Err(AprimeError::Config(
                "chat.max_message_chars must be positive".to_string(),
            ));
        }
        if self.providers.request_timeout_secs == 0 || self.providers.router_timeout_secs == 0 {
            return Err(AprimeError::Config(
                "provider timeouts must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// General application settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    /// Data directory holding the SQLite database.
    pub data_dir: String,
    /// Log level: trace, debug, info, warn, error.
    pub log_level: String,
    /// API server port.
    pub port: u16,
    /// Persona file read once at startup for identity answers.
    pub identity_context_path: Option<String>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            data_dir: "~/.aprime/data".to_string(),
            log_level: "info".to_string(),
            port: 8000,
            identity_context_path: None,
        }
    }
}

/// Conversation limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ChatConfig {
    /// Number of prior messages handed to a handler.
    pub context_window: usize,
    /// Hard ceiling on persisted messages per session.
    pub max_session_messages: usize,
    /// Longest accepted user message, in characters.
    pub max_message_chars: usize,
    /// Canned reply for identity questions. When unset, identity questions
    /// are answered by the model from the persona file.
    pub identity_answer: Option<String>,
}

impl Default for ChatConfig {
    fn default() -> Self {
        Self {
            context_window: 20,
            max_session_messages: 50,
            max_message_chars: 8000,
            identity_answer: None,
        }
    }
}

/// External backend settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProvidersConfig {
    /// Upper bound for one handler call.
    pub request_timeout_secs: u64,
    /// Upper bound for the routing model call.
    pub router_timeout_secs: u64,
    #[serde(default)]
    pub groq: GroqConfig,
    #[serde(default)]
    pub tavily: TavilyConfig,
    #[serde(default)]
    pub stability: StabilityConfig,
}

impl Default for ProvidersConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: 60,
            router_timeout_secs: 10,
            groq: GroqConfig::default(),
            tavily: TavilyConfig::default(),
            stability: StabilityConfig::default(),
        }
    }
}

impl ProvidersConfig {
    /// Fill in API keys missing from the file from the process environment.
    pub fn apply_env(&mut self) {
        self.apply_env_with(|key| std::env::var(key).ok());
    }

    /// Fill in missing API keys using `lookup` (`GROQ_API_KEY`,
    /// `TAVILY_API_KEY`, `STABILITY_API_KEY`). Keys set in the file win.
    pub fn apply_env_with<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let fill = |slot: &mut Option<String>, var: &str| {
            if slot.as_deref().map_or(true, str::is_empty) {
                *slot = lookup(var).filter(|v| !v.trim().is_empty());
            }
        };
        fill(&mut self.groq.api_key, "GROQ_API_KEY");
        fill(&mut self.tavily.api_key, "TAVILY_API_KEY");
        fill(&mut self.stability.api_key, "STABILITY_API_KEY");
    }
}

/// OpenAI-compatible chat completion backend (Groq).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GroqConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// Model used by the generative handlers.
    pub model: String,
    /// Low-latency model used for intent routing.
    pub router_model: String,
}

impl Default for GroqConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.groq.com/openai/v1".to_string(),
            model: "gemma2-9b-it".to_string(),
            router_model: "gemma2-9b-it".to_string(),
        }
    }
}

/// Web search backend (Tavily).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TavilyConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    /// "basic" or "advanced".
    pub search_depth: String,
    pub max_results: u32,
}

impl Default for TavilyConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.tavily.com".to_string(),
            search_depth: "basic".to_string(),
            max_results: 5,
        }
    }
}

/// Image generation backend (Stability AI).
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StabilityConfig {
    pub api_key: Option<String>,
    /// Full endpoint URL of the generation route.
    pub base_url: String,
    /// "png", "jpeg" or "webp".
    pub output_format: String,
}

impl Default for StabilityConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: "https://api.stability.ai/v2beta/stable-image/generate/core".to_string(),
            output_format: "png".to_string(),
        }
    }
}
