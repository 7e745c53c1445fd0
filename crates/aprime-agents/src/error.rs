//! Error types for handlers and their backends.

/// User-facing message when no Groq key is configured.
pub const GROQ_NOT_CONFIGURED: &str =
    "Error: Groq API key is not configured. Text generation is disabled.";

/// User-facing message when no Tavily key is configured.
pub const TAVILY_NOT_CONFIGURED: &str = "Error: Tavily API key is not configured for web search.";

/// User-facing message when no Stability key is configured.
pub const STABILITY_NOT_CONFIGURED: &str =
    "Error: Stability AI API key not found. Image generation is disabled.";

/// Errors from handler execution and backend calls.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// A capability is disabled. The message is safe to show to the user.
    #[error("{0}")]
    Configuration(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("Upstream returned {status}: {message}")]
    Upstream { status: u16, message: String },
    #[error("Invalid upstream response: {0}")]
    InvalidResponse(String),
    #[error("Invalid payload: {0}")]
    InvalidPayload(String),
}

impl HandlerError {
    /// Whether a later attempt could succeed: connection failures, timeouts,
    /// rate limiting and 5xx responses.
    pub fn is_retryable(&self) -> bool {
        match self {
            HandlerError::Network(_) => true,
            HandlerError::Upstream { status, .. } => *status == 429 || *status >= 500,
            _ => false,
        }
    }

    pub fn is_configuration(&self) -> bool {
        matches!(self, HandlerError::Configuration(_))
    }
}

impl From<reqwest::Error> for HandlerError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            HandlerError::InvalidResponse(err.to_string())
        } else if let Some(status) = err.status() {
            HandlerError::Upstream {
                status: status.as_u16(),
                message: err.to_string(),
            }
        } else {
            HandlerError::Network(err.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_handler_error_display() {
        let err = HandlerError::Configuration(GROQ_NOT_CONFIGURED.to_string());
        assert_eq!(err.to_string(), GROQ_NOT_CONFIGURED);

        let err = HandlerError::Upstream {
            status: 503,
            message: "overloaded".to_string(),
        };
        assert_eq!(err.to_string(), "Upstream returned 503: overloaded");

        let err = HandlerError::Network("connection reset".to_string());
        assert_eq!(err.to_string(), "Network error: connection reset");

        let err = HandlerError::InvalidPayload("expected text".to_string());
        assert_eq!(err.to_string(), "Invalid payload: expected text");
    }

    #[test]
    fn test_is_retryable() {
        assert!(HandlerError::Network("timeout".into()).is_retryable());
        assert!(HandlerError::Upstream {
            status: 429,
            message: String::new()
        }
        .is_retryable());
        assert!(HandlerError::Upstream {
            status: 502,
            message: String::new()
        }
        .is_retryable());
        assert!(!HandlerError::Upstream {
            status: 401,
            message: String::new()
        }
        .is_retryable());
        assert!(!HandlerError::Configuration("off".into()).is_retryable());
        assert!(!HandlerError::InvalidResponse("empty".into()).is_retryable());
    }

    #[test]
    fn test_is_configuration() {
        assert!(HandlerError::Configuration(TAVILY_NOT_CONFIGURED.into()).is_configuration());
        assert!(!HandlerError::Network("x".into()).is_configuration());
    }
}
