use thiserror::Error;

/// Top-level error type for the A-Prime backend.
///
/// Subsystem crates define their own error types and convert into or out of
/// `AprimeError` at their boundaries. `Storage` is the only variant that is
/// allowed to fail a whole chat request.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum AprimeError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for AprimeError {
    fn from(err: toml::de::Error) -> Self {
        AprimeError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for AprimeError {
    fn from(err: toml::ser::Error) -> Self {
        AprimeError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for AprimeError {
    fn from(err: serde_json::Error) -> Self {
        AprimeError::Serialization(err.to_string())
    }
}

/// A specialized `Result` type for A-Prime operations.
pub type Result<T> = std::result::Result<T, AprimeError>;
