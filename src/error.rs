use thiserror::Error;

/// Custom error type for comment classification.
#[derive(Debug, Error)]
pub enum CommentAiError {
    /// Static configuration is invalid (grouping schemes, thresholds, config files).
    ///
    /// Raised at startup or first use, never per request.
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Input validation failed (malformed batch request or probability vector).
    #[error("Validation error: {0}")]
    Validation(String),

    /// The probability oracle could not produce a vector.
    #[error("Oracle error: {message}")]
    Oracle {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Reading an input or configuration file failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl CommentAiError {
    /// Oracle failure without an underlying source error.
    pub fn oracle(message: impl Into<String>) -> Self {
        CommentAiError::Oracle {
            message: message.into(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for CommentAiError {
    fn from(err: serde_json::Error) -> Self {
        CommentAiError::Validation(format!("JSON error: {}", err))
    }
}

impl From<toml::de::Error> for CommentAiError {
    fn from(err: toml::de::Error) -> Self {
        CommentAiError::Configuration(format!("TOML error: {}", err))
    }
}

impl From<std::io::Error> for CommentAiError {
    fn from(err: std::io::Error) -> Self {
        CommentAiError::Io(err.to_string())
    }
}

impl From<anyhow::Error> for CommentAiError {
    fn from(err: anyhow::Error) -> Self {
        CommentAiError::Oracle {
            message: format!("{:#}", err),
            source: None,
        }
    }
}
