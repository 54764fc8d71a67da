/// Error types for the Machine Translation module
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MtError {
    /// Missing or rejected credentials, bad request parameters
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Transport-level failure (connection, timeout, TLS)
    #[error("Network error: {0}")]
    NetworkError(String),
    /// The service throttled the request (HTTP 429)
    #[error("Rate limited: {0}")]
    RateLimited(String),
    /// Server error or malformed response
    #[error("Translation error: {0}")]
    TranslationError(String),
    /// Locale code is empty or contains unexpected characters
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),
}

impl From<reqwest::Error> for MtError {
    fn from(err: reqwest::Error) -> Self {
        MtError::NetworkError(err.to_string())
    }
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;
