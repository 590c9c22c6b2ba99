use std::time::Duration;

use thiserror::Error;

pub type SourceResult<T> = std::result::Result<T, SourceError>;

/// Failure of a single external source. Never crosses the orchestrator or
/// deep-research boundary; callers collapse it into an empty value.
#[derive(Debug, Clone, Error)]
pub enum SourceError {
    /// No key configured. No network call was attempted.
    #[error("{0} is not configured")]
    Unavailable(&'static str),

    #[error("timed out after {}ms", .0.as_millis())]
    Timeout(Duration),

    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    #[error("malformed response: {0}")]
    Malformed(String),

    #[error("network error: {0}")]
    Network(String),
}

impl SourceError {
    /// Whether this error should be recorded against the source.
    /// A missing key means "not attempted", which is not a failure.
    pub fn is_failure(&self) -> bool {
        !matches!(self, SourceError::Unavailable(_))
    }
}

impl From<reqwest::Error> for SourceError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SourceError::Malformed(err.to_string())
        } else {
            SourceError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SourceError {
    fn from(err: serde_json::Error) -> Self {
        SourceError::Malformed(err.to_string())
    }
}

#[derive(Error, Debug)]
pub enum NexusError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}
