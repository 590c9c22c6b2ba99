use thiserror::Error;

pub type Result<T> = std::result::Result<T, SocialApiError>;

#[derive(Debug, Error)]
pub enum SocialApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

impl From<reqwest::Error> for SocialApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            SocialApiError::Parse(err.to_string())
        } else {
            SocialApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for SocialApiError {
    fn from(err: serde_json::Error) -> Self {
        SocialApiError::Parse(err.to_string())
    }
}
