use thiserror::Error;

/// Failures talking to the storefront REST API.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("Transport error: {0}")]
    Transport(String),
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
    #[error("Request rejected with status {status}: {message}")]
    Rejected { status: u16, message: String },
    #[error("Invalid response body: {0}")]
    Decode(String),
}

impl ApiError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, ApiError::Unauthorized(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_decode() {
            ApiError::Decode(e.to_string())
        } else {
            ApiError::Transport(e.to_string())
        }
    }
}
