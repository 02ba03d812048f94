use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Game API error ({status}): {message}")]
    ServerError { status: u16, message: String },

    #[error("Game API is offline or unreachable")]
    Offline,

    #[error("Request timed out")]
    Timeout,

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl ApiError {
    /// Transport-level failure: the game could not be reached or refused
    /// the request. Everything except a malformed payload.
    pub fn is_unavailable(&self) -> bool {
        !matches!(self, ApiError::Serialization(_))
    }
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout
        } else if err.is_connect() {
            ApiError::Offline
        } else if err.is_decode() {
            ApiError::Serialization(err.to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        ApiError::Serialization(err.to_string())
    }
}
