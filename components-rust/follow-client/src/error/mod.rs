//! Client error types.

use thiserror::Error;

/// Result type for calls against the backend.
pub type ClientResult<T> = Result<T, ClientError>;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("HTTP error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("HTTP error! status: {status} - {body}")]
    Status { status: u16, body: String },

    #[error("HTTP error! status: 403 - {body}")]
    Forbidden { body: String },

    #[error("conflict: {message}")]
    Conflict { message: String },

    #[error("failed to decode response: {0}")]
    Decode(#[from] serde_json::Error),

    #[error("empty response from {0}")]
    EmptyResponse(String),

    #[error("authentication token not available")]
    MissingToken,

    #[error("malformed identity token: {0}")]
    InvalidToken(String),

    #[error("{0}")]
    Upload(String),

    #[error("user {0} is not listed")]
    NotListed(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ClientError {
    /// Returns true for a 403 from the backend.
    pub fn is_forbidden(&self) -> bool {
        match self {
            ClientError::Forbidden { .. } => true,
            ClientError::Status { status, .. } => *status == 403,
            ClientError::Transport(e) => e.status().is_some_and(|s| s.as_u16() == 403),
            _ => false,
        }
    }

    /// Server message of a 409 response, if this is one.
    pub fn conflict_message(&self) -> Option<&str> {
        match self {
            ClientError::Conflict { message } => Some(message.as_str()),
            _ => None,
        }
    }
}
