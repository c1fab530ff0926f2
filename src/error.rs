//! Error types for docverify

use thiserror::Error;

#[derive(Error, Debug)]
pub enum VerifyError {
    #[error("Not signed in. Log in and verify the OTP first")]
    NotAuthenticated,

    #[error("Session for '{0}' has expired. Please log in again")]
    SessionExpired(String),

    #[error("API error (status {status_code}): {message}")]
    ApiError {
        status_code: u16,
        message: String,
    },

    #[error("Failed to parse documents from {origin}: {source}")]
    DocumentParse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid action policy '{0}'. Expected 'retain' or 'remove'")]
    InvalidActionPolicy(String),

    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl VerifyError {
    /// Text suitable for the user-facing message list, if the error carries any.
    ///
    /// API errors with an empty body yield `None` so callers can fall back to
    /// their own wording.
    pub fn user_message(&self) -> Option<String> {
        match self {
            VerifyError::ApiError { message, .. } if message.trim().is_empty() => None,
            VerifyError::ApiError { message, .. } => Some(message.clone()),
            other => Some(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, VerifyError>;
