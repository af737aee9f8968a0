use thiserror::Error;

pub type Result<T> = std::result::Result<T, TaskboardError>;

/// Message shown when a failure carries nothing a user could read.
pub const UNEXPECTED_ERROR_MESSAGE: &str = "An unexpected error occurred";

#[derive(Debug, Error)]
pub enum TaskboardError {
    /// Failure reported by the transport layer, with the HTTP status and
    /// whatever message the server put in the response body.
    #[error("Request failed (HTTP {status}): {message}")]
    Transport { status: u16, message: String },

    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },

    #[error("{message}")]
    Unknown { message: String },

    #[error("Invalid identifier: {0}")]
    InvalidId(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl TaskboardError {
    pub fn transport(status: u16, message: impl Into<String>) -> Self {
        Self::Transport {
            status,
            message: message.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn unknown(message: impl Into<String>) -> Self {
        Self::Unknown {
            message: message.into(),
        }
    }

    /// Returns `true` when the server refused the session (HTTP 401).
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Self::Transport { status: 401, .. })
    }

    /// Extracts the message a store exposes through its `error` field.
    ///
    /// Prefers the message the server sent, then the error's own message,
    /// and finally [`UNEXPECTED_ERROR_MESSAGE`] when neither has any text.
    pub fn user_message(&self) -> String {
        let message = match self {
            Self::Transport { message, .. } => message.clone(),
            Self::Validation { message, .. } => message.clone(),
            Self::Unknown { message } => message.clone(),
            other => other.to_string(),
        };

        if message.trim().is_empty() {
            UNEXPECTED_ERROR_MESSAGE.to_string()
        } else {
            message
        }
    }
}
