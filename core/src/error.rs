//! Error types for the Mocker API client.
//!
//! # Design
//! `Transport` covers every failure where no response arrived (connect
//! errors, the request timeout). `Http` carries the status of a non-2xx
//! response together with the `detail`/`message` field the server put in its
//! JSON body, when there was one. Stores turn either into a user-facing
//! string with [`ApiError::user_message`].

use thiserror::Error;

#[derive(Debug, Clone, Error)]
pub enum ApiError {
    /// No response was received: connection failure or timeout.
    #[error("{0}")]
    Transport(String),

    /// The server answered with a non-2xx status.
    #[error("{message}")]
    Http {
        status: u16,
        message: String,
        detail: Option<String>,
    },

    /// The response body could not be deserialized into the expected type.
    #[error("deserialization failed: {0}")]
    Deserialization(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// A configuration value could not be used.
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl ApiError {
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// The server-supplied `detail` (or `message`) field, if any.
    pub fn detail(&self) -> Option<&str> {
        match self {
            ApiError::Http { detail, .. } => detail.as_deref(),
            _ => None,
        }
    }

    pub fn is_not_found(&self) -> bool {
        self.status() == Some(404)
    }

    /// Best available human-readable message: server detail, then the
    /// error's own message, then `fallback`.
    pub fn user_message(&self, fallback: &str) -> String {
        if let Some(detail) = self.detail().filter(|d| !d.is_empty()) {
            return detail.to_string();
        }
        let message = self.to_string();
        if message.is_empty() {
            fallback.to_string()
        } else {
            message
        }
    }
}
