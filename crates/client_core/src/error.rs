use thiserror::Error;

use crate::strings;

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("invalid API base url '{url}': {reason}")]
    InvalidBaseUrl { url: String, reason: String },
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {}", .message.as_deref().unwrap_or("no error message"))]
    Api {
        status: u16,
        message: Option<String>,
    },
    #[error("unexpected response body: {0}")]
    Decode(#[from] serde_json::Error),
}

impl ClientError {
    /// The `error` field the backend put in its response body, if any.
    pub fn server_message(&self) -> Option<&str> {
        match self {
            Self::Api {
                message: Some(message),
                ..
            } => Some(message),
            _ => None,
        }
    }
}

/// Conditions a respondent can see. None of them end the session.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SessionError {
    #[error("{}", strings::INVALID_LINK)]
    InvalidLink,
    #[error("{0}")]
    LoadFailure(String),
    #[error("{0}")]
    SaveFailure(String),
}

impl SessionError {
    pub fn load_failure(err: &ClientError) -> Self {
        Self::LoadFailure(
            err.server_message()
                .unwrap_or(strings::LOAD_FAILED_FALLBACK)
                .to_string(),
        )
    }

    pub fn save_failure(err: &ClientError) -> Self {
        Self::SaveFailure(
            err.server_message()
                .unwrap_or(strings::SAVE_FAILED_FALLBACK)
                .to_string(),
        )
    }

    pub fn message(&self) -> String {
        self.to_string()
    }
}
