use reqwest::StatusCode;
use thiserror::Error;

use crate::domain::outcome::{FailureKind, FieldErrors};

#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("Authentication required")]
    Unauthenticated,

    #[error("Access denied: {0}")]
    Unauthorized(String),

    #[error("Entity not found")]
    NotFound,

    #[error("Validation error: {}", message.as_deref().unwrap_or("invalid input"))]
    Validation {
        field_errors: FieldErrors,
        message: Option<String>,
    },

    #[error("Server error ({status}): {message}")]
    Server { status: u16, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Malformed response: {0}")]
    Decode(String),
}

pub type RepositoryResult<T> = Result<T, RepositoryError>;

impl RepositoryError {
    /// Failure class for everything except validation.
    pub fn failure_kind(&self) -> FailureKind {
        match self {
            RepositoryError::Unauthenticated | RepositoryError::Unauthorized(_) => {
                FailureKind::Auth
            }
            RepositoryError::NotFound => FailureKind::StaleTarget,
            _ => FailureKind::Transport,
        }
    }

    /// Maps a non-success status without a usable error body.
    pub fn from_status(status: StatusCode, message: impl Into<String>) -> Self {
        let message = message.into();
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                RepositoryError::Unauthorized(message)
            }
            StatusCode::NOT_FOUND => RepositoryError::NotFound,
            StatusCode::UNPROCESSABLE_ENTITY => RepositoryError::Validation {
                field_errors: FieldErrors::new(),
                message: Some(message).filter(|m| !m.is_empty()),
            },
            _ => RepositoryError::Server {
                status: status.as_u16(),
                message,
            },
        }
    }
}

impl From<reqwest::Error> for RepositoryError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_decode() {
            RepositoryError::Decode(err.to_string())
        } else if let Some(status) = err.status() {
            RepositoryError::from_status(status, err.to_string())
        } else {
            RepositoryError::Transport(err.to_string())
        }
    }
}

impl From<serde_json::Error> for RepositoryError {
    fn from(err: serde_json::Error) -> Self {
        RepositoryError::Decode(err.to_string())
    }
}

impl From<url::ParseError> for RepositoryError {
    fn from(err: url::ParseError) -> Self {
        RepositoryError::Transport(format!("Invalid resource url: {err}"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn statuses_map_to_error_classes() {
        assert!(matches!(
            RepositoryError::from_status(StatusCode::UNAUTHORIZED, "expired"),
            RepositoryError::Unauthorized(_)
        ));
        assert!(matches!(
            RepositoryError::from_status(StatusCode::NOT_FOUND, ""),
            RepositoryError::NotFound
        ));
        assert!(matches!(
            RepositoryError::from_status(StatusCode::UNPROCESSABLE_ENTITY, ""),
            RepositoryError::Validation { message: None, .. }
        ));
        assert!(matches!(
            RepositoryError::from_status(StatusCode::BAD_GATEWAY, "upstream"),
            RepositoryError::Server { status: 502, .. }
        ));
    }

    #[test]
    fn failure_kinds_separate_auth_and_stale_targets() {
        assert_eq!(
            RepositoryError::Unauthenticated.failure_kind(),
            FailureKind::Auth
        );
        assert_eq!(RepositoryError::NotFound.failure_kind(), FailureKind::StaleTarget);
        assert_eq!(
            RepositoryError::Transport("timeout".into()).failure_kind(),
            FailureKind::Transport
        );
    }
}
