//! Handler error taxonomy and the `{data?, error?}` result shape.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures reported by the request handlers in [`crate::actions`].
///
/// The `Display` output is the human-readable message shown to callers.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Input failed a length, type, or positivity rule.
    #[error("{0}")]
    Validation(String),

    /// An AI collaborator rejected or returned an unusable payload.
    #[error("{what} failed: {message}")]
    Dependency { what: &'static str, message: String },

    /// Read, write, or parse failure against the record store. The message
    /// is generic; the cause is logged where the error is created.
    #[error("{0}")]
    Storage(String),

    #[error("{0}")]
    NotFound(String),
}

impl ActionError {
    pub fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub fn dependency(what: &'static str, cause: &anyhow::Error) -> Self {
        Self::Dependency {
            what,
            message: format!("{:#}", cause),
        }
    }

    /// Logs `cause` and returns a storage error carrying only `message`.
    pub fn storage(message: impl Into<String>, cause: &anyhow::Error) -> Self {
        let message = message.into();
        tracing::error!(error = %format!("{:#}", cause), "{}", message);
        Self::Storage(message)
    }
}

/// Uniform result shape: exactly one of `data` and `error` is set.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ActionResult<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> From<Result<T, ActionError>> for ActionResult<T> {
    fn from(result: Result<T, ActionError>) -> Self {
        match result {
            Ok(data) => Self {
                data: Some(data),
                error: None,
            },
            Err(e) => Self {
                data: None,
                error: Some(e.to_string()),
            },
        }
    }
}
