use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    /// No handler is registered for the intent name.
    UnknownIntent,
    /// The request named no intent at all.
    Validation,
}

/// Error body returned by the fulfillment endpoint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code:?}: {message}")]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    pub fn unknown_intent(name: &str) -> Self {
        Self::new(
            ErrorCode::UnknownIntent,
            format!("no handler for intent '{name}'"),
        )
    }

    pub fn missing_intent() -> Self {
        Self::new(ErrorCode::Validation, "request names no intent")
    }
}
