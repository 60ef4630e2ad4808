//! The uniform result shape returned by every public entry point.
//!
//! Internals use `Result<T, StarError>` and `?`; `OpResult` is what callers
//! (CLI handlers, JSON output, plugins) see at the boundary.

use serde::Serialize;

use crate::error::{ErrorKind, StarError};

/// `{is_error, is_warning, message, value}` plus the typed failure kind.
#[derive(Debug, Clone, Serialize)]
pub struct OpResult<T> {
    pub is_error: bool,
    pub is_warning: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ErrorKind>,
    pub value: Option<T>,
}

impl<T> OpResult<T> {
    pub fn ok(value: T) -> Self {
        Self {
            is_error: false,
            is_warning: false,
            message: String::new(),
            kind: None,
            value: Some(value),
        }
    }

    pub fn warning(value: T, message: impl Into<String>) -> Self {
        Self {
            is_error: false,
            is_warning: true,
            message: message.into(),
            kind: None,
            value: Some(value),
        }
    }

    pub fn error(err: &StarError) -> Self {
        Self {
            is_error: true,
            is_warning: false,
            message: err.to_string(),
            kind: Some(err.kind()),
            value: None,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Attach a value to a failed result (e.g. the partial dependency graph).
    pub fn with_value(mut self, value: T) -> Self {
        self.value = Some(value);
        self
    }

    pub fn is_ok(&self) -> bool {
        !self.is_error && self.value.is_some()
    }
}

impl<T> From<Result<T, StarError>> for OpResult<T> {
    fn from(result: Result<T, StarError>) -> Self {
        match result {
            Ok(value) => OpResult::ok(value),
            Err(err) => OpResult::error(&err),
        }
    }
}
