use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Typed failure categories surfaced through every entry point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    UserCancelled,
    NoMatch,
    PermissionDenied,
    BackendFault,
    DuplicateLoad,
    EntryPointNotFound,
    ManifestInvalid,
    DepthExceeded,
}

/// Custom error type for STARNET operations.
#[derive(Debug, Error)]
pub enum StarError {
    /// Operator typed the cancellation sentinel or declined to continue.
    #[error("User Exited")]
    UserCancelled,

    /// Search or listing was exhausted without a usable match.
    #[error("No {entity} found")]
    NoMatch { entity: String },

    /// A scoped lookup hit an entity owned by another principal.
    #[error("You do not have permission to {operation} this {entity}. It was created by another avatar.")]
    PermissionDenied { operation: String, entity: String },

    /// A collaborator (store, search, wasm engine) failed.
    #[error("Backend error: {0}")]
    Backend(String),

    /// A plugin with the same name already holds a loaded handle.
    #[error("Plugin '{0}' is already loaded")]
    DuplicateLoad(String),

    /// No module under the plugin's output path implements the plugin contract.
    #[error("No entry point found for plugin '{plugin}': {reason}")]
    EntryPointNotFound { plugin: String, reason: String },

    /// Plugin manifest missing or unreadable.
    #[error("Invalid plugin manifest at {}: {reason}", path.display())]
    ManifestInvalid { path: PathBuf, reason: String },

    /// Nested creation went deeper than the configured bound.
    #[error("Dependency nesting exceeded the maximum depth of {max}")]
    DepthExceeded { max: usize },
}

impl StarError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StarError::UserCancelled => ErrorKind::UserCancelled,
            StarError::NoMatch { .. } => ErrorKind::NoMatch,
            StarError::PermissionDenied { .. } => ErrorKind::PermissionDenied,
            StarError::Backend(_) => ErrorKind::BackendFault,
            StarError::DuplicateLoad(_) => ErrorKind::DuplicateLoad,
            StarError::EntryPointNotFound { .. } => ErrorKind::EntryPointNotFound,
            StarError::ManifestInvalid { .. } => ErrorKind::ManifestInvalid,
            StarError::DepthExceeded { .. } => ErrorKind::DepthExceeded,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, StarError::UserCancelled)
    }
}

impl From<std::io::Error> for StarError {
    fn from(err: std::io::Error) -> Self {
        StarError::Backend(format!("I/O error: {}", err))
    }
}

impl From<serde_json::Error> for StarError {
    fn from(err: serde_json::Error) -> Self {
        StarError::Backend(format!("JSON serialization error: {}", err))
    }
}

impl From<wasmtime::Error> for StarError {
    fn from(err: wasmtime::Error) -> Self {
        StarError::Backend(format!("wasm runtime error: {:#}", err))
    }
}
