//! Error types for repository operations.

use std::path::{Path, PathBuf};

use thiserror::Error;

use super::messages::MessageContainer;

/// Errors that can occur while parsing, resolving or storing models.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Malformed qualifier text or identifier.
    #[error("Malformed qualifier '{text}': {reason}")]
    Parse { text: String, reason: String },

    /// An item, model, file or object reference could not be resolved.
    #[error("{kind} not found: {name}")]
    NotFound { kind: &'static str, name: String },

    /// An add collided with an existing name.
    #[error("{kind} '{name}' already exists")]
    DuplicateName { kind: &'static str, name: String },

    /// A mutating call reached a read-only backend.
    #[error("Operation '{operation}' is not supported by the {backend} store")]
    UnsupportedOperation {
        operation: &'static str,
        backend: &'static str,
    },

    /// Aggregated messages produced by a reload, reset or initialization.
    #[error("Validation failed:\n{0}")]
    ValidationFailed(MessageContainer),

    /// A multiplexed add found no backend willing to accept the model.
    #[error("No writable backend accepted model '{0}'")]
    NoWritableBackend(String),

    /// Resolution was requested on a model whose imports are not resolved.
    #[error("Model '{0}' has unresolved imports")]
    Unresolved(String),

    /// IO error while reading or writing a store.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted descriptor or item file could not be read or written.
    #[error("Descriptor error in {}: {message}", path.display())]
    Descriptor { path: PathBuf, message: String },

    /// A model-selection pattern is not a valid glob.
    #[error("Invalid model filter pattern '{pattern}': {message}")]
    InvalidPattern { pattern: String, message: String },
}

impl RepositoryError {
    /// Create a qualifier parse error.
    pub fn parse(text: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            text: text.into(),
            reason: reason.into(),
        }
    }

    /// Create a not-found error for the given kind of object.
    pub fn not_found(kind: &'static str, name: impl Into<String>) -> Self {
        Self::NotFound {
            kind,
            name: name.into(),
        }
    }

    /// Create a duplicate-name error for the given kind of object.
    pub fn duplicate(kind: &'static str, name: impl Into<String>) -> Self {
        Self::DuplicateName {
            kind,
            name: name.into(),
        }
    }

    /// Create an unsupported-operation error for a read-only backend.
    pub fn unsupported(operation: &'static str, backend: &'static str) -> Self {
        Self::UnsupportedOperation { operation, backend }
    }

    /// Create a descriptor error for the given file.
    pub fn descriptor(path: &Path, message: impl Into<String>) -> Self {
        Self::Descriptor {
            path: path.to_path_buf(),
            message: message.into(),
        }
    }

    /// Returns true if the caller may recover by retrying or treating the
    /// absence as "create new".
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::NotFound { .. } | Self::DuplicateName { .. })
    }

    /// Returns true for `NotFound` errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, RepositoryError>;
