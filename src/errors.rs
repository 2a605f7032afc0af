//! Error types for the notebox application.
//!
//! This module defines the error taxonomy shared by the store adapter, the
//! note repository, the theme state and the command-line front end.

use std::io;

use thiserror::Error;

/// The main error type for the notebox application.
#[derive(Error, Debug)]
pub enum NoteboxError {
    /// Errors related to file I/O operations.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Errors related to serialization/deserialization operations.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The underlying key-value store rejected a read or write
    /// (quota exceeded, storage disabled, read-only medium).
    #[error("Storage unavailable for key '{key}': {message}")]
    StorageUnavailable { key: String, message: String },

    /// Persisted data did not parse or did not have the expected shape.
    #[error("Malformed data stored under '{key}': {message}")]
    MalformedPersistedData { key: String, message: String },

    /// Note was not found when performing an operation.
    #[error("Note not found: {id}")]
    NoteNotFound { id: u64 },

    /// Theme name is not part of the registry.
    #[error("Unknown theme: {name}")]
    ThemeNotFound { name: String },

    /// Invalid arguments supplied by the caller.
    #[error("Invalid input: {message}")]
    InvalidInput { message: String },

    /// Errors related to configuration.
    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("{message}")]
    EditorError { message: String },

    /// A failure raised while presenting data, caught by the error boundary.
    #[error("Render error: {message}")]
    UnhandledRenderError { message: String },
}

impl NoteboxError {
    /// Shorthand for building a [`NoteboxError::StorageUnavailable`].
    pub fn storage(key: &str, message: impl Into<String>) -> Self {
        NoteboxError::StorageUnavailable {
            key: key.to_string(),
            message: message.into(),
        }
    }

    /// Whether this error means the store itself could not be used.
    pub fn is_storage_failure(&self) -> bool {
        matches!(self, NoteboxError::StorageUnavailable { .. })
    }
}
