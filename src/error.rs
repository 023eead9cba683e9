//! Error types for the Shrike library.
//!
//! All fallible operations in the crate return [`Result`], whose error type
//! is the [`ShrikeError`] enum. Constructor helpers exist for the common
//! cases so call sites stay short.

use std::io;

use thiserror::Error;

/// The main error type for Shrike operations.
#[derive(Error, Debug)]
pub enum ShrikeError {
    /// I/O errors (file operations, directory access, etc.)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Index-related errors, including failed write actions.
    #[error("Index error: {0}")]
    Index(String),

    /// Analysis-related errors (tokenization, analyzer construction).
    #[error("Analysis error: {0}")]
    Analysis(String),

    /// Query-related errors (building, execution).
    #[error("Query error: {0}")]
    Query(String),

    /// Storage-related errors (directory backends).
    #[error("Storage error: {0}")]
    Storage(String),

    /// A caller supplied an argument the index cannot honor, such as a
    /// query or sort over a field the index does not define.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The index was disposed and can no longer accept the operation.
    #[error("Index '{0}' has already been disposed")]
    AlreadyDisposed(String),

    /// A per-document transformation failed inside an indexing batch.
    #[error("Transform error: {0}")]
    Transform(String),

    /// JSON serialization/deserialization errors.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors surfaced by plugin code (extensions, triggers, generators).
    #[error(transparent)]
    Plugin(#[from] anyhow::Error),
}

/// Result type alias for operations that may fail with [`ShrikeError`].
pub type Result<T> = std::result::Result<T, ShrikeError>;

impl ShrikeError {
    /// Create a new index error.
    pub fn index<S: Into<String>>(msg: S) -> Self {
        ShrikeError::Index(msg.into())
    }

    /// Create a new analysis error.
    pub fn analysis<S: Into<String>>(msg: S) -> Self {
        ShrikeError::Analysis(msg.into())
    }

    /// Create a new query error.
    pub fn query<S: Into<String>>(msg: S) -> Self {
        ShrikeError::Query(msg.into())
    }

    /// Create a new storage error.
    pub fn storage<S: Into<String>>(msg: S) -> Self {
        ShrikeError::Storage(msg.into())
    }

    /// Create a new invalid-argument error.
    pub fn invalid_argument<S: Into<String>>(msg: S) -> Self {
        ShrikeError::InvalidArgument(msg.into())
    }

    /// Create a new transform error.
    pub fn transform<S: Into<String>>(msg: S) -> Self {
        ShrikeError::Transform(msg.into())
    }
}
