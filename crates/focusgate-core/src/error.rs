//! Core error types for focusgate-core.
//!
//! Validation failures at the store boundary, backend failures from the
//! persistence layer and configuration failures each get their own enum;
//! `CoreError` wraps all of them.

use std::path::PathBuf;
use thiserror::Error;

/// Core error type for focusgate-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Rejected edits to the site list
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    /// Persistence backend errors
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Errors raised by `SiteStore::add` and `SiteStore::remove`.
///
/// None of these leave a trace in storage: the record list is only written
/// after validation succeeds.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Empty domain or a non-positive threshold
    #[error("Invalid input for '{field}': {message}")]
    InvalidInput { field: String, message: String },

    /// A record with the same domain key already exists
    #[error("'{site}' is already on the list")]
    DuplicateDomain { site: String },

    /// Removal index past the end of the list
    #[error("Index {index} out of range (length: {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

impl StoreError {
    pub(crate) fn invalid(field: &str, message: impl Into<String>) -> Self {
        StoreError::InvalidInput {
            field: field.to_string(),
            message: message.into(),
        }
    }
}

/// Persistence backend errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open the database file
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// Stored record list could not be encoded or decoded
    #[error("Malformed record list: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Failed to resolve or create the data directory
    #[error("Failed to access data directory: {0}")]
    DataDir(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key does not name a configuration field
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseBusy
                    || inner.code == rusqlite::ErrorCode::DatabaseLocked
                {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
