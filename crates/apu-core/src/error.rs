//! Error types for apu-core

use std::path::PathBuf;

use crate::reconcile::ValidationReport;

/// Result type for apu-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in apu-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Configuration file not found at expected path
    #[error("Configuration not found at {path}")]
    ConfigNotFound { path: PathBuf },

    /// Configuration values are out of range
    #[error("Invalid configuration: {message}")]
    InvalidConfig { message: String },

    /// The working set has no row with this identifier
    #[error("Resource line not found: {id}")]
    RowNotFound { id: String },

    /// The price of a `%mo` equipment row is derived from labor cost
    #[error("Price of {description:?} is derived from labor cost and cannot be edited")]
    DerivedPrice { description: String },

    /// One or more rows failed pre-save validation
    #[error("{0}")]
    Validation(ValidationReport),

    /// The line item has never been stored, so its APU cannot be saved yet
    #[error("Line item {id} is not saved yet")]
    UnsavedLineItem { id: String },

    /// The editor was opened for reading only
    #[error("APU of line item {line_item} is open read-only")]
    ReadOnly { line_item: String },

    /// A save for this APU is already running
    #[error("A save is already in progress for this APU")]
    SaveInFlight,

    /// A persistence operation failed; the working set has been reset
    #[error("Save failed, changes were discarded: {source}")]
    SaveFailed {
        #[source]
        source: Box<Error>,
    },

    /// Error reported by the backing store
    #[error("Store error during {operation}: {message}")]
    Store {
        operation: &'static str,
        message: String,
    },

    /// Catalog or price-override lookup failed
    #[error("Lookup failed for {resource}: {message}")]
    Lookup { resource: String, message: String },

    /// Entity not found in the store
    #[error("Not found: {0}")]
    NotFound(String),

    /// Store file is locked or could not be locked
    #[error("Lock acquisition failed for {path}")]
    LockFailed { path: PathBuf },

    // Transparent wrappers for underlying crate errors
    /// Domain error from apu-model
    #[error(transparent)]
    Model(#[from] apu_model::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// TOML deserialization error
    #[error(transparent)]
    TomlDe(#[from] toml::de::Error),
}

impl Error {
    pub fn store(operation: &'static str, message: impl Into<String>) -> Self {
        Self::Store {
            operation,
            message: message.into(),
        }
    }
}
