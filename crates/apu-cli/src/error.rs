//! Error types for apu-cli

/// Result type for CLI operations
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that can occur in CLI operations
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Error from apu-core
    #[error(transparent)]
    Core(#[from] apu_core::Error),

    /// Error from apu-model
    #[error(transparent)]
    Model(#[from] apu_model::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// JSON output error
    #[error(transparent)]
    Json(#[from] serde_json::Error),

    /// Draft file could not be parsed
    #[error("Invalid draft: {0}")]
    Draft(#[from] toml::de::Error),

    /// Tracing subscriber could not be installed
    #[error("Logging setup failed: {message}")]
    Logging { message: String },

    /// User-facing error with a message
    #[error("{message}")]
    User { message: String },
}

impl CliError {
    /// Create a new user error with the given message
    pub fn user(message: impl Into<String>) -> Self {
        Self::User {
            message: message.into(),
        }
    }
}
