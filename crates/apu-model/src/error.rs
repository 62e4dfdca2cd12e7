//! Error types for apu-model

/// Result type for apu-model operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when constructing domain values
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// A yield or shift parameter is zero, negative or not finite
    #[error("Invalid APU parameter {name}: {value} (must be a positive finite number)")]
    InvalidParameter { name: &'static str, value: f64 },

    /// A resource line field received a negative or non-finite value
    #[error("Invalid value for {field}: {value}")]
    InvalidValue { field: &'static str, value: f64 },

    /// Resource type name could not be recognised
    #[error("Unknown resource type: {0}")]
    UnknownResourceType(String),
}

impl Error {
    /// Reject values that cannot be stored in a resource line field
    pub fn check_field(field: &'static str, value: f64) -> Result<f64> {
        if value.is_finite() && value >= 0.0 {
            Ok(value)
        } else {
            Err(Self::InvalidValue { field, value })
        }
    }
}
