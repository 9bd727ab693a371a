//! Error types for resource configuration and selector arguments.
//!
//! Request failures never surface here: they are captured in the resource's
//! request table and read back through the selectors.

use thiserror::Error;

/// Result type alias for resource operations.
pub type Result<T> = std::result::Result<T, ResourceError>;

/// Errors raised synchronously by the resource API.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ResourceError {
    /// The resource configuration is unusable (raised at construction).
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// A required argument was missing or empty.
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl ResourceError {
    /// Error for a missing operation name.
    #[must_use]
    pub fn missing_operation(caller: &str) -> Self {
        Self::InvalidArgument(format!("{caller} requires an operation name"))
    }
}
