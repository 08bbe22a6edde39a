//! Error types for the security manager.

use layergate_authorization::AuthorizationError;
use layergate_core::SecurityError;
use thiserror::Error;

/// Errors from the security manager and deployment configuration.
#[derive(Debug, Error)]
pub enum ManagerError {
    /// Core error.
    #[error("Security error: {0}")]
    Security(#[from] SecurityError),

    /// Authorization error.
    #[error("Authorization error: {0}")]
    Authorization(#[from] AuthorizationError),

    /// A required argument was empty.
    #[error("Required argument '{0}' must not be empty")]
    EmptyArgument(&'static str),

    /// A security service with the same id is already registered.
    #[error("Security service already registered: '{0}'")]
    DuplicateService(String),

    /// A static security service lists the same token twice.
    #[error("Token listed twice in security service '{service}'")]
    DuplicateToken {
        /// Security service id.
        service: String,
    },

    /// The deployment file could not be parsed.
    #[error("Invalid deployment file: {0}")]
    Parse(#[from] toml::de::Error),

    /// The deployment file could not be read.
    #[error("Cannot read deployment file: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for manager operations.
pub type ManagerResult<T> = std::result::Result<T, ManagerError>;
