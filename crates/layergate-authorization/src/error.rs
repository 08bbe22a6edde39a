//! Error types for authorizations and their codec.

use thiserror::Error;

/// Errors related to authorizations.
#[derive(Debug, Error)]
pub enum AuthorizationError {
    /// A required argument was empty.
    #[error("Required argument '{0}' must not be empty")]
    EmptyArgument(&'static str),

    /// No decoder is registered for the authorization kind.
    #[error("Unknown authorization kind: {0}")]
    UnknownKind(String),

    /// A decoder for this kind is already registered.
    #[error("Authorization kind already registered: {0}")]
    AlreadyRegistered(String),

    /// The authorization cannot be serialized.
    #[error("Authorization '{id}' of kind '{kind}' is not serializable")]
    NotSerializable {
        /// Authorization id.
        id: String,
        /// Authorization kind.
        kind: String,
    },

    /// Serialization or deserialization failed.
    #[error("Authorization codec error: {0}")]
    Codec(#[from] serde_json::Error),
}

/// Result type for authorization operations.
pub type AuthorizationResult<T> = std::result::Result<T, AuthorizationError>;
