//! Core error types for Layergate.
//!
//! These errors come from configuration and from the collaborator services
//! (layer configuration, geometry, filters). Query methods on a security
//! context never surface them; they are logged and turned into a deny answer.

use thiserror::Error;

/// Errors raised by configuration and collaborator services.
#[derive(Debug, Error)]
pub enum SecurityError {
    /// A required argument was empty.
    #[error("Required argument '{0}' must not be empty")]
    EmptyArgument(&'static str),

    /// The layer configuration service does not know the layer.
    #[error("Unknown layer: '{0}'")]
    UnknownLayer(String),

    /// The CRS code could not be mapped to a spatial reference id.
    #[error("Unsupported CRS: '{0}'")]
    UnsupportedCrs(String),

    /// A geometry could not be converted between spatial reference systems.
    #[error("Cannot transform geometry from SRID {from} to SRID {to}")]
    Transform {
        /// Source SRID.
        from: i32,
        /// Target SRID.
        to: i32,
    },
}

/// Result type alias for core operations.
pub type SecurityResult<T> = std::result::Result<T, SecurityError>;
