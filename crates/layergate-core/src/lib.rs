//! Layergate Core
//!
//! This crate provides the models and collaborator interfaces shared by the
//! Layergate access-decision engine:
//!
//! - [`Geometry`] and [`GeometryService`]: authorized areas and CRS handling
//! - [`Filter`] and [`FilterService`]: feature select filters
//! - [`LayerInfo`] and [`LayerConfigService`]: layer extents and structural
//!   edit capabilities
//! - [`Feature`]: the feature view used by feature and attribute decisions
//! - [`SecurityConfig`]: security manager configuration
//!
//! # Collaborators
//!
//! The engine does not own layer configuration, geometry or filter handling.
//! It consults them through the traits in this crate, bundled in
//! [`Services`]. Failures of collaborators are never propagated out of an
//! access decision; they turn into a deny answer.

pub mod config;
pub mod error;
pub mod feature;
pub mod filter;
pub mod geometry;
pub mod layer;
pub mod services;

// Re-export main types at crate root
pub use config::SecurityConfig;
pub use error::{SecurityError, SecurityResult};
pub use feature::Feature;
pub use filter::{DefaultFilterService, Filter, FilterService};
pub use geometry::{Envelope, Geometry, GeometryService, PlanarGeometryService, UNKNOWN_SRID};
pub use layer::{LayerConfigService, LayerInfo, StaticLayerConfig};
pub use services::Services;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::config::SecurityConfig;
    pub use crate::error::{SecurityError, SecurityResult};
    pub use crate::feature::Feature;
    pub use crate::filter::{Filter, FilterService};
    pub use crate::geometry::{Envelope, Geometry, GeometryService};
    pub use crate::layer::{LayerConfigService, LayerInfo, StaticLayerConfig};
    pub use crate::services::Services;
}
