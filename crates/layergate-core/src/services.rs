//! Bundle of collaborator services consulted by the engine.

use std::sync::Arc;

use crate::filter::{DefaultFilterService, FilterService};
use crate::geometry::{GeometryService, PlanarGeometryService};
use crate::layer::{LayerConfigService, StaticLayerConfig};

/// Collaborator services needed to answer access decisions.
///
/// Cloning is cheap; all services are shared.
#[derive(Debug, Clone)]
pub struct Services {
    /// Layer configuration.
    pub layers: Arc<dyn LayerConfigService>,
    /// Geometry and CRS operations.
    pub geometry: Arc<dyn GeometryService>,
    /// Filter operations.
    pub filters: Arc<dyn FilterService>,
}

impl Services {
    /// Create a service bundle for the given layer configuration, using the
    /// planar geometry service and the default filter service.
    pub fn new(layers: Arc<dyn LayerConfigService>) -> Self {
        Self {
            layers,
            geometry: Arc::new(PlanarGeometryService::new()),
            filters: Arc::new(DefaultFilterService::new()),
        }
    }

    /// Replace the geometry service.
    pub fn with_geometry(mut self, geometry: Arc<dyn GeometryService>) -> Self {
        self.geometry = geometry;
        self
    }

    /// Replace the filter service.
    pub fn with_filters(mut self, filters: Arc<dyn FilterService>) -> Self {
        self.filters = filters;
        self
    }
}

impl Default for Services {
    fn default() -> Self {
        Self::new(Arc::new(StaticLayerConfig::new()))
    }
}
