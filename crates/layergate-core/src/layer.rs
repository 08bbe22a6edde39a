//! Layer configuration as seen by the security engine.

use std::collections::HashMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{SecurityError, SecurityResult};
use crate::geometry::Envelope;

/// Layer configuration relevant for access decisions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerInfo {
    /// Layer id.
    pub id: String,
    /// Native CRS of the layer, e.g. `EPSG:4326`.
    pub crs: String,
    /// Maximum extent of the layer, in the layer CRS.
    pub max_extent: Envelope,
    /// Whether features of the layer can be updated at all.
    #[serde(default)]
    pub update_capable: bool,
    /// Whether features can be created in the layer at all.
    #[serde(default)]
    pub create_capable: bool,
    /// Whether features of the layer can be deleted at all.
    #[serde(default)]
    pub delete_capable: bool,
}

impl LayerInfo {
    /// Create a read-only layer.
    pub fn new(id: impl Into<String>, crs: impl Into<String>, max_extent: Envelope) -> Self {
        Self {
            id: id.into(),
            crs: crs.into(),
            max_extent,
            update_capable: false,
            create_capable: false,
            delete_capable: false,
        }
    }

    /// Make the layer editable (update, create and delete capable).
    pub fn editable(mut self) -> Self {
        self.update_capable = true;
        self.create_capable = true;
        self.delete_capable = true;
        self
    }

    /// Set whether features can be updated.
    pub fn with_update_capable(mut self, capable: bool) -> Self {
        self.update_capable = capable;
        self
    }

    /// Set whether features can be created.
    pub fn with_create_capable(mut self, capable: bool) -> Self {
        self.create_capable = capable;
        self
    }

    /// Set whether features can be deleted.
    pub fn with_delete_capable(mut self, capable: bool) -> Self {
        self.delete_capable = capable;
        self
    }
}

/// Source of layer configuration.
pub trait LayerConfigService: Send + Sync + fmt::Debug {
    /// Look up a layer by id.
    ///
    /// # Errors
    ///
    /// Returns [`SecurityError::UnknownLayer`] if the layer does not exist.
    fn layer(&self, layer_id: &str) -> SecurityResult<LayerInfo>;
}

/// Layer configuration held in memory.
#[derive(Debug, Clone, Default)]
pub struct StaticLayerConfig {
    layers: HashMap<String, LayerInfo>,
}

impl StaticLayerConfig {
    /// Create an empty layer configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a layer configuration from a list of layers.
    pub fn with_layers(layers: impl IntoIterator<Item = LayerInfo>) -> Self {
        let mut config = Self::new();
        for layer in layers {
            config.add(layer);
        }
        config
    }

    /// Add or replace a layer.
    pub fn add(&mut self, layer: LayerInfo) {
        debug!(layer = %layer.id, crs = %layer.crs, "Layer configured");
        self.layers.insert(layer.id.clone(), layer);
    }

    /// Get the number of configured layers.
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Check if no layers are configured.
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

impl LayerConfigService for StaticLayerConfig {
    fn layer(&self, layer_id: &str) -> SecurityResult<LayerInfo> {
        self.layers
            .get(layer_id)
            .cloned()
            .ok_or_else(|| SecurityError::UnknownLayer(layer_id.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_layer_defaults_to_read_only() {
        let layer = LayerInfo::new("roads", "EPSG:4326", Envelope::new(0.0, 0.0, 1.0, 1.0));
        assert!(!layer.update_capable);
        assert!(!layer.create_capable);
        assert!(!layer.delete_capable);

        let editable = layer.editable().with_delete_capable(false);
        assert!(editable.update_capable);
        assert!(editable.create_capable);
        assert!(!editable.delete_capable);
    }

    #[test]
    fn test_static_layer_lookup() {
        let config = StaticLayerConfig::with_layers([LayerInfo::new(
            "roads",
            "EPSG:4326",
            Envelope::new(0.0, 0.0, 1.0, 1.0),
        )]);

        assert_eq!(config.len(), 1);
        assert_eq!(config.layer("roads").unwrap().crs, "EPSG:4326");
        assert!(matches!(
            config.layer("rivers"),
            Err(SecurityError::UnknownLayer(id)) if id == "rivers"
        ));
    }
}
