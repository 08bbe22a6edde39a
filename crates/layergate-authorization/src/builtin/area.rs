//! Area restriction: geometric limits per layer.

use std::collections::BTreeMap;
use std::sync::Arc;

use layergate_core::{Geometry, Services, UNKNOWN_SRID};
use serde::{Deserialize, Serialize};
use tracing::warn;

use super::base::BaseAuthorization;
use crate::authorization::{
    AreaAuthorization, Authorization, AuthorizationNeedsWiring, SharedAuthorization,
    standard_kinds,
};
use crate::error::AuthorizationResult;

/// Authorized areas for one layer.
///
/// Update, create and delete areas default to the visible area when unset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayerArea {
    /// Area in which features are visible.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub visible: Option<Geometry>,
    /// Area in which features may be updated.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub update: Option<Geometry>,
    /// Area in which features may be created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub create: Option<Geometry>,
    /// Area in which features may be deleted.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delete: Option<Geometry>,
    /// Partial overlap with the visible area is enough.
    pub partly_visible_sufficient: bool,
    /// Partial overlap with the update area is enough.
    pub partly_update_sufficient: bool,
    /// Partial overlap with the create area is enough.
    pub partly_create_sufficient: bool,
    /// Partial overlap with the delete area is enough.
    pub partly_delete_sufficient: bool,
}

impl LayerArea {
    /// Use one area for all actions, requiring full containment.
    pub fn new(area: Geometry) -> Self {
        Self {
            visible: Some(area),
            ..Self::default()
        }
    }

    /// Set the update area.
    pub fn with_update(mut self, area: Geometry) -> Self {
        self.update = Some(area);
        self
    }

    /// Set the create area.
    pub fn with_create(mut self, area: Geometry) -> Self {
        self.create = Some(area);
        self
    }

    /// Set the delete area.
    pub fn with_delete(mut self, area: Geometry) -> Self {
        self.delete = Some(area);
        self
    }

    /// Set whether partial overlap is enough, for all actions.
    pub fn with_partly_sufficient(mut self, sufficient: bool) -> Self {
        self.partly_visible_sufficient = sufficient;
        self.partly_update_sufficient = sufficient;
        self.partly_create_sufficient = sufficient;
        self.partly_delete_sufficient = sufficient;
        self
    }

    fn visible_area(&self) -> Option<&Geometry> {
        self.visible.as_ref()
    }

    fn update_area(&self) -> Option<&Geometry> {
        self.update.as_ref().or(self.visible.as_ref())
    }

    fn create_area(&self) -> Option<&Geometry> {
        self.create.as_ref().or(self.visible.as_ref())
    }

    fn delete_area(&self) -> Option<&Geometry> {
        self.delete.as_ref().or(self.visible.as_ref())
    }
}

/// Authorization restricting layers to configured areas.
///
/// Layers without a configured area get no area at all. Area geometries are
/// wired against the layer CRS before installation: geometries in another
/// spatial reference system are replaced by an empty area.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AreaRestriction {
    /// Base gates.
    #[serde(flatten)]
    pub base: BaseAuthorization,
    /// Areas by layer id.
    #[serde(default)]
    pub areas: BTreeMap<String, LayerArea>,
}

impl AreaRestriction {
    /// Create an area restriction without areas.
    pub fn new(base: BaseAuthorization) -> Self {
        Self {
            base,
            areas: BTreeMap::new(),
        }
    }

    /// Configure the areas of a layer.
    pub fn with_area(mut self, layer_id: impl Into<String>, area: LayerArea) -> Self {
        self.areas.insert(layer_id.into(), area);
        self
    }

    fn area(
        &self,
        layer_id: &str,
        pick: impl Fn(&LayerArea) -> Option<&Geometry>,
    ) -> Option<Geometry> {
        self.areas.get(layer_id).and_then(pick).cloned()
    }

    fn flag(&self, layer_id: &str, pick: impl Fn(&LayerArea) -> bool) -> bool {
        self.areas.get(layer_id).is_some_and(pick)
    }
}

impl Authorization for AreaRestriction {
    fn id(&self) -> String {
        self.base.id.clone()
    }

    fn kind(&self) -> &str {
        standard_kinds::AREA
    }

    delegate_base_gates!(base);

    fn encode(&self) -> AuthorizationResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn validate(&self) -> AuthorizationResult<()> {
        self.base.validate()
    }

    fn as_area(&self) -> Option<&dyn AreaAuthorization> {
        Some(self)
    }

    fn as_needs_wiring(&self) -> Option<&dyn AuthorizationNeedsWiring> {
        Some(self)
    }
}

impl AreaAuthorization for AreaRestriction {
    fn visible_area(&self, layer_id: &str) -> Option<Geometry> {
        self.area(layer_id, LayerArea::visible_area)
    }

    fn is_partly_visible_sufficient(&self, layer_id: &str) -> bool {
        self.flag(layer_id, |a| a.partly_visible_sufficient)
    }

    fn update_authorized_area(&self, layer_id: &str) -> Option<Geometry> {
        self.area(layer_id, LayerArea::update_area)
    }

    fn is_partly_update_authorized_sufficient(&self, layer_id: &str) -> bool {
        self.flag(layer_id, |a| a.partly_update_sufficient)
    }

    fn create_authorized_area(&self, layer_id: &str) -> Option<Geometry> {
        self.area(layer_id, LayerArea::create_area)
    }

    fn is_partly_create_authorized_sufficient(&self, layer_id: &str) -> bool {
        self.flag(layer_id, |a| a.partly_create_sufficient)
    }

    fn delete_authorized_area(&self, layer_id: &str) -> Option<Geometry> {
        self.area(layer_id, LayerArea::delete_area)
    }

    fn is_partly_delete_authorized_sufficient(&self, layer_id: &str) -> bool {
        self.flag(layer_id, |a| a.partly_delete_sufficient)
    }
}

impl AuthorizationNeedsWiring for AreaRestriction {
    fn wire(&self, services: &Services) -> SharedAuthorization {
        let mut wired = self.clone();

        for (layer_id, area) in wired.areas.iter_mut() {
            let srid = services
                .layers
                .layer(layer_id)
                .and_then(|layer| services.geometry.srid(&layer.crs));

            let srid = match srid {
                Ok(srid) => srid,
                Err(e) => {
                    warn!(
                        authorization = %self.base.id,
                        layer = %layer_id,
                        error = %e,
                        "Cannot resolve layer CRS, area restriction grants nothing"
                    );
                    UNKNOWN_SRID
                }
            };

            for slot in [
                &mut area.visible,
                &mut area.update,
                &mut area.create,
                &mut area.delete,
            ] {
                let Some(geometry) = slot.take() else {
                    continue;
                };
                let transformed = if srid == UNKNOWN_SRID {
                    Geometry::empty(srid)
                } else {
                    services
                        .geometry
                        .transform(&geometry, srid)
                        .unwrap_or_else(|e| {
                            warn!(
                                authorization = %self.base.id,
                                layer = %layer_id,
                                error = %e,
                                "Area not usable in layer CRS, replaced by empty area"
                            );
                            Geometry::empty(srid)
                        })
                };
                *slot = Some(transformed);
            }
        }

        Arc::new(wired)
    }
}
