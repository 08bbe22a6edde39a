//! Core authorization trait and capability traits.
//!
//! An authorization is an immutable permission object issued by a security
//! service. Every authorization answers the base gates (tools, commands,
//! layer visibility and layer edits). Richer capabilities are optional and
//! discovered through the `as_*` accessors; when an authorization does not
//! offer a capability, the engine falls back to its base gates.

use std::fmt;
use std::sync::Arc;

use layergate_core::{Feature, Filter, Geometry, Services};

use crate::error::{AuthorizationError, AuthorizationResult};

/// Core trait for all authorizations.
///
/// Authorizations are shared between concurrently active security contexts,
/// so implementations must not rely on interior mutation to answer queries.
///
/// # Implementing an Authorization
///
/// ```ignore
/// use layergate_authorization::{Authorization, AuthorizationResult};
///
/// #[derive(Debug)]
/// struct GuestAuthorization;
///
/// impl Authorization for GuestAuthorization {
///     fn id(&self) -> String {
///         "guest".to_string()
///     }
///
///     fn kind(&self) -> &str {
///         "guest"
///     }
///
///     fn is_tool_authorized(&self, tool_id: &str) -> bool {
///         tool_id == "zoom"
///     }
///
///     fn is_command_authorized(&self, _command_name: &str) -> bool {
///         false
///     }
///
///     fn is_layer_visible(&self, layer_id: &str) -> bool {
///         layer_id == "basemap"
///     }
///
///     fn is_layer_update_authorized(&self, _layer_id: &str) -> bool {
///         false
///     }
///
///     fn is_layer_create_authorized(&self, _layer_id: &str) -> bool {
///         false
///     }
///
///     fn is_layer_delete_authorized(&self, _layer_id: &str) -> bool {
///         false
///     }
/// }
/// ```
pub trait Authorization: Send + Sync + fmt::Debug {
    /// Stable identifier, used for equality and for the security context id.
    fn id(&self) -> String;

    /// Kind tag used by the authorization codec.
    fn kind(&self) -> &str;

    /// Check if a tool may be used.
    fn is_tool_authorized(&self, tool_id: &str) -> bool;

    /// Check if a command may be executed.
    fn is_command_authorized(&self, command_name: &str) -> bool;

    /// Check if a layer is visible.
    fn is_layer_visible(&self, layer_id: &str) -> bool;

    /// Check if features of a layer may be updated.
    fn is_layer_update_authorized(&self, layer_id: &str) -> bool;

    /// Check if features may be created in a layer.
    fn is_layer_create_authorized(&self, layer_id: &str) -> bool;

    /// Check if features of a layer may be deleted.
    fn is_layer_delete_authorized(&self, layer_id: &str) -> bool;

    /// Serialize the authorization payload for the codec.
    ///
    /// Authorizations which cannot be serialized are left out of saved
    /// authorizations, which only ever reduces access.
    fn encode(&self) -> AuthorizationResult<serde_json::Value> {
        Err(AuthorizationError::NotSerializable {
            id: self.id(),
            kind: self.kind().to_string(),
        })
    }

    /// Validate that this authorization's configuration is valid.
    fn validate(&self) -> AuthorizationResult<()> {
        Ok(())
    }

    /// Area capability, if offered.
    fn as_area(&self) -> Option<&dyn AreaAuthorization> {
        None
    }

    /// Feature capability, if offered.
    fn as_feature(&self) -> Option<&dyn FeatureAuthorization> {
        None
    }

    /// Attribute capability, if offered.
    fn as_attribute(&self) -> Option<&dyn AttributeAuthorization> {
        None
    }

    /// Select filter capability, if offered.
    fn as_select_filter(&self) -> Option<&dyn SelectFilterAuthorization> {
        None
    }

    /// Wiring capability, if the authorization needs engine services before
    /// it can be installed in a security context.
    fn as_needs_wiring(&self) -> Option<&dyn AuthorizationNeedsWiring> {
        None
    }
}

/// A shared authorization reference.
pub type SharedAuthorization = Arc<dyn Authorization>;

/// Geometric restriction of what may be seen or edited in a layer.
pub trait AreaAuthorization: Send + Sync {
    /// Area in which features of the layer are visible. `None` grants nothing.
    fn visible_area(&self, layer_id: &str) -> Option<Geometry>;

    /// Whether partial overlap with the visible area is enough to see a feature.
    fn is_partly_visible_sufficient(&self, layer_id: &str) -> bool;

    /// Area in which features of the layer may be updated.
    fn update_authorized_area(&self, layer_id: &str) -> Option<Geometry>;

    /// Whether partial overlap with the update area is enough to update.
    fn is_partly_update_authorized_sufficient(&self, layer_id: &str) -> bool;

    /// Area in which features may be created.
    fn create_authorized_area(&self, layer_id: &str) -> Option<Geometry>;

    /// Whether partial overlap with the create area is enough to create.
    fn is_partly_create_authorized_sufficient(&self, layer_id: &str) -> bool;

    /// Area in which features of the layer may be deleted.
    fn delete_authorized_area(&self, layer_id: &str) -> Option<Geometry>;

    /// Whether partial overlap with the delete area is enough to delete.
    fn is_partly_delete_authorized_sufficient(&self, layer_id: &str) -> bool;
}

/// Per-feature access decisions.
pub trait FeatureAuthorization: Send + Sync {
    /// Check if this authorization has feature rules for a layer. Layers
    /// without rules are left to the base layer gates.
    fn has_rules(&self, layer_id: &str) -> bool {
        let _ = layer_id;
        true
    }

    /// Check if a feature is visible.
    fn is_feature_visible(&self, layer_id: &str, feature: &Feature) -> bool;

    /// Check if a feature may be updated.
    fn is_feature_update_authorized(&self, layer_id: &str, feature: &Feature) -> bool;

    /// Check if `original` may be updated into `updated`.
    fn is_feature_change_authorized(
        &self,
        layer_id: &str,
        original: &Feature,
        updated: &Feature,
    ) -> bool {
        self.is_feature_update_authorized(layer_id, original)
            && self.is_feature_update_authorized(layer_id, updated)
    }

    /// Check if a feature may be deleted.
    fn is_feature_delete_authorized(&self, layer_id: &str, feature: &Feature) -> bool;

    /// Check if a feature may be created.
    fn is_feature_create_authorized(&self, layer_id: &str, feature: &Feature) -> bool;
}

/// Per-attribute access decisions.
pub trait AttributeAuthorization: Send + Sync {
    /// Check if this authorization has attribute or feature rules for a layer.
    fn has_rules(&self, layer_id: &str) -> bool {
        let _ = layer_id;
        true
    }

    /// Check if an attribute of a feature may be read.
    fn is_attribute_readable(&self, layer_id: &str, feature: &Feature, attribute: &str) -> bool;

    /// Check if an attribute of a feature may be written.
    fn is_attribute_writable(&self, layer_id: &str, feature: &Feature, attribute: &str) -> bool;
}

/// Extra filter on the features which may be selected in a layer.
pub trait SelectFilterAuthorization: Send + Sync {
    /// Filter for the layer, `None` when this authorization adds no restriction.
    fn feature_filter(&self, layer_id: &str) -> Option<Filter>;
}

/// Authorizations which need engine services before use.
pub trait AuthorizationNeedsWiring: Send + Sync {
    /// Produce the wired authorization. The receiver is left untouched as it
    /// may be shared with other security contexts.
    fn wire(&self, services: &Services) -> SharedAuthorization;
}

/// Standard kind tags for built-in authorizations.
pub mod standard_kinds {
    /// Tool, command and layer gates.
    pub const BASE: &str = "base";

    /// Area restriction.
    pub const AREA: &str = "area";

    /// Feature restriction.
    pub const FEATURE: &str = "feature";

    /// Attribute restriction.
    pub const ATTRIBUTE: &str = "attribute";

    /// Select filter restriction.
    pub const FILTER: &str = "filter";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug)]
    struct LayerOnly;

    impl Authorization for LayerOnly {
        fn id(&self) -> String {
            "layer-only".to_string()
        }

        fn kind(&self) -> &str {
            "test"
        }

        fn is_tool_authorized(&self, _tool_id: &str) -> bool {
            false
        }

        fn is_command_authorized(&self, _command_name: &str) -> bool {
            false
        }

        fn is_layer_visible(&self, layer_id: &str) -> bool {
            layer_id == "roads"
        }

        fn is_layer_update_authorized(&self, _layer_id: &str) -> bool {
            false
        }

        fn is_layer_create_authorized(&self, _layer_id: &str) -> bool {
            false
        }

        fn is_layer_delete_authorized(&self, _layer_id: &str) -> bool {
            false
        }
    }

    #[test]
    fn test_capabilities_default_to_absent() {
        let auth = LayerOnly;
        assert!(auth.as_area().is_none());
        assert!(auth.as_feature().is_none());
        assert!(auth.as_attribute().is_none());
        assert!(auth.as_select_filter().is_none());
        assert!(auth.as_needs_wiring().is_none());
    }

    #[test]
    fn test_encode_defaults_to_not_serializable() {
        let err = LayerOnly.encode().unwrap_err();
        assert!(matches!(
            err,
            AuthorizationError::NotSerializable { ref id, ref kind } if id == "layer-only" && kind == "test"
        ));
    }

    #[test]
    fn test_standard_kinds() {
        assert_eq!(standard_kinds::BASE, "base");
        assert_eq!(standard_kinds::AREA, "area");
        assert_eq!(standard_kinds::FILTER, "filter");
    }
}
