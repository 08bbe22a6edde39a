//! Attribute restriction: per-attribute read and write rights.

use std::collections::BTreeMap;

use layergate_core::Feature;
use serde::{Deserialize, Serialize};

use super::base::BaseAuthorization;
use super::feature::FeatureRestriction;
use crate::authorization::{
    AttributeAuthorization, Authorization, FeatureAuthorization, standard_kinds,
};
use crate::error::AuthorizationResult;
use crate::pattern::{IdPattern, any_matches};

/// Attribute rules for one layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttributeRules {
    /// Attributes which may be read.
    pub readable: Vec<IdPattern>,
    /// Attributes which may be written.
    pub writable: Vec<IdPattern>,
}

impl AttributeRules {
    /// Create rules which grant nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Allow reading attributes matching a pattern.
    pub fn with_readable(mut self, pattern: impl Into<IdPattern>) -> Self {
        self.readable.push(pattern.into());
        self
    }

    /// Allow writing attributes matching a pattern.
    pub fn with_writable(mut self, pattern: impl Into<IdPattern>) -> Self {
        self.writable.push(pattern.into());
        self
    }
}

/// Authorization deciding per attribute.
///
/// An attribute is readable when its feature is visible and, for layers with
/// attribute rules, the attribute matches a readable pattern. Writable works
/// the same way on top of feature update rights.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeRestriction {
    /// Feature rules and base gates.
    #[serde(flatten)]
    pub features: FeatureRestriction,
    /// Attribute rules by layer id.
    #[serde(default)]
    pub attributes: BTreeMap<String, AttributeRules>,
}

impl AttributeRestriction {
    /// Create an attribute restriction on top of feature rules.
    pub fn new(features: FeatureRestriction) -> Self {
        Self {
            features,
            attributes: BTreeMap::new(),
        }
    }

    /// Create an attribute restriction without feature rules.
    pub fn from_base(base: BaseAuthorization) -> Self {
        Self::new(FeatureRestriction::new(base))
    }

    /// Set the attribute rules for a layer.
    pub fn with_attributes(mut self, layer_id: impl Into<String>, rules: AttributeRules) -> Self {
        self.attributes.insert(layer_id.into(), rules);
        self
    }
}

impl Authorization for AttributeRestriction {
    fn id(&self) -> String {
        self.features.base.id.clone()
    }

    fn kind(&self) -> &str {
        standard_kinds::ATTRIBUTE
    }

    delegate_base_gates!(features.base);

    fn encode(&self) -> AuthorizationResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn validate(&self) -> AuthorizationResult<()> {
        self.features.validate()
    }

    fn as_feature(&self) -> Option<&dyn FeatureAuthorization> {
        Some(&self.features)
    }

    fn as_attribute(&self) -> Option<&dyn AttributeAuthorization> {
        Some(self)
    }
}

impl AttributeAuthorization for AttributeRestriction {
    fn has_rules(&self, layer_id: &str) -> bool {
        self.attributes.contains_key(layer_id) || self.features.has_rules(layer_id)
    }

    fn is_attribute_readable(&self, layer_id: &str, feature: &Feature, attribute: &str) -> bool {
        self.features.is_feature_visible(layer_id, feature)
            && self
                .attributes
                .get(layer_id)
                .is_none_or(|rules| any_matches(&rules.readable, attribute))
    }

    fn is_attribute_writable(&self, layer_id: &str, feature: &Feature, attribute: &str) -> bool {
        self.features.is_feature_update_authorized(layer_id, feature)
            && self
                .attributes
                .get(layer_id)
                .is_none_or(|rules| any_matches(&rules.writable, attribute))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::{FeatureRules, FeatureSelector, LayerGrant};

    fn restriction() -> AttributeRestriction {
        AttributeRestriction::new(
            FeatureRestriction::new(
                BaseAuthorization::new("attributes")
                    .with_layer(LayerGrant::editable("roads"))
                    .with_layer(LayerGrant::read_only("rivers")),
            )
            .with_rules(
                "roads",
                FeatureRules::editable(FeatureSelector::attribute_equals("region", "north")),
            ),
        )
        .with_attributes(
            "roads",
            AttributeRules::new()
                .with_readable("*")
                .with_writable("name")
                .with_writable("surface*"),
        )
    }

    #[test]
    fn test_attribute_rules() {
        let auth = restriction();
        let north = Feature::new("r1").with_attribute("region", "north");
        let south = Feature::new("r2").with_attribute("region", "south");

        assert!(auth.is_attribute_readable("roads", &north, "owner"));
        assert!(auth.is_attribute_writable("roads", &north, "name"));
        assert!(auth.is_attribute_writable("roads", &north, "surface_type"));
        assert!(!auth.is_attribute_writable("roads", &north, "owner"));

        // feature rules come first
        assert!(!auth.is_attribute_readable("roads", &south, "name"));
        assert!(!auth.is_attribute_writable("roads", &south, "name"));
    }

    #[test]
    fn test_layers_without_attribute_rules_follow_feature_rights() {
        let auth = restriction();
        let feature = Feature::new("w1");
        assert!(auth.is_attribute_readable("rivers", &feature, "name"));
        assert!(!auth.is_attribute_writable("rivers", &feature, "name"));
        assert!(!AttributeAuthorization::has_rules(&auth, "rivers"));
        assert!(AttributeAuthorization::has_rules(&auth, "roads"));
    }

    #[test]
    fn test_offers_feature_and_attribute_capabilities() {
        let auth = restriction();
        assert_eq!(auth.id(), "attributes");
        assert_eq!(auth.kind(), standard_kinds::ATTRIBUTE);
        assert!(auth.as_feature().is_some());
        assert!(auth.as_attribute().is_some());
        assert!(auth.as_area().is_none());
    }
}
