//! Feature restriction: per-feature visibility and edit rights.

use std::collections::BTreeMap;

use layergate_core::Feature;
use serde::{Deserialize, Serialize};

use super::base::BaseAuthorization;
use crate::authorization::{Authorization, FeatureAuthorization, standard_kinds};
use crate::error::AuthorizationResult;

/// Selects the features of a layer a rule applies to.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "match", rename_all = "snake_case")]
pub enum FeatureSelector {
    /// Every feature.
    All,
    /// No feature.
    #[default]
    Nothing,
    /// Features with one of the listed ids.
    Ids {
        /// Selected feature ids.
        ids: Vec<String>,
    },
    /// Features having an attribute with the given value.
    AttributeEquals {
        /// Attribute name.
        attribute: String,
        /// Required value.
        value: String,
    },
}

impl FeatureSelector {
    /// Select features by id.
    pub fn ids<I, S>(ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        FeatureSelector::Ids {
            ids: ids.into_iter().map(Into::into).collect(),
        }
    }

    /// Select features by attribute value.
    pub fn attribute_equals(attribute: impl Into<String>, value: impl Into<String>) -> Self {
        FeatureSelector::AttributeEquals {
            attribute: attribute.into(),
            value: value.into(),
        }
    }

    /// Check if a feature is selected.
    pub fn matches(&self, feature: &Feature) -> bool {
        match self {
            FeatureSelector::All => true,
            FeatureSelector::Nothing => false,
            FeatureSelector::Ids { ids } => ids.iter().any(|id| *id == feature.id),
            FeatureSelector::AttributeEquals { attribute, value } => {
                feature.attribute(attribute) == Some(value.as_str())
            }
        }
    }
}

/// Feature rules for one layer. Unset rules select nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureRules {
    /// Visible features.
    pub visible: FeatureSelector,
    /// Features which may be updated.
    pub update: FeatureSelector,
    /// Features which may be created.
    pub create: FeatureSelector,
    /// Features which may be deleted.
    pub delete: FeatureSelector,
}

impl FeatureRules {
    /// Rules which make the selected features visible only.
    pub fn visible(selector: FeatureSelector) -> Self {
        Self {
            visible: selector,
            ..Self::default()
        }
    }

    /// Rules which make the selected features visible and editable.
    pub fn editable(selector: FeatureSelector) -> Self {
        Self {
            visible: selector.clone(),
            update: selector.clone(),
            create: selector.clone(),
            delete: selector,
        }
    }
}

/// Authorization deciding per feature.
///
/// Layers with rules are decided by their selectors. Layers without rules
/// are decided by the base layer gates.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureRestriction {
    /// Base gates.
    #[serde(flatten)]
    pub base: BaseAuthorization,
    /// Feature rules by layer id.
    #[serde(default)]
    pub rules: BTreeMap<String, FeatureRules>,
}

impl FeatureRestriction {
    /// Create a feature restriction without rules.
    pub fn new(base: BaseAuthorization) -> Self {
        Self {
            base,
            rules: BTreeMap::new(),
        }
    }

    /// Set the rules for a layer.
    pub fn with_rules(mut self, layer_id: impl Into<String>, rules: FeatureRules) -> Self {
        self.rules.insert(layer_id.into(), rules);
        self
    }
}

impl Authorization for FeatureRestriction {
    fn id(&self) -> String {
        self.base.id.clone()
    }

    fn kind(&self) -> &str {
        standard_kinds::FEATURE
    }

    delegate_base_gates!(base);

    fn encode(&self) -> AuthorizationResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn validate(&self) -> AuthorizationResult<()> {
        self.base.validate()
    }

    fn as_feature(&self) -> Option<&dyn FeatureAuthorization> {
        Some(self)
    }
}

impl FeatureAuthorization for FeatureRestriction {
    fn has_rules(&self, layer_id: &str) -> bool {
        self.rules.contains_key(layer_id)
    }

    fn is_feature_visible(&self, layer_id: &str, feature: &Feature) -> bool {
        match self.rules.get(layer_id) {
            Some(rules) => rules.visible.matches(feature),
            None => self.base.is_layer_visible(layer_id),
        }
    }

    fn is_feature_update_authorized(&self, layer_id: &str, feature: &Feature) -> bool {
        match self.rules.get(layer_id) {
            Some(rules) => rules.update.matches(feature),
            None => self.base.is_layer_update_authorized(layer_id),
        }
    }

    fn is_feature_delete_authorized(&self, layer_id: &str, feature: &Feature) -> bool {
        match self.rules.get(layer_id) {
            Some(rules) => rules.delete.matches(feature),
            None => self.base.is_layer_delete_authorized(layer_id),
        }
    }

    fn is_feature_create_authorized(&self, layer_id: &str, feature: &Feature) -> bool {
        match self.rules.get(layer_id) {
            Some(rules) => rules.create.matches(feature),
            None => self.base.is_layer_create_authorized(layer_id),
        }
    }
}
