//! Filter restriction: extra select filters per layer.

use std::collections::BTreeMap;

use layergate_core::Filter;
use serde::{Deserialize, Serialize};

use super::base::BaseAuthorization;
use crate::authorization::{Authorization, SelectFilterAuthorization, standard_kinds};
use crate::error::AuthorizationResult;

/// Authorization narrowing feature selection with a filter per layer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterRestriction {
    /// Base gates.
    #[serde(flatten)]
    pub base: BaseAuthorization,
    /// Filters by layer id.
    #[serde(default)]
    pub filters: BTreeMap<String, Filter>,
}

impl FilterRestriction {
    /// Create a filter restriction without filters.
    pub fn new(base: BaseAuthorization) -> Self {
        Self {
            base,
            filters: BTreeMap::new(),
        }
    }

    /// Set the filter for a layer.
    pub fn with_filter(mut self, layer_id: impl Into<String>, filter: Filter) -> Self {
        self.filters.insert(layer_id.into(), filter);
        self
    }
}

impl Authorization for FilterRestriction {
    fn id(&self) -> String {
        self.base.id.clone()
    }

    fn kind(&self) -> &str {
        standard_kinds::FILTER
    }

    delegate_base_gates!(base);

    fn encode(&self) -> AuthorizationResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn validate(&self) -> AuthorizationResult<()> {
        self.base.validate()
    }

    fn as_select_filter(&self) -> Option<&dyn SelectFilterAuthorization> {
        Some(self)
    }
}

impl SelectFilterAuthorization for FilterRestriction {
    fn feature_filter(&self, layer_id: &str) -> Option<Filter> {
        self.filters.get(layer_id).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feature_filter_per_layer() {
        let auth = FilterRestriction::new(BaseAuthorization::new("owned"))
            .with_filter("roads", Filter::expression("owner = 'bob'"));

        assert_eq!(
            auth.feature_filter("roads"),
            Some(Filter::expression("owner = 'bob'"))
        );
        assert_eq!(auth.feature_filter("rivers"), None);
        assert!(auth.as_select_filter().is_some());
    }

    #[test]
    fn test_filter_serde() {
        let auth: FilterRestriction = serde_json::from_value(serde_json::json!({
            "id": "owned",
            "filters": {"roads": "owner = 'bob'"}
        }))
        .unwrap();

        assert_eq!(auth.id(), "owned");
        assert_eq!(
            auth.feature_filter("roads"),
            Some(Filter::expression("owner = 'bob'"))
        );
    }
}
