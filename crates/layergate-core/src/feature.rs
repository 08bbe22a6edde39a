//! Feature model used by feature and attribute level decisions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// A feature of a vector layer, reduced to what access decisions need.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feature {
    /// Feature id, unique within its layer.
    pub id: String,
    /// Attribute values by attribute name.
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
}

impl Feature {
    /// Create a feature without attributes.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Set an attribute value.
    pub fn with_attribute(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(name.into(), value.into());
        self
    }

    /// Get an attribute value.
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }
}
