//! Base authorization: tool, command and layer gates.

use serde::{Deserialize, Serialize};

use crate::authorization::{Authorization, standard_kinds};
use crate::error::{AuthorizationError, AuthorizationResult};
use crate::pattern::{IdPattern, any_matches};

/// Permissions on the layers matching a pattern.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerGrant {
    /// Layers this grant applies to.
    pub layer: IdPattern,
    /// Layer is visible.
    #[serde(default = "default_true")]
    pub visible: bool,
    /// Features may be updated.
    #[serde(default)]
    pub update: bool,
    /// Features may be created.
    #[serde(default)]
    pub create: bool,
    /// Features may be deleted.
    #[serde(default)]
    pub delete: bool,
}

fn default_true() -> bool {
    true
}

impl LayerGrant {
    /// Grant visibility only.
    pub fn read_only(layer: impl Into<IdPattern>) -> Self {
        Self {
            layer: layer.into(),
            visible: true,
            update: false,
            create: false,
            delete: false,
        }
    }

    /// Grant visibility and all edit actions.
    pub fn editable(layer: impl Into<IdPattern>) -> Self {
        Self {
            layer: layer.into(),
            visible: true,
            update: true,
            create: true,
            delete: true,
        }
    }
}

/// Authorization answering the base gates from pattern lists.
///
/// # Example
///
/// ```
/// use layergate_authorization::builtin::{BaseAuthorization, LayerGrant};
/// use layergate_authorization::Authorization;
///
/// let auth = BaseAuthorization::new("editor")
///     .with_tool("zoom*")
///     .with_command("command.feature.*")
///     .with_layer(LayerGrant::editable("roads"))
///     .with_layer(LayerGrant::read_only("*"));
///
/// assert!(auth.is_tool_authorized("zoomIn"));
/// assert!(auth.is_layer_visible("rivers"));
/// assert!(auth.is_layer_update_authorized("roads"));
/// assert!(!auth.is_layer_update_authorized("rivers"));
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BaseAuthorization {
    /// Authorization id.
    pub id: String,
    /// Authorized tools.
    #[serde(default)]
    pub tools: Vec<IdPattern>,
    /// Authorized commands.
    #[serde(default)]
    pub commands: Vec<IdPattern>,
    /// Layer permissions.
    #[serde(default)]
    pub layers: Vec<LayerGrant>,
}

impl BaseAuthorization {
    /// Create an authorization which grants nothing.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Self::default()
        }
    }

    /// Create an authorization which grants everything.
    pub fn allow_all(id: impl Into<String>) -> Self {
        Self::new(id)
            .with_tool("*")
            .with_command("*")
            .with_layer(LayerGrant::editable("*"))
    }

    /// Authorize tools matching a pattern.
    pub fn with_tool(mut self, pattern: impl Into<IdPattern>) -> Self {
        self.tools.push(pattern.into());
        self
    }

    /// Authorize commands matching a pattern.
    pub fn with_command(mut self, pattern: impl Into<IdPattern>) -> Self {
        self.commands.push(pattern.into());
        self
    }

    /// Add a layer grant.
    pub fn with_layer(mut self, grant: LayerGrant) -> Self {
        self.layers.push(grant);
        self
    }

    fn grants(&self, layer_id: &str, action: impl Fn(&LayerGrant) -> bool) -> bool {
        self.layers
            .iter()
            .any(|g| g.layer.matches(layer_id) && action(g))
    }
}

impl Authorization for BaseAuthorization {
    fn id(&self) -> String {
        self.id.clone()
    }

    fn kind(&self) -> &str {
        standard_kinds::BASE
    }

    fn is_tool_authorized(&self, tool_id: &str) -> bool {
        any_matches(&self.tools, tool_id)
    }

    fn is_command_authorized(&self, command_name: &str) -> bool {
        any_matches(&self.commands, command_name)
    }

    fn is_layer_visible(&self, layer_id: &str) -> bool {
        self.grants(layer_id, |g| g.visible)
    }

    fn is_layer_update_authorized(&self, layer_id: &str) -> bool {
        self.grants(layer_id, |g| g.update)
    }

    fn is_layer_create_authorized(&self, layer_id: &str) -> bool {
        self.grants(layer_id, |g| g.create)
    }

    fn is_layer_delete_authorized(&self, layer_id: &str) -> bool {
        self.grants(layer_id, |g| g.delete)
    }

    fn encode(&self) -> AuthorizationResult<serde_json::Value> {
        Ok(serde_json::to_value(self)?)
    }

    fn validate(&self) -> AuthorizationResult<()> {
        if self.id.is_empty() {
            return Err(AuthorizationError::EmptyArgument("id"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_grants_nothing() {
        let auth = BaseAuthorization::new("nothing");
        assert!(!auth.is_tool_authorized("zoom"));
        assert!(!auth.is_command_authorized("command.Refresh"));
        assert!(!auth.is_layer_visible("roads"));
        assert!(!auth.is_layer_delete_authorized("roads"));
    }

    #[test]
    fn test_allow_all() {
        let auth = BaseAuthorization::allow_all("admin");
        assert!(auth.is_tool_authorized("anything"));
        assert!(auth.is_command_authorized("anything"));
        assert!(auth.is_layer_visible("roads"));
        assert!(auth.is_layer_update_authorized("roads"));
        assert!(auth.is_layer_create_authorized("roads"));
        assert!(auth.is_layer_delete_authorized("roads"));
    }

    #[test]
    fn test_layer_grants_are_or_combined() {
        let auth = BaseAuthorization::new("mixed")
            .with_layer(LayerGrant::read_only("*"))
            .with_layer(LayerGrant {
                layer: IdPattern::new("roads"),
                visible: false,
                update: true,
                create: false,
                delete: false,
            });

        assert!(auth.is_layer_visible("roads"));
        assert!(auth.is_layer_update_authorized("roads"));
        assert!(!auth.is_layer_update_authorized("rivers"));
        assert!(!auth.is_layer_create_authorized("roads"));
    }

    #[test]
    fn test_layer_grant_visible_defaults_to_true() {
        let grant: LayerGrant = serde_json::from_str(r#"{"layer": "roads", "update": true}"#).unwrap();
        assert!(grant.visible);
        assert!(grant.update);
        assert!(!grant.delete);
    }

    #[test]
    fn test_validate_rejects_empty_id() {
        assert!(BaseAuthorization::new("").validate().is_err());
        assert!(BaseAuthorization::new("ok").validate().is_ok());
    }
}
