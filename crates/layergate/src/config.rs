//! Deployment configuration loaded from TOML.
//!
//! A deployment file lists the layers known to the engine and static
//! security services with their tokens:
//!
//! ```toml
//! [security]
//! loop_all_services = true
//!
//! [[layers]]
//! id = "roads"
//! crs = "EPSG:4326"
//! max_extent = { min_x = 0.0, min_y = 0.0, max_x = 100.0, max_y = 100.0 }
//! update_capable = true
//!
//! [[services]]
//! id = "static"
//!
//! [[services.tokens]]
//! token = "bob-secret"
//! user = { id = "bob", name = "Bob" }
//!
//! [[services.tokens.authorizations]]
//! kind = "base"
//! id = "viewer"
//! layers = [{ layer = "*" }]
//! ```
//!
//! Each authorization entry names its `kind`; the remaining keys are the
//! payload handed to the decoder registered for that kind.

use std::path::Path;
use std::sync::Arc;

use layergate_authorization::{
    Authentication, AuthorizationCodec, AuthorizationError, AuthorizationResult,
    SharedAuthorization,
};
use layergate_context::UserInfo;
use layergate_core::{LayerInfo, SecurityConfig, Services, StaticLayerConfig};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::ManagerResult;
use crate::manager::SecurityManager;
use crate::service::StaticSecurityService;

/// A complete deployment: manager settings, layers and security services.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DeploymentConfig {
    /// Security manager settings.
    pub security: SecurityConfig,
    /// Layers.
    pub layers: Vec<LayerInfo>,
    /// Static security services.
    pub services: Vec<ServiceConfig>,
}

impl DeploymentConfig {
    /// Parse a deployment from TOML text.
    pub fn from_toml_str(text: &str) -> ManagerResult<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Read a deployment file.
    pub fn from_file(path: impl AsRef<Path>) -> ManagerResult<Self> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }

    /// Build a security manager for this deployment, using the built-in
    /// authorization kinds.
    pub fn build_manager(&self) -> ManagerResult<SecurityManager> {
        self.build_manager_with_codec(Arc::new(AuthorizationCodec::with_builtins()))
    }

    /// Build a security manager for this deployment with a custom codec.
    pub fn build_manager_with_codec(
        &self,
        codec: Arc<AuthorizationCodec>,
    ) -> ManagerResult<SecurityManager> {
        let layers = StaticLayerConfig::with_layers(self.layers.iter().cloned());
        let mut builder = SecurityManager::builder()
            .with_config(self.security.clone())
            .with_services(Services::new(Arc::new(layers)))
            .with_codec(Arc::clone(&codec));

        for service in &self.services {
            builder = builder.with_security_service(StaticSecurityService::from_config(service, &codec)?);
        }

        let manager = builder.build()?;
        info!(
            layers = self.layers.len(),
            services = self.services.len(),
            "Deployment loaded"
        );
        Ok(manager)
    }
}

/// A static security service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Service id.
    pub id: String,
    /// Known tokens.
    #[serde(default)]
    pub tokens: Vec<TokenConfig>,
}

/// A token of a static security service.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TokenConfig {
    /// The token.
    pub token: String,
    /// User identity.
    #[serde(default)]
    pub user: UserInfo,
    /// Authorizations granted for the token.
    #[serde(default)]
    pub authorizations: Vec<AuthorizationConfig>,
}

impl TokenConfig {
    /// Build the authentication for this token.
    pub fn authentication(
        &self,
        service_id: &str,
        codec: &AuthorizationCodec,
    ) -> ManagerResult<Authentication> {
        let mut authentication = Authentication::new(service_id)?;

        let user = &self.user;
        if let Some(id) = &user.id {
            authentication = authentication.with_user_id(id.as_str());
        }
        if let Some(name) = &user.name {
            authentication = authentication.with_user_name(name.as_str());
        }
        if let Some(locale) = &user.locale {
            authentication = authentication.with_user_locale(locale.as_str());
        }
        if let Some(organization) = &user.organization {
            authentication = authentication.with_user_organization(organization.as_str());
        }
        if let Some(division) = &user.division {
            authentication = authentication.with_user_division(division.as_str());
        }

        for authorization in &self.authorizations {
            authentication = authentication.with_shared_authorization(authorization.build(codec)?);
        }
        Ok(authentication)
    }
}

/// A tagged authorization entry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AuthorizationConfig {
    /// Authorization kind, e.g. `base` or `area`.
    pub kind: String,
    /// Payload for the kind decoder.
    #[serde(flatten)]
    pub data: toml::Table,
}

impl AuthorizationConfig {
    /// Decode the authorization through the codec.
    pub fn build(&self, codec: &AuthorizationCodec) -> AuthorizationResult<SharedAuthorization> {
        let data = serde_json::to_value(&self.data).map_err(AuthorizationError::from)?;
        codec.decode_value(&self.kind, data)
    }
}

#[cfg(test)]
mod tests {
    use layergate_core::Feature;

    use super::*;
    use crate::error::ManagerError;

    const DEPLOYMENT: &str = r#"
        [security]
        loop_all_services = false

        [[layers]]
        id = "roads"
        crs = "EPSG:4326"
        max_extent = { min_x = 0, min_y = 0, max_x = 100, max_y = 100 }
        update_capable = true

        [[services]]
        id = "static"

        [[services.tokens]]
        token = "bob-secret"
        user = { id = "bob" }

        [[services.tokens.authorizations]]
        kind = "feature"
        id = "owned"
        layers = [{ layer = "roads", update = true }]

        [services.tokens.authorizations.rules.roads]
        visible = { match = "all" }
        update = { match = "attribute_equals", attribute = "owner", value = "bob" }

        [[services.tokens.authorizations]]
        kind = "area"
        id = "north"

        [services.tokens.authorizations.areas.roads]
        visible = { srid = 4326, parts = [{ min_x = 0, min_y = 50, max_x = 100, max_y = 150 }] }
        partly_visible_sufficient = true
    "#;

    #[test]
    fn test_parse_deployment() {
        let config = DeploymentConfig::from_toml_str(DEPLOYMENT).unwrap();
        assert!(!config.security.loop_all_services);
        assert_eq!(config.layers.len(), 1);
        assert!(config.layers[0].update_capable);
        assert_eq!(config.services[0].tokens[0].authorizations.len(), 2);
        assert_eq!(config.services[0].tokens[0].authorizations[0].kind, "feature");
    }

    #[test]
    fn test_build_manager() {
        let manager = DeploymentConfig::from_toml_str(DEPLOYMENT)
            .unwrap()
            .build_manager()
            .unwrap();
        let mut context = manager.new_context();

        assert!(manager.create_security_context(&mut context, "bob-secret").unwrap());
        assert_eq!(context.user_id(), Some("bob"));

        let mine = Feature::new("f1").with_attribute("owner", "bob");
        let theirs = Feature::new("f2").with_attribute("owner", "alice");
        assert!(context.is_feature_visible("roads", &theirs));
        assert!(context.is_feature_update_authorized("roads", &mine));
        assert!(!context.is_feature_update_authorized("roads", &theirs));

        let area = context.visible_area("roads").unwrap();
        assert_eq!(area.srid(), 4326);
        assert!(area.contains_point(50.0, 75.0));
        assert!(!area.contains_point(50.0, 25.0));
        assert!(context.is_partly_visible_sufficient("roads"));
    }

    #[test]
    fn test_unknown_kind_rejected() {
        let config = DeploymentConfig::from_toml_str(
            r#"
            [[services]]
            id = "static"

            [[services.tokens]]
            token = "t"

            [[services.tokens.authorizations]]
            kind = "ldap-group"
            id = "admins"
            "#,
        )
        .unwrap();

        assert!(matches!(
            config.build_manager(),
            Err(ManagerError::Authorization(AuthorizationError::UnknownKind(kind))) if kind == "ldap-group"
        ));
    }

    #[test]
    fn test_invalid_toml() {
        assert!(matches!(
            DeploymentConfig::from_toml_str("[[layers]]\nid = 3"),
            Err(ManagerError::Parse(_))
        ));
    }
}
