//! Security services: the sources of authentications.

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use layergate_authorization::{Authentication, AuthorizationCodec};
use tracing::debug;

use crate::config::ServiceConfig;
use crate::error::{ManagerError, ManagerResult};

/// A pluggable source of authentications.
///
/// How tokens are issued and validated is up to the implementation. The
/// security manager only asks for the authentication matching a token.
pub trait SecurityService: Send + Sync + fmt::Debug {
    /// Get the unique id of this service.
    fn id(&self) -> &str;

    /// Get the authentication for a token, `None` when the token is unknown.
    fn authentication(&self, token: &str) -> Option<Authentication>;
}

/// A shareable security service.
pub type SharedSecurityService = Arc<dyn SecurityService>;

/// Security service answering from a fixed token table.
///
/// Authentications are handed out as clones, so all requests using the same
/// token share the same authorization instances.
#[derive(Debug, Clone)]
pub struct StaticSecurityService {
    id: String,
    tokens: HashMap<String, Authentication>,
}

impl StaticSecurityService {
    /// Create a service without tokens.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty.
    pub fn new(id: impl Into<String>) -> ManagerResult<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(ManagerError::EmptyArgument("service id"));
        }

        Ok(Self {
            id,
            tokens: HashMap::new(),
        })
    }

    /// Build a service from its configuration, decoding authorizations
    /// through the codec.
    pub fn from_config(config: &ServiceConfig, codec: &AuthorizationCodec) -> ManagerResult<Self> {
        let mut service = Self::new(config.id.as_str())?;

        for token in &config.tokens {
            if token.token.is_empty() {
                return Err(ManagerError::EmptyArgument("token"));
            }
            if service.tokens.contains_key(&token.token) {
                return Err(ManagerError::DuplicateToken {
                    service: service.id.clone(),
                });
            }

            let authentication = token.authentication(&service.id, codec)?;
            service.tokens.insert(token.token.clone(), authentication);
        }

        debug!(service = %service.id, tokens = service.tokens.len(), "Static security service loaded");
        Ok(service)
    }

    /// Add a token.
    ///
    /// The security service id of the authentication is not checked against
    /// the id of this service.
    pub fn with_token(mut self, token: impl Into<String>, authentication: Authentication) -> Self {
        self.tokens.insert(token.into(), authentication);
        self
    }

    /// Get the number of known tokens.
    pub fn len(&self) -> usize {
        self.tokens.len()
    }

    /// Check if no token is known.
    pub fn is_empty(&self) -> bool {
        self.tokens.is_empty()
    }
}

impl SecurityService for StaticSecurityService {
    fn id(&self) -> &str {
        &self.id
    }

    fn authentication(&self, token: &str) -> Option<Authentication> {
        self.tokens.get(token).cloned()
    }
}

#[cfg(test)]
mod tests {
    use layergate_authorization::builtin::BaseAuthorization;

    use super::*;
    use crate::config::DeploymentConfig;

    #[test]
    fn test_static_service_tokens() {
        let service = StaticSecurityService::new("static")
            .unwrap()
            .with_token(
                "secret",
                Authentication::new("static")
                    .unwrap()
                    .with_authorization(BaseAuthorization::allow_all("admin")),
            );

        assert_eq!(service.id(), "static");
        assert_eq!(service.len(), 1);
        assert!(service.authentication("secret").is_some());
        assert!(service.authentication("other").is_none());
    }

    #[test]
    fn test_shared_authorizations() {
        let service = StaticSecurityService::new("static").unwrap().with_token(
            "guest",
            Authentication::new("static")
                .unwrap()
                .with_authorization(BaseAuthorization::new("guest")),
        );

        let first = service.authentication("guest").unwrap();
        let second = service.authentication("guest").unwrap();
        assert!(Arc::ptr_eq(&first.authorizations()[0], &second.authorizations()[0]));
    }

    #[test]
    fn test_empty_id_rejected() {
        assert!(matches!(
            StaticSecurityService::new(""),
            Err(ManagerError::EmptyArgument("service id"))
        ));
    }

    #[test]
    fn test_from_config() {
        let config = DeploymentConfig::from_toml_str(
            r#"
            [[services]]
            id = "static"

            [[services.tokens]]
            token = "bob-secret"
            user = { id = "bob", locale = "nl_BE" }

            [[services.tokens.authorizations]]
            kind = "base"
            id = "viewer"
            tools = ["*"]
            "#,
        )
        .unwrap();

        let service =
            StaticSecurityService::from_config(&config.services[0], &AuthorizationCodec::with_builtins()).unwrap();
        let authentication = service.authentication("bob-secret").unwrap();

        assert_eq!(authentication.security_service_id(), "static");
        assert_eq!(authentication.user_id(), Some("bob"));
        assert_eq!(authentication.user_locale(), Some("nl_BE"));
        assert!(authentication.authorizations()[0].is_tool_authorized("zoom"));
    }

    #[test]
    fn test_duplicate_token_rejected() {
        let config = DeploymentConfig::from_toml_str(
            r#"
            [[services]]
            id = "static"

            [[services.tokens]]
            token = "same"

            [[services.tokens]]
            token = "same"
            "#,
        )
        .unwrap();

        assert!(matches!(
            StaticSecurityService::from_config(&config.services[0], &AuthorizationCodec::with_builtins()),
            Err(ManagerError::DuplicateToken { service }) if service == "static"
        ));
    }
}
