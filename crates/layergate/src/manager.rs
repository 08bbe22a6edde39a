//! The security manager: security context lifecycle.

use std::sync::Arc;

use layergate_authorization::AuthorizationCodec;
use layergate_context::{SavedAuthorization, SecurityContext};
use layergate_core::{LayerConfigService, SecurityConfig, Services};
use parking_lot::RwLock;
use tracing::{debug, info};

use crate::error::{ManagerError, ManagerResult};
use crate::service::{SecurityService, SharedSecurityService};

/// Fills, clears and restores security contexts.
///
/// The manager holds the registered security services and the engine
/// services. It is shareable between threads; each request uses its own
/// [`SecurityContext`].
///
/// # Example
///
/// ```
/// use layergate::prelude::*;
///
/// let service = StaticSecurityService::new("static")?.with_token(
///     "secret",
///     Authentication::new("static")?.with_authorization(BaseAuthorization::allow_all("admin")),
/// );
/// let manager = SecurityManager::builder()
///     .with_security_service(service)
///     .build()?;
///
/// let mut context = manager.new_context();
/// assert!(manager.create_security_context(&mut context, "secret")?);
/// assert!(context.is_tool_authorized("zoom"));
///
/// manager.clear_security_context(&mut context);
/// assert!(!context.is_tool_authorized("zoom"));
/// # Ok::<(), layergate::ManagerError>(())
/// ```
pub struct SecurityManager {
    config: SecurityConfig,
    services: Services,
    codec: Arc<AuthorizationCodec>,
    security_services: RwLock<Vec<SharedSecurityService>>,
}

impl SecurityManager {
    /// Create a new manager builder.
    pub fn builder() -> SecurityManagerBuilder {
        SecurityManagerBuilder::new()
    }

    /// Get the configuration.
    pub fn config(&self) -> &SecurityConfig {
        &self.config
    }

    /// Get the engine services.
    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Get the authorization codec.
    pub fn codec(&self) -> &Arc<AuthorizationCodec> {
        &self.codec
    }

    /// Create an empty security context bound to this manager's services.
    pub fn new_context(&self) -> SecurityContext {
        SecurityContext::new(self.services.clone(), Arc::clone(&self.codec))
    }

    /// Register a security service.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is empty or already registered.
    pub fn register_service(&self, service: SharedSecurityService) -> ManagerResult<()> {
        let mut services = self.security_services.write();
        check_service(&services, service.as_ref())?;

        info!(service = %service.id(), "Security service registered");
        services.push(service);
        Ok(())
    }

    /// Get the ids of the registered security services, in query order.
    pub fn service_ids(&self) -> Vec<String> {
        self.security_services
            .read()
            .iter()
            .map(|s| s.id().to_string())
            .collect()
    }

    /// Fill a context with the authentications for a token.
    ///
    /// The context is cleared first. Security services are asked in
    /// registration order; unless all services are looped, the first
    /// authentication found ends the search. Returns whether any
    /// authentication was found. The context stays cleared when none was.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is empty.
    pub fn create_security_context(
        &self,
        context: &mut SecurityContext,
        token: &str,
    ) -> ManagerResult<bool> {
        context.clear();
        if token.is_empty() {
            return Err(ManagerError::EmptyArgument("token"));
        }

        // Services are called without holding the registry lock.
        let services: Vec<SharedSecurityService> = self.security_services.read().clone();

        let mut authentications = Vec::new();
        for service in &services {
            if let Some(authentication) = service.authentication(token) {
                debug!(
                    service = %service.id(),
                    authorizations = authentication.authorizations().len(),
                    "Token authenticated"
                );
                authentications.push(authentication);
                if !self.config.loop_all_services {
                    break;
                }
            }
        }

        if authentications.is_empty() {
            info!("Token not authenticated by any security service");
            return Ok(false);
        }

        context.set_authentications(Some(token), authentications)?;
        Ok(true)
    }

    /// Reset a context to the anonymous state, which denies everything.
    pub fn clear_security_context(&self, context: &mut SecurityContext) {
        context.clear();
    }

    /// Restore a context from a snapshot, or clear it when there is none.
    pub fn restore_security_context(
        &self,
        context: &mut SecurityContext,
        saved: Option<&SavedAuthorization>,
    ) {
        match saved {
            Some(saved) => context.restore(saved),
            None => context.clear(),
        }
    }
}

impl std::fmt::Debug for SecurityManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecurityManager")
            .field("config", &self.config)
            .field("security_services", &self.service_ids())
            .finish()
    }
}

fn check_service(
    registered: &[SharedSecurityService],
    service: &dyn SecurityService,
) -> ManagerResult<()> {
    if service.id().is_empty() {
        return Err(ManagerError::EmptyArgument("service id"));
    }
    if registered.iter().any(|s| s.id() == service.id()) {
        return Err(ManagerError::DuplicateService(service.id().to_string()));
    }
    Ok(())
}

/// Builder for [`SecurityManager`].
pub struct SecurityManagerBuilder {
    config: SecurityConfig,
    services: Services,
    codec: Option<Arc<AuthorizationCodec>>,
    security_services: Vec<SharedSecurityService>,
}

impl SecurityManagerBuilder {
    /// Create a new builder with default configuration.
    pub fn new() -> Self {
        Self {
            config: SecurityConfig::default(),
            services: Services::default(),
            codec: None,
            security_services: Vec::new(),
        }
    }

    /// Set the configuration.
    pub fn with_config(mut self, config: SecurityConfig) -> Self {
        self.config = config;
        self
    }

    /// Ask all security services, or stop at the first match.
    pub fn with_loop_all_services(mut self, enabled: bool) -> Self {
        self.config.loop_all_services = enabled;
        self
    }

    /// Set the engine services.
    pub fn with_services(mut self, services: Services) -> Self {
        self.services = services;
        self
    }

    /// Set the layer configuration service.
    pub fn with_layers(mut self, layers: Arc<dyn LayerConfigService>) -> Self {
        self.services.layers = layers;
        self
    }

    /// Set the authorization codec. Defaults to the built-in kinds.
    pub fn with_codec(mut self, codec: Arc<AuthorizationCodec>) -> Self {
        self.codec = Some(codec);
        self
    }

    /// Add a security service.
    pub fn with_security_service<S: SecurityService + 'static>(self, service: S) -> Self {
        self.with_shared_security_service(Arc::new(service))
    }

    /// Add a shared security service.
    pub fn with_shared_security_service(mut self, service: SharedSecurityService) -> Self {
        self.security_services.push(service);
        self
    }

    /// Build the manager.
    ///
    /// # Errors
    ///
    /// Returns an error if a security service id is empty or used twice.
    pub fn build(self) -> ManagerResult<SecurityManager> {
        let mut registered: Vec<SharedSecurityService> = Vec::with_capacity(self.security_services.len());
        for service in self.security_services {
            check_service(&registered, service.as_ref())?;
            registered.push(service);
        }

        info!(
            services = registered.len(),
            loop_all_services = self.config.loop_all_services,
            "Security manager created"
        );

        Ok(SecurityManager {
            config: self.config,
            services: self.services,
            codec: self
                .codec
                .unwrap_or_else(|| Arc::new(AuthorizationCodec::with_builtins())),
            security_services: RwLock::new(registered),
        })
    }
}

impl Default for SecurityManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}
