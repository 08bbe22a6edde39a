//! The per-request security context.

use std::sync::Arc;

use layergate_authorization::{
    Authentication, AuthorizationCodec, AuthorizationResult, SharedAuthorization,
};
use layergate_core::{Feature, Filter, Geometry, LayerInfo, SecurityError, SecurityResult, Services};
use tracing::{debug, info, warn};

use crate::combine::{
    any_authorization, attribute_decision, combine_area, combine_filter,
    combine_partly_sufficient, context_id, feature_decision,
};
use crate::saved::SavedAuthorization;
use crate::user_info::UserInfo;

/// Access decisions for the authentications of one token.
///
/// A context belongs to a single request. It starts out empty, which denies
/// everything, and is filled by the security manager or restored from a
/// [`SavedAuthorization`].
///
/// # Example
///
/// ```
/// use std::sync::Arc;
///
/// use layergate_authorization::{Authentication, AuthorizationCodec};
/// use layergate_authorization::builtin::{BaseAuthorization, LayerGrant};
/// use layergate_context::SecurityContext;
/// use layergate_core::Services;
///
/// let mut context = SecurityContext::new(Services::default(), Arc::new(AuthorizationCodec::with_builtins()));
/// assert!(!context.is_layer_visible("roads"));
///
/// let authentication = Authentication::new("static")?
///     .with_authorization(BaseAuthorization::new("viewer").with_layer(LayerGrant::read_only("roads")));
/// context.set_authentications(Some("secret"), vec![authentication])?;
///
/// assert!(context.is_layer_visible("roads"));
/// assert_eq!(context.id(), "viewer@static");
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// ```
#[derive(Debug, Clone)]
pub struct SecurityContext {
    services: Services,
    codec: Arc<AuthorizationCodec>,
    authentications: Vec<Authentication>,
    token: Option<String>,
    id: String,
    user: UserInfo,
}

impl SecurityContext {
    /// Create an empty context.
    pub fn new(services: Services, codec: Arc<AuthorizationCodec>) -> Self {
        Self {
            services,
            codec,
            authentications: Vec::new(),
            token: None,
            id: String::new(),
            user: UserInfo::default(),
        }
    }

    /// Replace the authentications held by this context.
    ///
    /// Authorizations needing services are wired first. User info and the
    /// context id are recomputed.
    ///
    /// # Errors
    ///
    /// Returns an error if the token is present but empty.
    pub fn set_authentications(
        &mut self,
        token: Option<&str>,
        authentications: Vec<Authentication>,
    ) -> SecurityResult<()> {
        if token.is_some_and(str::is_empty) {
            return Err(SecurityError::EmptyArgument("token"));
        }

        self.install(token.map(str::to_string), authentications);
        Ok(())
    }

    fn install(&mut self, token: Option<String>, authentications: Vec<Authentication>) {
        self.authentications = authentications
            .into_iter()
            .map(|authentication| self.wire(authentication))
            .collect();
        self.token = token;
        self.user = UserInfo::combine_all(&self.authentications);
        self.id = context_id(&self.authentications);

        info!(
            context = %self.id,
            authentications = self.authentications.len(),
            "Security context set"
        );
    }

    fn wire(&self, authentication: Authentication) -> Authentication {
        let wired: Vec<SharedAuthorization> = authentication
            .authorizations()
            .iter()
            .map(|authorization| match authorization.as_needs_wiring() {
                Some(needs_wiring) => {
                    debug!(authorization = %authorization.id(), "Wiring authorization");
                    needs_wiring.wire(&self.services)
                }
                None => Arc::clone(authorization),
            })
            .collect();
        authentication.with_authorizations(wired)
    }

    /// Drop all authentications and the token. The context denies everything
    /// afterwards.
    pub fn clear(&mut self) {
        self.authentications.clear();
        self.token = None;
        self.user = UserInfo::default();
        self.id.clear();
        debug!("Security context cleared");
    }

    /// Get the token the authentications were obtained for.
    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    /// Get the context id, usable as a cache key for decisions.
    ///
    /// Contexts holding the same authorization ids per security service have
    /// the same id.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Get the authentications.
    pub fn authentications(&self) -> &[Authentication] {
        &self.authentications
    }

    /// Check if the context holds no authentication.
    pub fn is_empty(&self) -> bool {
        self.authentications.is_empty()
    }

    /// Get the aggregated user info.
    pub fn user_info(&self) -> &UserInfo {
        &self.user
    }

    /// Get the aggregated user id.
    pub fn user_id(&self) -> Option<&str> {
        self.user.id.as_deref()
    }

    /// Get the aggregated user name.
    pub fn user_name(&self) -> Option<&str> {
        self.user.name.as_deref()
    }

    /// Get the user locale, if all authentications agree on it.
    pub fn user_locale(&self) -> Option<&str> {
        self.user.locale.as_deref()
    }

    /// Get the aggregated user organization.
    pub fn user_organization(&self) -> Option<&str> {
        self.user.organization.as_deref()
    }

    /// Get the aggregated user division.
    pub fn user_division(&self) -> Option<&str> {
        self.user.division.as_deref()
    }

    /// Get the collaborator services.
    pub fn services(&self) -> &Services {
        &self.services
    }

    /// Get the authorization codec.
    pub fn codec(&self) -> &Arc<AuthorizationCodec> {
        &self.codec
    }

    // --- snapshots ---

    /// Snapshot the authentications.
    ///
    /// # Errors
    ///
    /// Returns an error if an authorization has a kind the codec cannot
    /// encode.
    pub fn saved_authorization(&self) -> AuthorizationResult<SavedAuthorization> {
        SavedAuthorization::capture(&self.authentications, &self.codec)
    }

    /// Replace the authentications with those of a snapshot. The token is
    /// dropped.
    pub fn restore(&mut self, saved: &SavedAuthorization) {
        let authentications = saved.restore(&self.codec);
        self.install(None, authentications);
    }

    // --- base gates ---

    /// Check if a tool may be used.
    pub fn is_tool_authorized(&self, tool_id: &str) -> bool {
        any_authorization(&self.authentications, |a| a.is_tool_authorized(tool_id))
    }

    /// Check if a command may be executed.
    pub fn is_command_authorized(&self, command_name: &str) -> bool {
        any_authorization(&self.authentications, |a| a.is_command_authorized(command_name))
    }

    /// Check if a layer is visible.
    pub fn is_layer_visible(&self, layer_id: &str) -> bool {
        any_authorization(&self.authentications, |a| a.is_layer_visible(layer_id))
    }

    /// Check if features of a layer may be updated.
    pub fn is_layer_update_authorized(&self, layer_id: &str) -> bool {
        self.is_layer_update_capable(layer_id)
            && any_authorization(&self.authentications, |a| a.is_layer_update_authorized(layer_id))
    }

    /// Check if features may be created in a layer.
    pub fn is_layer_create_authorized(&self, layer_id: &str) -> bool {
        self.is_layer_create_capable(layer_id)
            && any_authorization(&self.authentications, |a| a.is_layer_create_authorized(layer_id))
    }

    /// Check if features of a layer may be deleted.
    pub fn is_layer_delete_authorized(&self, layer_id: &str) -> bool {
        self.is_layer_delete_capable(layer_id)
            && any_authorization(&self.authentications, |a| a.is_layer_delete_authorized(layer_id))
    }

    fn is_layer_capable(&self, layer_id: &str, capable: impl Fn(&LayerInfo) -> bool) -> bool {
        match self.services.layers.layer(layer_id) {
            Ok(layer) => capable(&layer),
            Err(e) => {
                warn!(layer = %layer_id, error = %e, "Layer capability unknown, denying");
                false
            }
        }
    }

    fn is_layer_update_capable(&self, layer_id: &str) -> bool {
        self.is_layer_capable(layer_id, |l| l.update_capable)
    }

    fn is_layer_create_capable(&self, layer_id: &str) -> bool {
        self.is_layer_capable(layer_id, |l| l.create_capable)
    }

    fn is_layer_delete_capable(&self, layer_id: &str) -> bool {
        self.is_layer_capable(layer_id, |l| l.delete_capable)
    }

    // --- features ---

    /// Check if a feature is visible.
    pub fn is_feature_visible(&self, layer_id: &str, feature: &Feature) -> bool {
        feature_decision(
            &self.authentications,
            layer_id,
            |f| f.is_feature_visible(layer_id, feature),
            |a| a.is_layer_visible(layer_id),
        )
    }

    /// Check if a feature may be updated.
    pub fn is_feature_update_authorized(&self, layer_id: &str, feature: &Feature) -> bool {
        self.is_layer_update_capable(layer_id)
            && feature_decision(
                &self.authentications,
                layer_id,
                |f| f.is_feature_update_authorized(layer_id, feature),
                |a| a.is_layer_update_authorized(layer_id),
            )
    }

    /// Check if `original` may be updated into `updated`.
    pub fn is_feature_change_authorized(
        &self,
        layer_id: &str,
        original: &Feature,
        updated: &Feature,
    ) -> bool {
        self.is_layer_update_capable(layer_id)
            && feature_decision(
                &self.authentications,
                layer_id,
                |f| f.is_feature_change_authorized(layer_id, original, updated),
                |a| a.is_layer_update_authorized(layer_id),
            )
    }

    /// Check if a feature may be created.
    pub fn is_feature_create_authorized(&self, layer_id: &str, feature: &Feature) -> bool {
        self.is_layer_create_capable(layer_id)
            && feature_decision(
                &self.authentications,
                layer_id,
                |f| f.is_feature_create_authorized(layer_id, feature),
                |a| a.is_layer_create_authorized(layer_id),
            )
    }

    /// Check if a feature may be deleted.
    pub fn is_feature_delete_authorized(&self, layer_id: &str, feature: &Feature) -> bool {
        self.is_layer_delete_capable(layer_id)
            && feature_decision(
                &self.authentications,
                layer_id,
                |f| f.is_feature_delete_authorized(layer_id, feature),
                |a| a.is_layer_delete_authorized(layer_id),
            )
    }

    // --- attributes ---

    /// Check if an attribute of a feature may be read.
    pub fn is_attribute_readable(&self, layer_id: &str, feature: &Feature, attribute: &str) -> bool {
        attribute_decision(
            &self.authentications,
            layer_id,
            |a| a.is_attribute_readable(layer_id, feature, attribute),
            || self.is_feature_visible(layer_id, feature),
        )
    }

    /// Check if an attribute of a feature may be written.
    pub fn is_attribute_writable(&self, layer_id: &str, feature: &Feature, attribute: &str) -> bool {
        self.is_layer_update_capable(layer_id)
            && attribute_decision(
                &self.authentications,
                layer_id,
                |a| a.is_attribute_writable(layer_id, feature, attribute),
                || self.is_feature_update_authorized(layer_id, feature),
            )
    }

    // --- areas ---

    /// Area in which features of a layer are visible.
    ///
    /// `None` when the context is empty or the layer is unknown. An empty
    /// geometry means nothing is visible.
    pub fn visible_area(&self, layer_id: &str) -> Option<Geometry> {
        combine_area(&self.authentications, &self.services, layer_id, |a| {
            a.visible_area(layer_id)
        })
    }

    /// Area in which features of a layer may be updated.
    pub fn update_authorized_area(&self, layer_id: &str) -> Option<Geometry> {
        combine_area(&self.authentications, &self.services, layer_id, |a| {
            a.update_authorized_area(layer_id)
        })
    }

    /// Area in which features may be created in a layer.
    pub fn create_authorized_area(&self, layer_id: &str) -> Option<Geometry> {
        combine_area(&self.authentications, &self.services, layer_id, |a| {
            a.create_authorized_area(layer_id)
        })
    }

    /// Area in which features of a layer may be deleted.
    pub fn delete_authorized_area(&self, layer_id: &str) -> Option<Geometry> {
        combine_area(&self.authentications, &self.services, layer_id, |a| {
            a.delete_authorized_area(layer_id)
        })
    }

    /// Check if partial overlap with the visible area is enough.
    pub fn is_partly_visible_sufficient(&self, layer_id: &str) -> bool {
        combine_partly_sufficient(&self.authentications, |a| {
            a.is_partly_visible_sufficient(layer_id)
        })
    }

    /// Check if partial overlap with the update area is enough.
    pub fn is_partly_update_authorized_sufficient(&self, layer_id: &str) -> bool {
        combine_partly_sufficient(&self.authentications, |a| {
            a.is_partly_update_authorized_sufficient(layer_id)
        })
    }

    /// Check if partial overlap with the create area is enough.
    pub fn is_partly_create_authorized_sufficient(&self, layer_id: &str) -> bool {
        combine_partly_sufficient(&self.authentications, |a| {
            a.is_partly_create_authorized_sufficient(layer_id)
        })
    }

    /// Check if partial overlap with the delete area is enough.
    pub fn is_partly_delete_authorized_sufficient(&self, layer_id: &str) -> bool {
        combine_partly_sufficient(&self.authentications, |a| {
            a.is_partly_delete_authorized_sufficient(layer_id)
        })
    }

    // --- filters ---

    /// Extra select filter for a layer, `None` when unrestricted.
    pub fn feature_filter(&self, layer_id: &str) -> Option<Filter> {
        combine_filter(&self.authentications, &self.services, layer_id)
    }
}
