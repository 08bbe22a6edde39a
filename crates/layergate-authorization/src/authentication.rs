//! Authentications: what one security service grants for one token.

use std::sync::Arc;

use crate::authorization::{Authorization, SharedAuthorization};
use crate::error::{AuthorizationError, AuthorizationResult};

/// Authorizations issued by one security service for one token, together
/// with the identity of the user behind the token.
///
/// # Example
///
/// ```
/// use layergate_authorization::Authentication;
/// use layergate_authorization::builtin::BaseAuthorization;
///
/// let authentication = Authentication::new("ldap")?
///     .with_user_id("bob")
///     .with_user_name("Bob Builder")
///     .with_authorization(BaseAuthorization::allow_all("admin"));
///
/// assert_eq!(authentication.security_service_id(), "ldap");
/// assert_eq!(authentication.authorization_ids(), vec!["admin".to_string()]);
/// # Ok::<(), layergate_authorization::AuthorizationError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Authentication {
    security_service_id: String,
    user_id: Option<String>,
    user_name: Option<String>,
    user_locale: Option<String>,
    user_organization: Option<String>,
    user_division: Option<String>,
    authorizations: Vec<SharedAuthorization>,
}

impl Authentication {
    /// Create an authentication for a security service.
    ///
    /// # Errors
    ///
    /// Returns an error if the security service id is empty.
    pub fn new(security_service_id: impl Into<String>) -> AuthorizationResult<Self> {
        let security_service_id = security_service_id.into();
        if security_service_id.is_empty() {
            return Err(AuthorizationError::EmptyArgument("security_service_id"));
        }

        Ok(Self {
            security_service_id,
            user_id: None,
            user_name: None,
            user_locale: None,
            user_organization: None,
            user_division: None,
            authorizations: Vec::new(),
        })
    }

    /// Set the user id.
    pub fn with_user_id(mut self, user_id: impl Into<String>) -> Self {
        self.user_id = Some(user_id.into());
        self
    }

    /// Set the user name.
    pub fn with_user_name(mut self, user_name: impl Into<String>) -> Self {
        self.user_name = Some(user_name.into());
        self
    }

    /// Set the user locale, e.g. `nl_BE`.
    pub fn with_user_locale(mut self, user_locale: impl Into<String>) -> Self {
        self.user_locale = Some(user_locale.into());
        self
    }

    /// Set the user organization.
    pub fn with_user_organization(mut self, user_organization: impl Into<String>) -> Self {
        self.user_organization = Some(user_organization.into());
        self
    }

    /// Set the user division.
    pub fn with_user_division(mut self, user_division: impl Into<String>) -> Self {
        self.user_division = Some(user_division.into());
        self
    }

    /// Add an authorization.
    pub fn with_authorization<A: Authorization + 'static>(self, authorization: A) -> Self {
        self.with_shared_authorization(Arc::new(authorization))
    }

    /// Add a shared authorization.
    pub fn with_shared_authorization(mut self, authorization: SharedAuthorization) -> Self {
        self.authorizations.push(authorization);
        self
    }

    /// Replace all authorizations.
    pub fn with_authorizations(mut self, authorizations: Vec<SharedAuthorization>) -> Self {
        self.authorizations = authorizations;
        self
    }

    /// Get the id of the security service which issued this authentication.
    pub fn security_service_id(&self) -> &str {
        &self.security_service_id
    }

    /// Get the user id.
    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// Get the user name.
    pub fn user_name(&self) -> Option<&str> {
        self.user_name.as_deref()
    }

    /// Get the user locale.
    pub fn user_locale(&self) -> Option<&str> {
        self.user_locale.as_deref()
    }

    /// Get the user organization.
    pub fn user_organization(&self) -> Option<&str> {
        self.user_organization.as_deref()
    }

    /// Get the user division.
    pub fn user_division(&self) -> Option<&str> {
        self.user_division.as_deref()
    }

    /// Get the authorizations, in issue order.
    pub fn authorizations(&self) -> &[SharedAuthorization] {
        &self.authorizations
    }

    /// Get the authorization ids, sorted.
    pub fn authorization_ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.authorizations.iter().map(|a| a.id()).collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builtin::BaseAuthorization;

    #[test]
    fn test_empty_service_id_rejected() {
        assert!(matches!(
            Authentication::new(""),
            Err(AuthorizationError::EmptyArgument("security_service_id"))
        ));
    }

    #[test]
    fn test_user_info() {
        let auth = Authentication::new("ldap")
            .unwrap()
            .with_user_id("bob")
            .with_user_name("Bob")
            .with_user_locale("nl_BE")
            .with_user_organization("Acme")
            .with_user_division("GIS");

        assert_eq!(auth.user_id(), Some("bob"));
        assert_eq!(auth.user_name(), Some("Bob"));
        assert_eq!(auth.user_locale(), Some("nl_BE"));
        assert_eq!(auth.user_organization(), Some("Acme"));
        assert_eq!(auth.user_division(), Some("GIS"));
    }

    #[test]
    fn test_authorization_ids_sorted() {
        let auth = Authentication::new("ldap")
            .unwrap()
            .with_authorization(BaseAuthorization::new("zeta"))
            .with_authorization(BaseAuthorization::new("alpha"))
            .with_authorization(BaseAuthorization::new("mid"));

        assert_eq!(auth.authorizations()[0].id(), "zeta");
        assert_eq!(auth.authorization_ids(), vec!["alpha", "mid", "zeta"]);
    }

    #[test]
    fn test_clone_shares_authorizations() {
        let auth = Authentication::new("ldap")
            .unwrap()
            .with_authorization(BaseAuthorization::new("guest"));
        let cloned = auth.clone();

        assert!(Arc::ptr_eq(&auth.authorizations()[0], &cloned.authorizations()[0]));
    }
}
