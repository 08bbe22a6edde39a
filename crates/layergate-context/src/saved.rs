//! Serializable snapshots of a security context.
//!
//! A [`SavedAuthorization`] holds, per authentication, the security service
//! id, the user info and one opaque blob per authorization. Capturing fails
//! when any authorization cannot be encoded, since a snapshot missing a
//! restriction would grant more than its context. Restoring never fails: a
//! blob which cannot be decoded empties the authorization list of its
//! authentication.

use layergate_authorization::{Authentication, AuthorizationCodec, AuthorizationResult};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::user_info::UserInfo;

/// Saved form of one authentication.
///
/// Equality and hashing compare the blobs byte for byte.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SavedAuthentication {
    /// Id of the issuing security service.
    pub security_service_id: String,
    /// User identity.
    #[serde(default)]
    pub user: UserInfo,
    /// Encoded authorizations.
    #[serde(default)]
    pub authorizations: Vec<Vec<u8>>,
}

impl SavedAuthentication {
    /// Encode an authentication.
    ///
    /// # Errors
    ///
    /// Returns an error if any of its authorizations cannot be encoded.
    pub fn capture(authentication: &Authentication, codec: &AuthorizationCodec) -> AuthorizationResult<Self> {
        let authorizations = authentication
            .authorizations()
            .iter()
            .map(|authorization| {
                codec.encode(authorization.as_ref()).inspect_err(|e| {
                    warn!(
                        service = %authentication.security_service_id(),
                        authorization = %authorization.id(),
                        error = %e,
                        "Cannot save authorization"
                    );
                })
            })
            .collect::<AuthorizationResult<Vec<_>>>()?;

        Ok(Self {
            security_service_id: authentication.security_service_id().to_string(),
            user: UserInfo::of(authentication),
            authorizations,
        })
    }

    /// Rebuild the authentication.
    ///
    /// Returns `None` when the security service id is empty. When any blob
    /// fails to decode, the authentication keeps no authorization at all.
    pub fn restore(&self, codec: &AuthorizationCodec) -> Option<Authentication> {
        let mut authentication = match Authentication::new(self.security_service_id.as_str()) {
            Ok(authentication) => authentication,
            Err(e) => {
                warn!(error = %e, "Saved authentication skipped");
                return None;
            }
        };

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

        let decoded: Result<Vec<_>, _> = self
            .authorizations
            .iter()
            .map(|blob| codec.decode(blob))
            .collect();

        match decoded {
            Ok(authorizations) => Some(authentication.with_authorizations(authorizations)),
            Err(e) => {
                warn!(
                    service = %self.security_service_id,
                    error = %e,
                    "Cannot decode saved authorization, authentication grants nothing"
                );
                Some(authentication)
            }
        }
    }
}

/// Saved form of a security context.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SavedAuthorization {
    /// Saved authentications, in context order.
    #[serde(default)]
    pub authentications: Vec<SavedAuthentication>,
}

impl SavedAuthorization {
    /// Encode a list of authentications.
    ///
    /// # Errors
    ///
    /// Returns an error if any authorization cannot be encoded.
    pub fn capture(authentications: &[Authentication], codec: &AuthorizationCodec) -> AuthorizationResult<Self> {
        let saved = Self {
            authentications: authentications
                .iter()
                .map(|a| SavedAuthentication::capture(a, codec))
                .collect::<AuthorizationResult<_>>()?,
        };
        debug!(authentications = saved.authentications.len(), "Authorization saved");
        Ok(saved)
    }

    /// Rebuild the list of authentications.
    pub fn restore(&self, codec: &AuthorizationCodec) -> Vec<Authentication> {
        self.authentications
            .iter()
            .filter_map(|a| a.restore(codec))
            .collect()
    }

    /// Check if the snapshot holds no authentication.
    pub fn is_empty(&self) -> bool {
        self.authentications.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use layergate_authorization::builtin::{AreaRestriction, BaseAuthorization, LayerArea, LayerGrant};
    use layergate_authorization::{AuthorizationError, standard_kinds};
    use layergate_core::{Envelope, Geometry};

    use super::*;

    fn authentication() -> Authentication {
        Authentication::new("ldap")
            .unwrap()
            .with_user_id("bob")
            .with_user_locale("nl_BE")
            .with_authorization(BaseAuthorization::new("viewer").with_layer(LayerGrant::read_only("roads")))
            .with_authorization(BaseAuthorization::new("tools").with_tool("zoom"))
    }

    #[test]
    fn test_capture_and_restore() {
        let codec = AuthorizationCodec::with_builtins();
        let saved = SavedAuthorization::capture(&[authentication()], &codec).unwrap();
        assert_eq!(saved.authentications[0].authorizations.len(), 2);

        let restored = saved.restore(&codec);
        assert_eq!(restored.len(), 1);
        assert_eq!(restored[0].security_service_id(), "ldap");
        assert_eq!(restored[0].user_id(), Some("bob"));
        assert_eq!(restored[0].user_locale(), Some("nl_BE"));
        assert_eq!(restored[0].authorization_ids(), vec!["tools", "viewer"]);
        assert!(restored[0].authorizations()[0].is_layer_visible("roads"));
    }

    #[test]
    fn test_unknown_kind_fails_capture() {
        let codec = AuthorizationCodec::new();
        assert!(matches!(
            SavedAuthorization::capture(&[authentication()], &codec),
            Err(AuthorizationError::UnknownKind(kind)) if kind == "base"
        ));
    }

    #[test]
    fn test_capture_keeps_every_restriction_or_fails() {
        let codec = AuthorizationCodec::new();
        codec.register::<BaseAuthorization>(standard_kinds::BASE).unwrap();

        let restricted = authentication().with_authorization(
            AreaRestriction::new(BaseAuthorization::new("zone")).with_area(
                "roads",
                LayerArea::new(Geometry::from_envelope(Envelope::new(0.0, 0.0, 10.0, 10.0), 4326)),
            ),
        );
        assert!(SavedAuthorization::capture(&[restricted.clone()], &codec).is_err());

        let complete = SavedAuthorization::capture(&[restricted], &AuthorizationCodec::with_builtins()).unwrap();
        assert_eq!(complete.authentications[0].authorizations.len(), 3);
    }

    #[test]
    fn test_corrupt_blob_empties_authentication() {
        let codec = AuthorizationCodec::with_builtins();
        let mut saved = SavedAuthorization::capture(&[authentication()], &codec).unwrap();
        saved.authentications[0].authorizations.push(b"garbage".to_vec());

        let restored = saved.restore(&codec);
        assert_eq!(restored.len(), 1);
        assert!(restored[0].authorizations().is_empty());
        assert_eq!(restored[0].user_id(), Some("bob"));
    }

    #[test]
    fn test_empty_service_id_skipped() {
        let saved = SavedAuthorization {
            authentications: vec![SavedAuthentication::default()],
        };
        assert!(saved.restore(&AuthorizationCodec::with_builtins()).is_empty());
    }

    #[test]
    fn test_equality_is_byte_exact() {
        let codec = AuthorizationCodec::with_builtins();
        let first = SavedAuthorization::capture(&[authentication()], &codec).unwrap();
        let second = SavedAuthorization::capture(&[authentication()], &codec).unwrap();
        assert_eq!(first, second);

        let mut changed = second.clone();
        changed.authentications[0].authorizations[0].push(b' ');
        assert_ne!(first, changed);

        let set: HashSet<SavedAuthorization> = [first, second, changed].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn test_serde_snapshot() {
        let codec = AuthorizationCodec::with_builtins();
        let saved = SavedAuthorization::capture(&[authentication()], &codec).unwrap();
        let json = serde_json::to_string(&saved).unwrap();
        let parsed: SavedAuthorization = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, saved);
    }
}
