//! Serialization of authorizations into opaque blobs.
//!
//! A blob is the JSON encoding of `{"kind": ..., "data": ...}`. The kind
//! selects the decoder registered in the [`AuthorizationCodec`]. Blobs only
//! need to round-trip through the same codec; no cross-version format is
//! promised.

use std::sync::Arc;

use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::authorization::{Authorization, SharedAuthorization, standard_kinds};
use crate::builtin::{
    AreaRestriction, AttributeRestriction, BaseAuthorization, FeatureRestriction,
    FilterRestriction,
};
use crate::error::{AuthorizationError, AuthorizationResult};

/// Decoder turning an authorization payload into an authorization.
pub type AuthorizationDecoder =
    Arc<dyn Fn(serde_json::Value) -> AuthorizationResult<SharedAuthorization> + Send + Sync>;

#[derive(Debug, Serialize, Deserialize)]
struct AuthorizationBlob {
    kind: String,
    data: serde_json::Value,
}

/// Registry of authorization kinds, encoding and decoding authorizations.
///
/// # Example
///
/// ```
/// use layergate_authorization::{Authorization, AuthorizationCodec};
/// use layergate_authorization::builtin::BaseAuthorization;
///
/// let codec = AuthorizationCodec::with_builtins();
/// let blob = codec.encode(&BaseAuthorization::allow_all("admin"))?;
/// let decoded = codec.decode(&blob)?;
///
/// assert_eq!(decoded.id(), "admin");
/// assert!(decoded.is_layer_visible("roads"));
/// # Ok::<(), layergate_authorization::AuthorizationError>(())
/// ```
#[derive(Default)]
pub struct AuthorizationCodec {
    decoders: DashMap<String, AuthorizationDecoder>,
}

impl AuthorizationCodec {
    /// Create a codec without any registered kind.
    pub fn new() -> Self {
        Self {
            decoders: DashMap::new(),
        }
    }

    /// Create a codec knowing all built-in authorizations.
    pub fn with_builtins() -> Self {
        let codec = Self::new();
        codec.insert::<BaseAuthorization>(standard_kinds::BASE);
        codec.insert::<AreaRestriction>(standard_kinds::AREA);
        codec.insert::<FeatureRestriction>(standard_kinds::FEATURE);
        codec.insert::<AttributeRestriction>(standard_kinds::ATTRIBUTE);
        codec.insert::<FilterRestriction>(standard_kinds::FILTER);
        codec
    }

    /// Register a serde-deserializable authorization type for a kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind is already registered.
    pub fn register<A>(&self, kind: impl Into<String>) -> AuthorizationResult<()>
    where
        A: Authorization + DeserializeOwned + 'static,
    {
        self.register_decoder(kind, Arc::new(decode_as::<A>))
    }

    /// Register a custom decoder for a kind.
    ///
    /// # Errors
    ///
    /// Returns an error if the kind is already registered.
    pub fn register_decoder(
        &self,
        kind: impl Into<String>,
        decoder: AuthorizationDecoder,
    ) -> AuthorizationResult<()> {
        let kind = kind.into();
        if kind.is_empty() {
            return Err(AuthorizationError::EmptyArgument("kind"));
        }

        match self.decoders.entry(kind.clone()) {
            Entry::Occupied(_) => Err(AuthorizationError::AlreadyRegistered(kind)),
            Entry::Vacant(entry) => {
                entry.insert(decoder);
                info!(kind = %kind, "Authorization kind registered");
                Ok(())
            }
        }
    }

    fn insert<A>(&self, kind: &str)
    where
        A: Authorization + DeserializeOwned + 'static,
    {
        self.decoders
            .insert(kind.to_string(), Arc::new(decode_as::<A>));
    }

    /// Check if a kind is registered.
    pub fn has(&self, kind: &str) -> bool {
        self.decoders.contains_key(kind)
    }

    /// Get all registered kinds, sorted.
    pub fn kinds(&self) -> Vec<String> {
        let mut kinds: Vec<String> = self.decoders.iter().map(|r| r.key().clone()).collect();
        kinds.sort();
        kinds
    }

    /// Build an authorization from its kind and payload.
    ///
    /// The decoded authorization is validated before it is returned.
    pub fn decode_value(
        &self,
        kind: &str,
        data: serde_json::Value,
    ) -> AuthorizationResult<SharedAuthorization> {
        let decoder = self
            .decoders
            .get(kind)
            .map(|r| Arc::clone(r.value()))
            .ok_or_else(|| AuthorizationError::UnknownKind(kind.to_string()))?;

        let authorization = decoder(data)?;
        authorization.validate()?;
        debug!(kind = %kind, authorization = %authorization.id(), "Authorization decoded");
        Ok(authorization)
    }

    /// Serialize an authorization into a blob.
    ///
    /// # Errors
    ///
    /// Returns an error if the authorization is not serializable or its kind
    /// is not registered in this codec.
    pub fn encode(&self, authorization: &dyn Authorization) -> AuthorizationResult<Vec<u8>> {
        let kind = authorization.kind();
        if !self.has(kind) {
            return Err(AuthorizationError::UnknownKind(kind.to_string()));
        }

        let blob = AuthorizationBlob {
            kind: kind.to_string(),
            data: authorization.encode()?,
        };
        Ok(serde_json::to_vec(&blob)?)
    }

    /// Deserialize an authorization from a blob.
    pub fn decode(&self, blob: &[u8]) -> AuthorizationResult<SharedAuthorization> {
        let blob: AuthorizationBlob = serde_json::from_slice(blob)?;
        self.decode_value(&blob.kind, blob.data)
    }
}

fn decode_as<A>(data: serde_json::Value) -> AuthorizationResult<SharedAuthorization>
where
    A: Authorization + DeserializeOwned + 'static,
{
    let authorization: A = serde_json::from_value(data)?;
    Ok(Arc::new(authorization))
}

impl std::fmt::Debug for AuthorizationCodec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthorizationCodec")
            .field("kinds", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use layergate_core::{Envelope, Feature, Filter, Geometry};

    use super::*;
    use crate::builtin::{
        AttributeRules, FeatureRules, FeatureSelector, LayerArea, LayerGrant,
    };

    #[derive(Debug, Serialize, Deserialize)]
    struct Guest {
        id: String,
    }

    impl Authorization for Guest {
        fn id(&self) -> String {
            self.id.clone()
        }

        fn kind(&self) -> &str {
            "guest"
        }

        fn is_tool_authorized(&self, _tool_id: &str) -> bool {
            false
        }

        fn is_command_authorized(&self, _command_name: &str) -> bool {
            false
        }

        fn is_layer_visible(&self, layer_id: &str) -> bool {
            layer_id == "basemap"
        }

        fn is_layer_update_authorized(&self, _layer_id: &str) -> bool {
            false
        }

        fn is_layer_create_authorized(&self, _layer_id: &str) -> bool {
            false
        }

        fn is_layer_delete_authorized(&self, _layer_id: &str) -> bool {
            false
        }

        fn encode(&self) -> AuthorizationResult<serde_json::Value> {
            Ok(serde_json::to_value(self)?)
        }
    }

    #[test]
    fn test_builtin_kinds() {
        let codec = AuthorizationCodec::with_builtins();
        assert_eq!(
            codec.kinds(),
            vec!["area", "attribute", "base", "feature", "filter"]
        );
    }

    #[test]
    fn test_register_custom_kind() {
        let codec = AuthorizationCodec::with_builtins();
        codec.register::<Guest>("guest").unwrap();
        assert!(matches!(
            codec.register::<Guest>("guest"),
            Err(AuthorizationError::AlreadyRegistered(kind)) if kind == "guest"
        ));

        let blob = codec.encode(&Guest { id: "visitor".to_string() }).unwrap();
        let decoded = codec.decode(&blob).unwrap();
        assert_eq!(decoded.id(), "visitor");
        assert!(decoded.is_layer_visible("basemap"));
    }

    #[test]
    fn test_encode_unknown_kind_fails() {
        let codec = AuthorizationCodec::new();
        assert!(matches!(
            codec.encode(&BaseAuthorization::new("base")),
            Err(AuthorizationError::UnknownKind(kind)) if kind == "base"
        ));
    }

    #[test]
    fn test_decode_corrupt_blob_fails() {
        let codec = AuthorizationCodec::with_builtins();
        assert!(codec.decode(b"not json").is_err());
        assert!(codec.decode(br#"{"kind": "nope", "data": {}}"#).is_err());
        assert!(codec.decode(br#"{"kind": "base", "data": {"id": 42}}"#).is_err());
    }

    #[test]
    fn test_decode_validates() {
        let codec = AuthorizationCodec::with_builtins();
        let err = codec
            .decode_value("base", serde_json::json!({"id": ""}))
            .unwrap_err();
        assert!(matches!(err, AuthorizationError::EmptyArgument("id")));
    }

    #[test]
    fn test_builtins_survive_encoding() {
        let codec = AuthorizationCodec::with_builtins();
        let area = Geometry::from_envelope(Envelope::new(0.0, 0.0, 5.0, 5.0), 4326);
        let feature = Feature::new("f1").with_attribute("owner", "bob");

        let authorizations: Vec<SharedAuthorization> = vec![
            Arc::new(BaseAuthorization::new("base").with_layer(LayerGrant::read_only("roads"))),
            Arc::new(
                AreaRestriction::new(BaseAuthorization::new("area"))
                    .with_area("roads", LayerArea::new(area.clone()).with_partly_sufficient(true)),
            ),
            Arc::new(
                AttributeRestriction::new(FeatureRestriction::new(BaseAuthorization::new("attr")).with_rules(
                    "roads",
                    FeatureRules::visible(FeatureSelector::attribute_equals("owner", "bob")),
                ))
                .with_attributes("roads", AttributeRules::new().with_readable("name")),
            ),
            Arc::new(
                FilterRestriction::new(BaseAuthorization::new("filter"))
                    .with_filter("roads", Filter::expression("owner = 'bob'")),
            ),
        ];

        for original in &authorizations {
            let decoded = codec.decode(&codec.encode(original.as_ref()).unwrap()).unwrap();
            assert_eq!(decoded.id(), original.id());
            assert_eq!(decoded.kind(), original.kind());
            assert_eq!(decoded.is_layer_visible("roads"), original.is_layer_visible("roads"));
        }

        let area_auth = codec.decode(&codec.encode(authorizations[1].as_ref()).unwrap()).unwrap();
        let area_cap = area_auth.as_area().unwrap();
        assert_eq!(area_cap.visible_area("roads"), Some(area));
        assert!(area_cap.is_partly_visible_sufficient("roads"));

        let attr_auth = codec.decode(&codec.encode(authorizations[2].as_ref()).unwrap()).unwrap();
        let attr_cap = attr_auth.as_attribute().unwrap();
        assert!(attr_cap.is_attribute_readable("roads", &feature, "name"));
        assert!(!attr_cap.is_attribute_readable("roads", &feature, "owner"));

        let filter_auth = codec.decode(&codec.encode(authorizations[3].as_ref()).unwrap()).unwrap();
        assert_eq!(
            filter_auth.as_select_filter().unwrap().feature_filter("roads"),
            Some(Filter::expression("owner = 'bob'"))
        );
    }
}
