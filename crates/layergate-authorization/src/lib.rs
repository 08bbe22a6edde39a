//! Layergate Authorizations
//!
//! This crate provides the permission objects of the Layergate
//! access-decision engine. Security services issue [`Authentication`]s,
//! each holding the [`Authorization`]s granted for one token.
//!
//! # Capabilities
//!
//! Every authorization answers the base gates: tools, commands, layer
//! visibility and layer edits. Richer capabilities are optional:
//!
//! - [`AreaAuthorization`]: geometric restriction per layer
//! - [`FeatureAuthorization`]: per-feature visibility and edits
//! - [`AttributeAuthorization`]: per-attribute read and write access
//! - [`SelectFilterAuthorization`]: extra select filter per layer
//! - [`AuthorizationNeedsWiring`]: needs engine services before use
//!
//! An authorization without a capability falls back to its base gates when
//! the engine combines decisions.
//!
//! # Usage
//!
//! ```ignore
//! use layergate_authorization::{Authentication, AuthorizationCodec};
//! use layergate_authorization::builtin::{BaseAuthorization, LayerGrant};
//!
//! let authentication = Authentication::new("ldap")?
//!     .with_user_id("bob")
//!     .with_authorization(BaseAuthorization::new("viewer").with_layer(LayerGrant::read_only("*")));
//!
//! // Authorizations travel as opaque blobs in saved authorizations
//! let codec = AuthorizationCodec::with_builtins();
//! let blob = codec.encode(authentication.authorizations()[0].as_ref())?;
//! ```

pub mod authentication;
pub mod authorization;
pub mod builtin;
pub mod codec;
pub mod error;
pub mod pattern;

// Re-export main types
pub use authentication::Authentication;
pub use authorization::{
    AreaAuthorization, AttributeAuthorization, Authorization, AuthorizationNeedsWiring,
    FeatureAuthorization, SelectFilterAuthorization, SharedAuthorization, standard_kinds,
};
pub use codec::{AuthorizationCodec, AuthorizationDecoder};
pub use error::{AuthorizationError, AuthorizationResult};
pub use pattern::IdPattern;

// Re-export built-in authorizations
pub use builtin::{
    AreaRestriction, AttributeRestriction, AttributeRules, BaseAuthorization, FeatureRestriction,
    FeatureRules, FeatureSelector, FilterRestriction, LayerArea, LayerGrant,
};

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::authentication::Authentication;
    pub use crate::authorization::{
        AreaAuthorization, AttributeAuthorization, Authorization, FeatureAuthorization,
        SelectFilterAuthorization, SharedAuthorization,
    };
    pub use crate::codec::AuthorizationCodec;
    pub use crate::error::{AuthorizationError, AuthorizationResult};

    // Built-in authorizations
    pub use crate::builtin::{
        AreaRestriction, AttributeRestriction, BaseAuthorization, FeatureRestriction,
        FilterRestriction, LayerGrant,
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prelude_imports() {
        use crate::prelude::*;

        let _ = BaseAuthorization::new("test");
        let _ = AuthorizationCodec::new();
    }

    #[test]
    fn test_authentication_with_builtins() {
        let authentication = Authentication::new("static")
            .unwrap()
            .with_authorization(BaseAuthorization::new("viewer").with_layer(LayerGrant::read_only("*")))
            .with_authorization(FilterRestriction::new(BaseAuthorization::new("filtered")));

        assert_eq!(authentication.authorizations().len(), 2);
        assert!(authentication.authorizations()[0].is_layer_visible("roads"));
        assert!(authentication.authorizations()[1].as_select_filter().is_some());
    }
}
