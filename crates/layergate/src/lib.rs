//! # Layergate - Access Decisions for Geospatial Data Servers
//!
//! Layergate decides, per request, which tools, commands, layers, features
//! and attributes a caller may see or edit, and to which area of a layer the
//! caller is restricted.
//!
//! ## Features
//!
//! - **Aggregation**: a token may be authenticated by several security
//!   services at once; their authorizations are combined with fixed,
//!   order-independent rules
//! - **Deny by default**: an empty or damaged context grants nothing
//! - **Areas**: authorized areas are intersected with the layer extent
//! - **Snapshots**: contexts can be saved and restored without asking the
//!   security services again
//!
//! ## Quick Start
//!
//! ```ignore
//! use layergate::prelude::*;
//!
//! let manager = DeploymentConfig::from_file("layergate.toml")?.build_manager()?;
//!
//! let mut context = manager.new_context();
//! if manager.create_security_context(&mut context, token)? {
//!     let visible = context.is_layer_visible("roads");
//!     let area = context.visible_area("roads");
//! }
//!
//! // Cache the context between requests
//! let saved = context.saved_authorization()?;
//! manager.restore_security_context(&mut context, Some(&saved));
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │                     Your data server                     │
//! ├──────────────────────────────────────────────────────────┤
//! │                   layergate (facade)                     │
//! │        SecurityManager · SecurityService · config        │
//! │                          │                               │
//! │  ┌──────────────────┬────┴──────────────┬─────────────┐  │
//! │  │ layergate-context│ layergate-        │ layergate-  │  │
//! │  │ (context,        │ authorization     │ core        │  │
//! │  │  combiner,       │ (authorizations,  │ (geometry,  │  │
//! │  │  snapshots)      │  codec)           │  layers)    │  │
//! │  └──────────────────┴───────────────────┴─────────────┘  │
//! └──────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod error;
pub mod manager;
pub mod service;

pub use config::{AuthorizationConfig, DeploymentConfig, ServiceConfig, TokenConfig};
pub use error::{ManagerError, ManagerResult};
pub use manager::{SecurityManager, SecurityManagerBuilder};
pub use service::{SecurityService, SharedSecurityService, StaticSecurityService};

// Re-export from sub-crates
pub use layergate_authorization;
pub use layergate_context;
pub use layergate_core;

/// Prelude module for convenient imports.
pub mod prelude {
    // Main types
    pub use crate::{
        DeploymentConfig, ManagerError, ManagerResult, SecurityManager, SecurityService,
        StaticSecurityService,
    };

    // Context types
    pub use layergate_context::{SavedAuthorization, SecurityContext, UserInfo};

    // Authorization types
    pub use layergate_authorization::{
        AreaRestriction, AttributeRestriction, Authentication, Authorization,
        AuthorizationCodec, BaseAuthorization, FeatureRestriction, FilterRestriction, LayerGrant,
    };

    // Core types
    pub use layergate_core::{
        Envelope, Feature, Filter, Geometry, LayerInfo, SecurityConfig, Services,
        StaticLayerConfig,
    };

    pub use std::sync::Arc;
}

#[cfg(test)]
mod tests {
    use super::prelude::*;

    #[test]
    fn test_prelude_end_to_end() {
        let manager = SecurityManager::builder()
            .with_layers(Arc::new(StaticLayerConfig::with_layers([LayerInfo::new(
                "roads",
                "EPSG:4326",
                Envelope::new(0.0, 0.0, 10.0, 10.0),
            )])))
            .with_security_service(StaticSecurityService::new("static").unwrap().with_token(
                "t",
                Authentication::new("static")
                    .unwrap()
                    .with_authorization(BaseAuthorization::new("viewer").with_layer(LayerGrant::read_only("roads"))),
            ))
            .build()
            .unwrap();

        let mut context = manager.new_context();
        assert!(manager.create_security_context(&mut context, "t").unwrap());
        assert!(context.is_layer_visible("roads"));
        assert!(!context.is_layer_update_authorized("roads"));
        assert_eq!(
            context.visible_area("roads"),
            Some(Geometry::from_envelope(Envelope::new(0.0, 0.0, 10.0, 10.0), 4326))
        );
    }
}
