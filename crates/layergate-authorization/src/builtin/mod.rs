//! Built-in authorizations.
//!
//! All built-ins are configurable through serde and registered in
//! [`AuthorizationCodec::with_builtins`](crate::AuthorizationCodec::with_builtins):
//!
//! - [`BaseAuthorization`]: tool, command and layer gates
//! - [`AreaRestriction`]: geometric restriction per layer
//! - [`FeatureRestriction`]: per-feature visibility and edits
//! - [`AttributeRestriction`]: per-attribute read and write access
//! - [`FilterRestriction`]: select filters per layer
//!
//! The restrictions embed a [`BaseAuthorization`] which answers the base
//! gates.

/// Forward the base gates to an embedded [`BaseAuthorization`].
macro_rules! delegate_base_gates {
    ($($field:ident).+) => {
        fn is_tool_authorized(&self, tool_id: &str) -> bool {
            self.$($field).+.is_tool_authorized(tool_id)
        }

        fn is_command_authorized(&self, command_name: &str) -> bool {
            self.$($field).+.is_command_authorized(command_name)
        }

        fn is_layer_visible(&self, layer_id: &str) -> bool {
            self.$($field).+.is_layer_visible(layer_id)
        }

        fn is_layer_update_authorized(&self, layer_id: &str) -> bool {
            self.$($field).+.is_layer_update_authorized(layer_id)
        }

        fn is_layer_create_authorized(&self, layer_id: &str) -> bool {
            self.$($field).+.is_layer_create_authorized(layer_id)
        }

        fn is_layer_delete_authorized(&self, layer_id: &str) -> bool {
            self.$($field).+.is_layer_delete_authorized(layer_id)
        }
    };
}

mod area;
mod attribute;
mod base;
mod feature;
mod filter;

pub use area::{AreaRestriction, LayerArea};
pub use attribute::{AttributeRestriction, AttributeRules};
pub use base::{BaseAuthorization, LayerGrant};
pub use feature::{FeatureRestriction, FeatureRules, FeatureSelector};
pub use filter::FilterRestriction;
