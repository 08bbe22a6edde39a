//! Layergate Context
//!
//! This crate answers access decisions for one request. A
//! [`SecurityContext`] holds the [`Authentication`]s obtained for a token
//! and combines their authorizations:
//!
//! - tool, command and layer gates are granted when any authorization grants
//!   them
//! - layer edits also require the layer to be structurally editable
//! - feature and attribute decisions are taken by the authorizations having
//!   that capability, or by the layer gates when none has it
//! - authorized areas are intersected, starting from the layer extent
//! - select filters are joined with AND
//!
//! An empty context denies everything. Contexts can be snapshotted into a
//! [`SavedAuthorization`] and restored later without consulting the security
//! services again.
//!
//! [`Authentication`]: layergate_authorization::Authentication

pub mod combine;
pub mod context;
pub mod saved;
pub mod user_info;

pub use context::SecurityContext;
pub use saved::{SavedAuthentication, SavedAuthorization};
pub use user_info::UserInfo;

/// Prelude module for convenient imports.
pub mod prelude {
    pub use crate::context::SecurityContext;
    pub use crate::saved::{SavedAuthentication, SavedAuthorization};
    pub use crate::user_info::UserInfo;
}
