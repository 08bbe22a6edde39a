//! Configuration types for the security manager.

use serde::{Deserialize, Serialize};

/// Configuration for the security manager.
///
/// This controls how security services are consulted when a security
/// context is created for a token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// Ask every registered security service for an authentication.
    ///
    /// When disabled, the manager stops at the first service which knows
    /// the token. Defaults to `true`.
    pub loop_all_services: bool,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            loop_all_services: true,
        }
    }
}

impl SecurityConfig {
    /// Create a new configuration with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable querying all security services.
    pub fn with_loop_all_services(mut self, enabled: bool) -> Self {
        self.loop_all_services = enabled;
        self
    }

    /// Stop at the first security service which authenticates the token.
    pub fn first_match() -> Self {
        Self {
            loop_all_services: false,
        }
    }

    /// Aggregate the authentications of all security services.
    pub fn aggregate() -> Self {
        Self {
            loop_all_services: true,
        }
    }
}
