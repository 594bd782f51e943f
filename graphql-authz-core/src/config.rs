//! Authorization settings.

use serde::{Deserialize, Serialize};

/// Settings for [`crate::AuthorizationInstrumentation`].
///
/// Missing keys fall back to their defaults, so `{}` is a valid document.
///
/// ```rust
/// use graphql_authz_core::AuthorizationConfig;
///
/// let config = AuthorizationConfig::from_json(r#"{"always_allow_execute": true}"#).unwrap();
/// assert!(config.always_allow_execute);
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthorizationConfig {
    /// Skip execute checks. Field access is still enforced.
    pub always_allow_execute: bool,
}

impl AuthorizationConfig {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }
}
