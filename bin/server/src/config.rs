//! Centralized server configuration.
//!
//! Loaded via the `config` crate from environment variables, with `__`
//! separating nested keys:
//!
//! - `LOOKUP__BASE_URL` (required): base URL of the backend API
//! - `LOOKUP__TIMEOUT_SECONDS`: permission lookup timeout
//! - `GATE__LOGIN_PATH`, `GATE__UNAUTHORIZED_PATH`: redirect targets
//! - `GATE__LOCALES`: comma-separated locale prefixes
//! - `ESCALATION__PRIVILEGED_ROLES`: comma-separated privileged role labels

use lostfound_access::{EscalationPolicy, GateConfig};
use lostfound_authz::LookupConfig;
use serde::Deserialize;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Role permission lookup.
    pub lookup: LookupConfig,

    /// Route gate redirects and locales.
    #[serde(default)]
    pub gate: GateConfig,

    /// Role labels that bypass the permission lookup.
    #[serde(default)]
    pub escalation: EscalationPolicy,
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::from_source(config::Environment::default())
    }

    fn from_source(source: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(
                source
                    .separator("__")
                    .try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("gate.locales")
                    .with_list_parse_key("escalation.privileged_roles"),
            )
            .build()?
            .try_deserialize()
    }
}
