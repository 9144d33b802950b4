//! Role service client configuration.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for role permission lookups.
///
/// Fields with defaults can be omitted when loading from environment variables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LookupConfig {
    /// Base URL of the backend API (e.g., "https://api.example.com").
    base_url: String,
    /// Request timeout in seconds. A timed-out lookup counts as unreachable.
    /// Default: 10
    #[serde(default = "default_timeout_seconds")]
    timeout_seconds: u64,
}

fn default_timeout_seconds() -> u64 {
    10
}

impl LookupConfig {
    /// Creates a configuration with the default timeout.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_seconds: default_timeout_seconds(),
        }
    }

    /// Overrides the request timeout.
    #[must_use]
    pub fn with_timeout_seconds(mut self, timeout_seconds: u64) -> Self {
        self.timeout_seconds = timeout_seconds;
        self
    }

    /// Returns the backend base URL.
    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Returns the request timeout.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timeout_defaults_when_omitted() {
        let config: LookupConfig =
            serde_json::from_str(r#"{"base_url":"http://localhost:8000"}"#).expect("deserialize");
        assert_eq!(config.base_url(), "http://localhost:8000");
        assert_eq!(config.timeout(), Duration::from_secs(10));
    }

    #[test]
    fn timeout_can_be_overridden() {
        let config = LookupConfig::new("http://api").with_timeout_seconds(2);
        assert_eq!(config.timeout(), Duration::from_secs(2));
    }
}
