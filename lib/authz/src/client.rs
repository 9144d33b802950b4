//! HTTP client for the backend role permission endpoint.

use crate::config::LookupConfig;
use crate::error::AuthzError;
use crate::types::parse_permission_list;
use async_trait::async_trait;
use lostfound_access::{LookupError, LookupOutcome, PermissionDirectory};
use lostfound_core::{Result, RoleId};
use reqwest::Url;
use reqwest::header::ACCEPT;
use tracing::{debug, instrument, warn};

/// Client for `GET /api/permissions/role/{roleId}`.
///
/// Cheap to clone; clones share the connection pool.
#[derive(Debug, Clone)]
pub struct RolePermissionsClient {
    http: reqwest::Client,
    base_url: Url,
}

impl RolePermissionsClient {
    /// Creates a client from lookup configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the base URL cannot carry a path or the HTTP
    /// client cannot be built.
    pub fn new(config: &LookupConfig) -> Result<Self, AuthzError> {
        let base_url =
            Url::parse(config.base_url()).map_err(|e| AuthzError::InvalidBaseUrl {
                url: config.base_url().to_string(),
                details: e.to_string(),
            })?;
        if base_url.cannot_be_a_base() {
            return Err(AuthzError::InvalidBaseUrl {
                url: config.base_url().to_string(),
                details: "URL cannot carry a path".to_string(),
            }
            .into());
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout())
            .build()
            .map_err(|e| AuthzError::ClientBuild {
                details: e.to_string(),
            })?;

        Ok(Self { http, base_url })
    }

    /// Returns the lookup URL for a role.
    #[must_use]
    pub fn endpoint(&self, role_id: &RoleId) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut segments) = url.path_segments_mut() {
            segments
                .pop_if_empty()
                .extend(["api", "permissions", "role", role_id.as_str()]);
        }
        url
    }
}

/// Splits transport failures into "not reachable" and everything else.
fn classify(err: &reqwest::Error) -> LookupError {
    if err.is_connect() || err.is_timeout() {
        LookupError::Unreachable {
            details: err.to_string(),
        }
    } else {
        LookupError::Transport {
            details: err.to_string(),
        }
    }
}

#[async_trait]
impl PermissionDirectory for RolePermissionsClient {
    #[instrument(skip(self, token), fields(role_id = %role_id))]
    async fn role_permissions(
        &self,
        role_id: &RoleId,
        token: &str,
    ) -> Result<LookupOutcome, LookupError> {
        let response = self
            .http
            .get(self.endpoint(role_id))
            .bearer_auth(token)
            .header(ACCEPT, "application/json")
            .send()
            .await
            .map_err(|e| classify(&e))?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "role service returned failure status");
            return Ok(LookupOutcome::Degraded {
                reason: format!("role service returned HTTP {}", status.as_u16()),
            });
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                warn!(error = %e, "failed to read role service response");
                return Ok(LookupOutcome::Degraded {
                    reason: format!("role service response unreadable: {e}"),
                });
            }
        };

        match parse_permission_list(&body) {
            Some(permissions) => {
                debug!(count = permissions.len(), "role permissions fetched");
                Ok(LookupOutcome::Granted(permissions))
            }
            None => {
                warn!("role service response is not a permission list");
                Ok(LookupOutcome::Degraded {
                    reason: "role service response is not a permission list".to_string(),
                })
            }
        }
    }
}
