//! Token-to-session resolution shared by the client store and the route gate.
//!
//! Both execution contexts call [`Resolver::resolve`]; they differ only in
//! where the token comes from and what they do with the result.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use lostfound_core::{Result, RoleId};
use std::sync::Arc;
use tracing::{debug, warn};

use crate::error::{LookupError, ResolveError};
use crate::permission::{EscalationPolicy, PermissionSet};
use crate::role::DEFAULT_ROLE;
use crate::session::{ResolvedSession, TOKEN_EXPIRED};
use crate::token;

/// Result of asking the role service for a role's permissions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// The service answered with a permission list (possibly empty).
    Granted(PermissionSet),
    /// The service answered but not with a usable list.
    ///
    /// The role is treated as having no permissions and `reason` is
    /// surfaced to the caller for display.
    Degraded { reason: String },
}

/// Source of role permissions.
///
/// Implementations return `Err` only when the service cannot be reached at
/// all. Failure statuses and unparseable bodies are [`LookupOutcome::Degraded`].
#[async_trait]
pub trait PermissionDirectory: Send + Sync {
    /// Fetches the permission names granted to `role_id`.
    async fn role_permissions(
        &self,
        role_id: &RoleId,
        token: &str,
    ) -> Result<LookupOutcome, LookupError>;
}

#[async_trait]
impl<D: PermissionDirectory + ?Sized> PermissionDirectory for Arc<D> {
    async fn role_permissions(
        &self,
        role_id: &RoleId,
        token: &str,
    ) -> Result<LookupOutcome, LookupError> {
        (**self).role_permissions(role_id, token).await
    }
}

/// Turns tokens into resolved sessions.
#[derive(Debug, Clone)]
pub struct Resolver<D> {
    directory: D,
    policy: EscalationPolicy,
}

impl<D: PermissionDirectory> Resolver<D> {
    /// Creates a resolver over a permission directory.
    #[must_use]
    pub fn new(directory: D, policy: EscalationPolicy) -> Self {
        Self { directory, policy }
    }

    /// Returns the escalation policy in force.
    #[must_use]
    pub fn policy(&self) -> &EscalationPolicy {
        &self.policy
    }

    /// Resolves a token against the current time.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::BackendUnreachable`] when the role service
    /// cannot be reached and [`ResolveError::LookupFailed`] when the request
    /// fails otherwise. The directory's report stays attached as the cause.
    /// Absent, malformed and expired tokens are not
    /// errors; they resolve to a guest session.
    pub async fn resolve(
        &self,
        token: Option<&str>,
    ) -> Result<ResolvedSession, ResolveError> {
        self.resolve_at(token, Utc::now()).await
    }

    /// Resolves a token against an explicit clock.
    ///
    /// # Errors
    ///
    /// See [`Resolver::resolve`].
    pub async fn resolve_at(
        &self,
        token: Option<&str>,
        now: DateTime<Utc>,
    ) -> Result<ResolvedSession, ResolveError> {
        let Some(raw) = token.filter(|t| !t.is_empty()) else {
            return Ok(ResolvedSession::guest());
        };

        let Some(claims) = token::decode(raw) else {
            debug!("token did not decode, treating request as guest");
            return Ok(ResolvedSession::guest());
        };

        if claims.is_expired_at(now) {
            debug!(exp = ?claims.exp, "token expired");
            return Ok(ResolvedSession::guest().with_error(TOKEN_EXPIRED));
        }

        let role = claims
            .role_label()
            .unwrap_or_else(|| DEFAULT_ROLE.to_string());

        if self.policy.is_privileged(&role) {
            debug!(role = %role, "privileged role, skipping permission lookup");
            let permissions = PermissionSet::single(role.clone());
            let full_access = self.policy.grants_full_access(&permissions);
            return Ok(ResolvedSession::authenticated(
                role,
                claims.role_id,
                permissions,
                full_access,
            ));
        }

        let Some(role_id) = claims.role_id else {
            debug!(role = %role, "token has no role id, no permissions granted");
            return Ok(ResolvedSession::authenticated(
                role,
                None,
                PermissionSet::new(),
                false,
            ));
        };

        let outcome = self
            .directory
            .role_permissions(&role_id, raw)
            .await
            .map_err(|report| {
                let context = ResolveError::from(report.current_context());
                warn!(role_id = %role_id, error = %context, "permission lookup failed");
                report.context(context)
            })?;

        let session = match outcome {
            LookupOutcome::Granted(permissions) => {
                let full_access = self.policy.grants_full_access(&permissions);
                debug!(
                    role = %role,
                    role_id = %role_id,
                    count = permissions.len(),
                    full_access,
                    "permissions resolved"
                );
                ResolvedSession::authenticated(role, Some(role_id), permissions, full_access)
            }
            LookupOutcome::Degraded { reason } => {
                warn!(role_id = %role_id, reason = %reason, "permission lookup degraded");
                ResolvedSession::authenticated(role, Some(role_id), PermissionSet::new(), false)
                    .with_error(reason)
            }
        };

        Ok(session)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::permission::{CRITICAL_PERMISSIONS, names};
    use crate::token::tests::token_for;
    use serde_json::json;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Canned directory answers, recording every call.
    pub(crate) struct StubDirectory {
        answer: Mutex<std::result::Result<LookupOutcome, LookupError>>,
        pub(crate) calls: AtomicUsize,
        pub(crate) seen: Mutex<Vec<(RoleId, String)>>,
    }

    impl StubDirectory {
        pub(crate) fn granting<'a>(names: impl IntoIterator<Item = &'a str>) -> Self {
            Self::answering(Ok(LookupOutcome::Granted(names.into_iter().collect())))
        }

        pub(crate) fn answering(answer: std::result::Result<LookupOutcome, LookupError>) -> Self {
            Self {
                answer: Mutex::new(answer),
                calls: AtomicUsize::new(0),
                seen: Mutex::new(Vec::new()),
            }
        }

        pub(crate) fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PermissionDirectory for StubDirectory {
        async fn role_permissions(
            &self,
            role_id: &RoleId,
            token: &str,
        ) -> Result<LookupOutcome, LookupError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.seen
                .lock()
                .expect("lock")
                .push((role_id.clone(), token.to_string()));
            let answer = self.answer.lock().expect("lock").clone();
            Ok(answer?)
        }
    }

    pub(crate) fn now() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).expect("valid timestamp")
    }

    pub(crate) fn live_token(claims: serde_json::Value) -> String {
        let mut claims = claims;
        claims["exp"] = json!(now().timestamp() + 3600);
        token_for(&claims)
    }

    fn resolver(directory: StubDirectory) -> Resolver<Arc<StubDirectory>> {
        Resolver::new(Arc::new(directory), EscalationPolicy::default())
    }

    #[tokio::test]
    async fn absent_token_is_guest_without_lookup() {
        let directory = Arc::new(StubDirectory::granting([names::MANAGE_ITEMS]));
        let resolver = Resolver::new(directory.clone(), EscalationPolicy::default());

        for token in [None, Some("")] {
            let session = resolver.resolve_at(token, now()).await.expect("resolve");
            assert!(!session.is_authenticated());
            assert_eq!(session.role(), "guest");
            assert!(session.permissions().is_empty());
            assert!(session.error().is_none());
        }
        assert_eq!(directory.call_count(), 0);
    }

    #[tokio::test]
    async fn malformed_token_is_guest() {
        let resolver = resolver(StubDirectory::granting([]));
        let session = resolver
            .resolve_at(Some("definitely.not.a-token"), now())
            .await
            .expect("resolve");
        assert_eq!(session, ResolvedSession::guest());
    }

    #[tokio::test]
    async fn expired_token_is_guest_with_error() {
        let directory = Arc::new(StubDirectory::granting([names::MANAGE_ITEMS]));
        let resolver = Resolver::new(directory.clone(), EscalationPolicy::default());
        let token = token_for(&json!({ "roleId": "1", "exp": now().timestamp() - 1 }));

        let session = resolver.resolve_at(Some(&token), now()).await.expect("resolve");
        assert!(!session.is_authenticated());
        assert_eq!(session.error(), Some(TOKEN_EXPIRED));
        assert!(session.is_token_expired());
        assert_eq!(directory.call_count(), 0);
    }

    #[tokio::test]
    async fn lookup_uses_role_id_and_bearer_token() {
        let directory = Arc::new(StubDirectory::granting([names::MANAGE_ITEMS]));
        let resolver = Resolver::new(directory.clone(), EscalationPolicy::default());
        let token = live_token(json!({ "sub": "u1", "roleId": 5, "role": "Moderator" }));

        let session = resolver.resolve_at(Some(&token), now()).await.expect("resolve");
        assert!(session.is_authenticated());
        assert_eq!(session.role(), "moderator");
        assert_eq!(session.role_id(), Some(&RoleId::new("5")));
        assert!(session.has_permission(names::MANAGE_ITEMS));
        assert!(!session.has_full_access());

        let seen = directory.seen.lock().expect("lock");
        assert_eq!(seen.as_slice(), &[(RoleId::new("5"), token.clone())]);
    }

    #[tokio::test]
    async fn missing_role_label_defaults_to_user() {
        let resolver = resolver(StubDirectory::granting([]));
        let token = live_token(json!({ "roleId": "2" }));
        let session = resolver.resolve_at(Some(&token), now()).await.expect("resolve");
        assert_eq!(session.role(), "user");
    }

    #[tokio::test]
    async fn privileged_role_skips_lookup() {
        let directory = Arc::new(StubDirectory::granting([]));
        let resolver = Resolver::new(directory.clone(), EscalationPolicy::default());
        let token = live_token(json!({ "role": "SUPER_ADMIN" }));

        let session = resolver.resolve_at(Some(&token), now()).await.expect("resolve");
        assert_eq!(session.role(), "super_admin");
        assert_eq!(session.permissions(), &PermissionSet::single("super_admin"));
        assert!(session.has_full_access());
        assert!(session.has_permission(names::MANAGE_PERMISSIONS));
        assert_eq!(directory.call_count(), 0);
    }

    #[tokio::test]
    async fn admin_label_without_bypass_goes_through_lookup() {
        let directory = Arc::new(StubDirectory::granting([names::MANAGE_CLAIMS]));
        let resolver = Resolver::new(directory.clone(), EscalationPolicy::critical_only());
        let token = live_token(json!({ "role": "admin", "roleId": "1" }));

        let session = resolver.resolve_at(Some(&token), now()).await.expect("resolve");
        assert_eq!(directory.call_count(), 1);
        assert!(!session.has_full_access());
        assert!(session.has_permission(names::MANAGE_CLAIMS));
    }

    #[tokio::test]
    async fn missing_role_id_is_authenticated_without_permissions() {
        let directory = Arc::new(StubDirectory::granting([names::MANAGE_ITEMS]));
        let resolver = Resolver::new(directory.clone(), EscalationPolicy::default());
        let token = live_token(json!({ "sub": "u9", "role": "moderator" }));

        let session = resolver.resolve_at(Some(&token), now()).await.expect("resolve");
        assert!(session.is_authenticated());
        assert!(session.permissions().is_empty());
        assert!(session.error().is_none());
        assert_eq!(directory.call_count(), 0);
    }

    #[tokio::test]
    async fn degraded_lookup_keeps_session_and_reports_reason() {
        let resolver = resolver(StubDirectory::answering(Ok(LookupOutcome::Degraded {
            reason: "role service returned HTTP 500".to_string(),
        })));
        let token = live_token(json!({ "roleId": "1" }));

        let session = resolver.resolve_at(Some(&token), now()).await.expect("resolve");
        assert!(session.is_authenticated());
        assert!(session.permissions().is_empty());
        assert_eq!(session.error(), Some("role service returned HTTP 500"));
    }

    #[tokio::test]
    async fn unreachable_backend_is_an_error() {
        let resolver = resolver(StubDirectory::answering(Err(LookupError::Unreachable {
            details: "connection refused".to_string(),
        })));
        let token = live_token(json!({ "roleId": "1" }));

        let err = resolver
            .resolve_at(Some(&token), now())
            .await
            .expect_err("should fail");
        assert!(matches!(
            err.current_context(),
            ResolveError::BackendUnreachable { .. }
        ));
        assert!(err.to_string().contains("unreachable"));
    }

    #[tokio::test]
    async fn transport_failure_keeps_its_cause() {
        let resolver = resolver(StubDirectory::answering(Err(LookupError::Transport {
            details: "invalid header value".to_string(),
        })));
        let token = live_token(json!({ "roleId": "1" }));

        let err = resolver
            .resolve_at(Some(&token), now())
            .await
            .expect_err("should fail");
        assert_eq!(
            err.current_context(),
            &ResolveError::LookupFailed {
                details: "invalid header value".to_string()
            }
        );
        assert!(!err.current_context().to_string().contains("unreachable"));

        let cause = err
            .iter_reports()
            .find_map(|report| report.downcast_current_context::<LookupError>().cloned());
        assert!(matches!(cause, Some(LookupError::Transport { .. })));
    }

    #[tokio::test]
    async fn all_critical_permissions_escalate() {
        let resolver = resolver(StubDirectory::granting(CRITICAL_PERMISSIONS));
        let token = live_token(json!({ "roleId": "7", "role": "manager" }));

        let session = resolver.resolve_at(Some(&token), now()).await.expect("resolve");
        assert!(session.has_full_access());
        assert!(session.has_permission("can_view_anything_else"));
    }

    #[tokio::test]
    async fn empty_grant_is_not_an_error() {
        let resolver = resolver(StubDirectory::granting([]));
        let token = live_token(json!({ "roleId": "3" }));
        let session = resolver.resolve_at(Some(&token), now()).await.expect("resolve");
        assert!(session.is_authenticated());
        assert!(session.error().is_none());
    }
}
