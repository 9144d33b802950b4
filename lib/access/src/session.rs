//! Resolved sessions and the authorization predicates evaluated against them.
//!
//! A `ResolvedSession` is what the UI and the route gate consult. It is
//! derived from a token on every resolution pass and replaced wholesale,
//! never patched. The predicates are the only supported way to ask whether
//! a principal may do something.

use lostfound_core::RoleId;
use serde::{Deserialize, Serialize};

use crate::permission::PermissionSet;
use crate::role::GUEST_ROLE;

/// Message attached to the guest session produced for an expired token.
pub const TOKEN_EXPIRED: &str = "token expired";

/// The effective authorization state of the current principal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedSession {
    is_authenticated: bool,
    role: String,
    role_id: Option<RoleId>,
    permissions: PermissionSet,
    has_full_access: bool,
    is_loading: bool,
    error: Option<String>,
}

impl ResolvedSession {
    /// An unauthenticated session with no permissions.
    #[must_use]
    pub fn guest() -> Self {
        Self {
            is_authenticated: false,
            role: GUEST_ROLE.to_string(),
            role_id: None,
            permissions: PermissionSet::new(),
            has_full_access: false,
            is_loading: false,
            error: None,
        }
    }

    /// A placeholder used before the first resolution completes.
    ///
    /// Every predicate is false on a loading session.
    #[must_use]
    pub fn loading() -> Self {
        Self {
            is_loading: true,
            ..Self::guest()
        }
    }

    /// An authenticated session.
    #[must_use]
    pub fn authenticated(
        role: impl Into<String>,
        role_id: Option<RoleId>,
        permissions: PermissionSet,
        has_full_access: bool,
    ) -> Self {
        Self {
            is_authenticated: true,
            role: role.into(),
            role_id,
            permissions,
            has_full_access,
            is_loading: false,
            error: None,
        }
    }

    /// Attaches a diagnostic message without changing what is granted.
    #[must_use]
    pub fn with_error(mut self, error: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.is_authenticated
    }

    /// Role label; `"guest"` when unauthenticated.
    #[must_use]
    pub fn role(&self) -> &str {
        &self.role
    }

    #[must_use]
    pub fn role_id(&self) -> Option<&RoleId> {
        self.role_id.as_ref()
    }

    #[must_use]
    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    #[must_use]
    pub fn has_full_access(&self) -> bool {
        self.has_full_access
    }

    #[must_use]
    pub fn is_loading(&self) -> bool {
        self.is_loading
    }

    /// Diagnostic message from the last resolution, if any.
    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Returns true if the token had expired when this session was resolved.
    #[must_use]
    pub fn is_token_expired(&self) -> bool {
        !self.is_authenticated && self.error.as_deref() == Some(TOKEN_EXPIRED)
    }

    /// Returns true if the principal holds `name` or has full access.
    #[must_use]
    pub fn has_permission(&self, name: &str) -> bool {
        self.has_full_access || self.permissions.contains(name)
    }

    /// Returns true if the principal holds at least one of `names`.
    ///
    /// An empty list is false unless the session has full access.
    #[must_use]
    pub fn has_any_permission<S: AsRef<str>>(&self, names: &[S]) -> bool {
        self.has_full_access || names.iter().any(|n| self.permissions.contains(n.as_ref()))
    }

    /// Returns true if the principal holds every one of `names`.
    ///
    /// An empty list is vacuously true.
    #[must_use]
    pub fn has_all_permissions<S: AsRef<str>>(&self, names: &[S]) -> bool {
        self.has_full_access || names.iter().all(|n| self.permissions.contains(n.as_ref()))
    }
}

impl Default for ResolvedSession {
    fn default() -> Self {
        Self::guest()
    }
}
