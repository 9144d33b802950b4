//! Role labels and role-assignment gating.
//!
//! Role labels are free-form strings issued by the token service. The
//! dashboard only distinguishes three things about them: the guest label
//! for unauthenticated sessions, the default label for tokens without one,
//! and the privileged labels configured in an [`EscalationPolicy`].

use crate::permission::{EscalationPolicy, names};
use crate::session::ResolvedSession;

/// Label of an unauthenticated session.
pub const GUEST_ROLE: &str = "guest";

/// Label assumed for an authenticated token that carries none.
pub const DEFAULT_ROLE: &str = "user";

impl ResolvedSession {
    /// Filters the role labels this session may hand out to other users.
    ///
    /// Without `can_manage_roles` nothing is assignable. Privileged labels
    /// additionally require full access, so a role manager cannot mint
    /// administrators.
    #[must_use]
    pub fn assignable_roles<'a, S: AsRef<str>>(
        &self,
        policy: &EscalationPolicy,
        candidates: &'a [S],
    ) -> Vec<&'a str> {
        if !self.has_permission(names::MANAGE_ROLES) {
            return Vec::new();
        }

        candidates
            .iter()
            .map(|role| role.as_ref())
            .filter(|role| self.has_full_access() || !policy.is_privileged(&role.to_lowercase()))
            .collect()
    }
}
