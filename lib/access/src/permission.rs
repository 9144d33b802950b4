//! Permission names, permission sets and the full-access escalation rule.
//!
//! Permission names are open-ended: the authoritative list lives in the
//! backend role service and any string may be tested. Comparison is exact
//! and case-sensitive. The only way one name implies another is full-access
//! escalation.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Well-known permission names used by the dashboard's own screens.
pub mod names {
    /// Manage found items.
    pub const MANAGE_ITEMS: &str = "can_manage_items";
    /// Manage missing-item reports.
    pub const MANAGE_MISSING_ITEMS: &str = "can_manage_missing_items";
    /// Review and decide claims.
    pub const MANAGE_CLAIMS: &str = "can_manage_claims";
    /// Manage item types.
    pub const MANAGE_ITEM_TYPES: &str = "can_manage_item_types";
    /// Manage branches.
    pub const MANAGE_BRANCHES: &str = "can_manage_branches";
    /// Manage addresses.
    pub const MANAGE_ADDRESSES: &str = "can_manage_addresses";
    /// Manage organizations.
    pub const MANAGE_ORGANIZATIONS: &str = "can_manage_organizations";
    /// Manage transfer requests between branches.
    pub const MANAGE_TRANSFER_REQUESTS: &str = "can_manage_transfer_requests";
    /// Manage user accounts.
    pub const MANAGE_USERS: &str = "can_manage_users";
    /// Manage roles, including which roles may be assigned.
    pub const MANAGE_ROLES: &str = "can_manage_roles";
    /// Manage the permission catalogue.
    pub const MANAGE_PERMISSIONS: &str = "can_manage_permissions";
}

/// The management permissions whose conjunction amounts to full access.
pub const CRITICAL_PERMISSIONS: [&str; 11] = [
    names::MANAGE_ITEMS,
    names::MANAGE_MISSING_ITEMS,
    names::MANAGE_CLAIMS,
    names::MANAGE_ITEM_TYPES,
    names::MANAGE_BRANCHES,
    names::MANAGE_ADDRESSES,
    names::MANAGE_ORGANIZATIONS,
    names::MANAGE_TRANSFER_REQUESTS,
    names::MANAGE_USERS,
    names::MANAGE_ROLES,
    names::MANAGE_PERMISSIONS,
];

/// A set of permission names.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PermissionSet(BTreeSet<String>);

impl PermissionSet {
    /// Creates an empty set.
    #[must_use]
    pub fn new() -> Self {
        Self(BTreeSet::new())
    }

    /// Creates a set holding a single name.
    #[must_use]
    pub fn single(name: impl Into<String>) -> Self {
        Self(BTreeSet::from([name.into()]))
    }

    /// Adds a name, returning whether it was new.
    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.0.insert(name.into())
    }

    /// Exact, case-sensitive membership.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    /// Returns true if every name is present.
    #[must_use]
    pub fn contains_all<'a>(&self, names: impl IntoIterator<Item = &'a str>) -> bool {
        names.into_iter().all(|name| self.contains(name))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates names in lexical order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }
}

impl<S: Into<String>> FromIterator<S> for PermissionSet {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> Extend<S> for PermissionSet {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}

/// Which role labels escalate to full access.
///
/// Principals holding one of these labels skip the remote permission
/// lookup. Their permission set becomes the single marker `{label}`, and a
/// set carrying a marker has full access. No other label escalates.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EscalationPolicy {
    /// Lower-case role labels treated as privileged.
    #[serde(
        default = "default_privileged_roles",
        deserialize_with = "lowercase_roles"
    )]
    privileged_roles: Vec<String>,
}

/// Configured labels are matched against lower-cased token roles.
fn lowercase_roles<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let roles = Vec::<String>::deserialize(deserializer)?;
    Ok(roles.iter().map(|role| role.trim().to_lowercase()).collect())
}

fn default_privileged_roles() -> Vec<String> {
    vec!["super_admin".to_string(), "admin".to_string()]
}

impl Default for EscalationPolicy {
    fn default() -> Self {
        Self {
            privileged_roles: default_privileged_roles(),
        }
    }
}

impl EscalationPolicy {
    /// Creates a policy with the given privileged labels.
    #[must_use]
    pub fn new<I, S>(privileged_roles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            privileged_roles: privileged_roles
                .into_iter()
                .map(|role| role.into().to_lowercase())
                .collect(),
        }
    }

    /// A policy where only the critical-permission rule escalates.
    #[must_use]
    pub fn critical_only() -> Self {
        Self {
            privileged_roles: Vec::new(),
        }
    }

    /// Returns the privileged labels.
    #[must_use]
    pub fn privileged_roles(&self) -> &[String] {
        &self.privileged_roles
    }

    /// Returns true if the (lower-cased) label is privileged.
    #[must_use]
    pub fn is_privileged(&self, role: &str) -> bool {
        self.privileged_roles.iter().any(|r| r == role)
    }

    /// Decides whether a permission set amounts to full access.
    #[must_use]
    pub fn grants_full_access(&self, permissions: &PermissionSet) -> bool {
        permissions.contains_all(CRITICAL_PERMISSIONS)
            || self
                .privileged_roles
                .iter()
                .any(|marker| permissions.contains(marker))
    }
}
