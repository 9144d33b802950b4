//! Route protection table.
//!
//! Maps normalized path prefixes to the permissions a request needs. The
//! longest matching prefix decides. Matching respects segment boundaries,
//! so `/dashboard/items` covers `/dashboard/items/12` but not
//! `/dashboard/itemsets`.
//!
//! Paths without a matching entry are public. Nothing is denied by default,
//! so a dashboard section missing from the table is reachable by anyone.

use serde::{Deserialize, Serialize};

use crate::error::AccessError;
use crate::permission::names;
use crate::session::ResolvedSession;

/// Route gate configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GateConfig {
    /// Where unauthenticated requests are sent.
    #[serde(default = "default_login_path")]
    login_path: String,
    /// Where authenticated requests lacking permissions are sent.
    #[serde(default = "default_unauthorized_path")]
    unauthorized_path: String,
    /// Locale path prefixes stripped before matching.
    #[serde(default = "default_locales")]
    locales: Vec<String>,
}

fn default_login_path() -> String {
    "/login".to_string()
}

fn default_unauthorized_path() -> String {
    "/unauthorized".to_string()
}

fn default_locales() -> Vec<String> {
    vec!["en".to_string(), "ar".to_string()]
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            login_path: default_login_path(),
            unauthorized_path: default_unauthorized_path(),
            locales: default_locales(),
        }
    }
}

impl GateConfig {
    /// Creates a configuration with explicit redirect targets.
    #[must_use]
    pub fn new(
        login_path: impl Into<String>,
        unauthorized_path: impl Into<String>,
        locales: Vec<String>,
    ) -> Self {
        Self {
            login_path: login_path.into(),
            unauthorized_path: unauthorized_path.into(),
            locales,
        }
    }

    #[must_use]
    pub fn login_path(&self) -> &str {
        &self.login_path
    }

    #[must_use]
    pub fn unauthorized_path(&self) -> &str {
        &self.unauthorized_path
    }

    #[must_use]
    pub fn locales(&self) -> &[String] {
        &self.locales
    }

    /// Normalizes a request path for table lookup.
    #[must_use]
    pub fn normalize(&self, path: &str) -> String {
        normalize_path(path, &self.locales)
    }
}

/// Strips a leading locale segment and trailing slashes.
///
/// `/en/dashboard/items/` becomes `/dashboard/items`; `/en` becomes `/`.
#[must_use]
pub fn normalize_path<S: AsRef<str>>(path: &str, locales: &[S]) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let mut segments = path.split('/').filter(|s| !s.is_empty()).peekable();

    let has_locale = segments
        .peek()
        .is_some_and(|first| locales.iter().any(|l| l.as_ref() == *first));
    if has_locale {
        segments.next();
    }

    let rest: Vec<&str> = segments.collect();
    format!("/{}", rest.join("/"))
}

/// What a protected route demands.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Requirement {
    /// Any authenticated principal.
    Authenticated,
    /// At least one of the listed permissions.
    AnyOf(Vec<String>),
}

impl Requirement {
    /// An empty list means authenticated-only.
    #[must_use]
    pub fn from_permissions<I, S>(permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let permissions: Vec<String> = permissions.into_iter().map(Into::into).collect();
        if permissions.is_empty() {
            Self::Authenticated
        } else {
            Self::AnyOf(permissions)
        }
    }
}

/// One entry of the route table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteRule {
    prefix: String,
    requirement: Requirement,
}

impl RouteRule {
    #[must_use]
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    #[must_use]
    pub fn requirement(&self) -> &Requirement {
        &self.requirement
    }

    fn matches(&self, path: &str) -> bool {
        if self.prefix == "/" {
            return true;
        }
        match path.strip_prefix(self.prefix.as_str()) {
            Some(rest) => rest.is_empty() || rest.starts_with('/'),
            None => false,
        }
    }

    /// Checks a resolved session against this rule.
    ///
    /// # Errors
    ///
    /// Returns the reason the session may not proceed.
    pub fn check(&self, session: &ResolvedSession) -> Result<(), AccessError> {
        if !session.is_authenticated() {
            return Err(if session.is_token_expired() {
                AccessError::TokenExpired
            } else {
                AccessError::NotAuthenticated
            });
        }

        match &self.requirement {
            Requirement::Authenticated => Ok(()),
            Requirement::AnyOf(permissions) if session.has_any_permission(permissions.as_slice()) => {
                Ok(())
            }
            Requirement::AnyOf(_) => Err(AccessError::PermissionDenied {
                path: self.prefix.clone(),
            }),
        }
    }
}

/// Static table of protected route prefixes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RouteTable {
    rules: Vec<RouteRule>,
}

impl RouteTable {
    /// Creates an empty table; every route is public.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds an entry. An empty permission list means authenticated-only.
    ///
    /// A later entry for the same prefix replaces the earlier one.
    #[must_use]
    pub fn protect<I, S>(mut self, prefix: &str, permissions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let prefix = normalize_path::<&str>(prefix, &[]);
        self.rules.retain(|rule| rule.prefix != prefix);
        self.rules.push(RouteRule {
            prefix,
            requirement: Requirement::from_permissions(permissions),
        });
        self
    }

    /// The dashboard's sections and the permission each one needs.
    #[must_use]
    pub fn dashboard() -> Self {
        Self::new()
            .protect("/dashboard", Vec::<String>::new())
            .protect("/dashboard/items", [names::MANAGE_ITEMS])
            .protect("/dashboard/missing-items", [names::MANAGE_MISSING_ITEMS])
            .protect("/dashboard/claims", [names::MANAGE_CLAIMS])
            .protect("/dashboard/item-types", [names::MANAGE_ITEM_TYPES])
            .protect("/dashboard/branches", [names::MANAGE_BRANCHES])
            .protect("/dashboard/addresses", [names::MANAGE_ADDRESSES])
            .protect("/dashboard/organizations", [names::MANAGE_ORGANIZATIONS])
            .protect(
                "/dashboard/transfer-requests",
                [names::MANAGE_TRANSFER_REQUESTS],
            )
            .protect("/dashboard/users", [names::MANAGE_USERS])
            .protect("/dashboard/roles", [names::MANAGE_ROLES])
            .protect("/dashboard/permissions", [names::MANAGE_PERMISSIONS])
    }

    /// Returns the rules in insertion order.
    #[must_use]
    pub fn rules(&self) -> &[RouteRule] {
        &self.rules
    }

    /// Finds the longest prefix covering an already-normalized path.
    #[must_use]
    pub fn lookup(&self, path: &str) -> Option<&RouteRule> {
        self.rules
            .iter()
            .filter(|rule| rule.matches(path))
            .max_by_key(|rule| rule.prefix.len())
    }

    /// Checks a normalized path for a session.
    ///
    /// # Errors
    ///
    /// Returns the reason the session may not proceed.
    pub fn check(&self, path: &str, session: &ResolvedSession) -> Result<(), AccessError> {
        match self.lookup(path) {
            Some(rule) => rule.check(session),
            None => Ok(()),
        }
    }
}
