//! Error types for the access crate.
//!
//! Errors are designed for layered context using rootcause:
//! - `LookupError`: the role permission directory could not be consulted
//! - `ResolveError`: session resolution failed for a reason the caller must surface
//! - `AccessError`: a request was denied by the route gate
//!
//! Absence conditions (no token, malformed token, empty permission list) are
//! never errors. They resolve to a degraded but valid session.

use std::fmt;

/// Errors from a permission directory lookup.
///
/// Only total unreachability is an error. A backend that answers with a
/// failure status is reported as a degraded lookup instead.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The role service could not be reached (connection refused, timeout, DNS).
    Unreachable { details: String },
    /// The request could not be built or sent for a reason other than reachability.
    Transport { details: String },
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unreachable { details } => {
                write!(f, "role service unreachable: {details}")
            }
            Self::Transport { details } => {
                write!(f, "role service request failed: {details}")
            }
        }
    }
}

impl std::error::Error for LookupError {}

/// Errors from resolving a token into a session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// The permission backend could not be reached.
    BackendUnreachable { details: String },
    /// The lookup request failed for a reason other than reachability.
    LookupFailed { details: String },
}

impl fmt::Display for ResolveError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BackendUnreachable { details } => {
                write!(f, "permission backend unreachable: {details}")
            }
            Self::LookupFailed { details } => {
                write!(f, "permission lookup failed: {details}")
            }
        }
    }
}

impl std::error::Error for ResolveError {}

impl From<&LookupError> for ResolveError {
    fn from(err: &LookupError) -> Self {
        match err {
            LookupError::Unreachable { details } => Self::BackendUnreachable {
                details: details.clone(),
            },
            LookupError::Transport { details } => Self::LookupFailed {
                details: details.clone(),
            },
        }
    }
}

/// Reasons a route gate refuses a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AccessError {
    /// No usable token was presented.
    NotAuthenticated,
    /// The presented token has expired.
    TokenExpired,
    /// The principal lacks every permission the route accepts.
    PermissionDenied { path: String },
    /// Permissions could not be determined.
    Unavailable { details: String },
}

impl fmt::Display for AccessError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAuthenticated => write!(f, "not authenticated"),
            Self::TokenExpired => write!(f, "token expired, please log in again"),
            Self::PermissionDenied { path } => {
                write!(f, "insufficient permissions for {path}")
            }
            Self::Unavailable { details } => {
                write!(f, "permissions unavailable: {details}")
            }
        }
    }
}

impl std::error::Error for AccessError {}
