//! Role service client error types.

use std::fmt;

/// Errors setting up the role service client.
///
/// Lookup failures are reported through `lostfound_access::LookupError`
/// so the resolver can tell an unreachable service from a degraded answer.
#[derive(Debug)]
pub enum AuthzError {
    /// The HTTP client could not be constructed.
    ClientBuild {
        /// Error details.
        details: String,
    },
    /// The configured base URL is unusable.
    InvalidBaseUrl {
        /// The rejected URL.
        url: String,
        /// Error details.
        details: String,
    },
}

impl fmt::Display for AuthzError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ClientBuild { details } => {
                write!(f, "failed to build role service client: {}", details)
            }
            Self::InvalidBaseUrl { url, details } => {
                write!(f, "invalid role service base URL '{}': {}", url, details)
            }
        }
    }
}

impl std::error::Error for AuthzError {}
