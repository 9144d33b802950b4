//! Domain error types for server functions.

use leptos::server_fn::error::ServerFnError;
use std::fmt;

/// Errors resolving the session behind a server function call.
#[derive(Debug)]
pub enum SessionError {
    /// The gate state was not attached to the request.
    MissingState,
    /// The request could not be inspected.
    Request { details: String },
    /// The role service could not be reached.
    BackendUnavailable { details: String },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingState => write!(f, "authorization state not configured"),
            Self::Request { details } => write!(f, "failed to read request: {}", details),
            Self::BackendUnavailable { details } => {
                write!(f, "permission backend unreachable: {}", details)
            }
        }
    }
}

impl std::error::Error for SessionError {}

impl SessionError {
    /// Convert to a ServerFnError the client can display.
    ///
    /// Backend failures keep their message so the dashboard can show why
    /// permissions are missing.
    pub fn into_server_error(self) -> ServerFnError {
        match &self {
            SessionError::MissingState => ServerFnError::new("Internal server error"),
            SessionError::Request { .. } => ServerFnError::new("Invalid request"),
            SessionError::BackendUnavailable { .. } => ServerFnError::new(self.to_string()),
        }
    }
}
