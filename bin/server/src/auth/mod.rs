//! Server-side authorization for the dashboard.
//!
//! Every request to a protected route is re-derived from scratch: the token
//! is read from the request, the session is resolved against the role
//! service, and the route table decides. Nothing is cached between
//! requests, so a revoked permission takes effect on the next navigation.
//!
//! Server functions use the same [`GateState`] (via a request extension) to
//! resolve the session that seeds the client-side store.

pub mod gate;

use lostfound_access::{GateConfig, PermissionDirectory, Resolver, RouteTable};
use std::sync::Arc;

pub use gate::{GateRejection, request_token, require_route_access};

/// Shared, immutable state of the authorization gate.
pub struct GateState {
    /// Resolves tokens into sessions.
    pub resolver: Resolver<Arc<dyn PermissionDirectory>>,
    /// Protected route prefixes.
    pub routes: RouteTable,
    /// Redirect targets and locale prefixes.
    pub config: GateConfig,
}

impl GateState {
    /// Creates the gate state.
    pub fn new(
        resolver: Resolver<Arc<dyn PermissionDirectory>>,
        routes: RouteTable,
        config: GateConfig,
    ) -> Self {
        Self {
            resolver,
            routes,
            config,
        }
    }
}
