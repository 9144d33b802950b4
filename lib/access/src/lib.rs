//! Authorization core for the lost-and-found dashboard.
//!
//! This crate provides:
//! - Token decoding (`decode`, `Claims`), without signature verification
//! - Permission sets and the full-access escalation rule (`PermissionSet`, `EscalationPolicy`)
//! - Session resolution shared by the browser and the server (`Resolver`, `PermissionDirectory`)
//! - Authorization predicates on the resolved session (`ResolvedSession`)
//! - The client-side session cache (`SessionStore`)
//! - Route protection and token transport helpers for the server gate (`RouteTable`, `transport`)
//!
//! # Access Model
//!
//! A principal's permissions come from the backend role service, looked up
//! by the role id embedded in its token. A principal whose permission set
//! covers every critical management permission, or who holds a privileged
//! role label, has full access: every check passes.
//!
//! # Example
//!
//! ```
//! use lostfound_access::{PermissionSet, ResolvedSession, RouteTable};
//!
//! let session = ResolvedSession::authenticated(
//!     "moderator",
//!     None,
//!     PermissionSet::single("can_manage_items"),
//!     false,
//! );
//!
//! assert!(session.has_permission("can_manage_items"));
//! assert!(!session.has_all_permissions(&["can_manage_items", "can_manage_users"]));
//!
//! let routes = RouteTable::dashboard();
//! assert!(routes.check("/dashboard/items/42", &session).is_ok());
//! assert!(routes.check("/dashboard/users", &session).is_err());
//! ```

pub mod error;
pub mod permission;
pub mod resolver;
pub mod role;
pub mod route;
pub mod session;
pub mod store;
pub mod token;
pub mod transport;

// Re-export main types at crate root
pub use error::{AccessError, LookupError, ResolveError};
pub use permission::{CRITICAL_PERMISSIONS, EscalationPolicy, PermissionSet};
pub use resolver::{LookupOutcome, PermissionDirectory, Resolver};
pub use role::{DEFAULT_ROLE, GUEST_ROLE};
pub use route::{GateConfig, Requirement, RouteRule, RouteTable, normalize_path};
pub use session::{ResolvedSession, TOKEN_EXPIRED};
pub use store::{SessionState, SessionStore};
pub use token::{Claims, decode};
