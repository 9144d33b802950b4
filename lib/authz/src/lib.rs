//! Role permission service client for the lost-and-found dashboard.
//!
//! This crate implements [`lostfound_access::PermissionDirectory`] over the
//! backend's `GET /api/permissions/role/{roleId}` endpoint. The backend is
//! the authority on which permissions a role carries; the dashboard only
//! reads the list.

mod client;
mod config;
mod error;
mod types;

pub use client::RolePermissionsClient;
pub use config::LookupConfig;
pub use error::AuthzError;
pub use types::{PermissionEntry, PermissionRecord, parse_permission_list};
