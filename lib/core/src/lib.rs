//! Core types shared by the lost-and-found dashboard crates.
//!
//! This crate provides the identifier newtypes handed out by the backend
//! and the rootcause-based `Result` alias used at every crate boundary.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{RoleId, SubjectId};
