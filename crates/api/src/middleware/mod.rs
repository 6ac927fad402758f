//! Authentication and authorization extractors.
//!
//! - [`auth::AuthUser`] -- the caller identified by a JWT Bearer token.
//! - [`rbac::RequireAdmin`] -- `admin` only (all catalog writes).
//! - [`rbac::RequireManager`] -- `admin` or `manager` (catalog reads).
//! - [`rbac::RequireAuth`] -- any authenticated user.

pub mod auth;
pub mod rbac;
