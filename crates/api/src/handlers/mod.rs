//! HTTP handlers, one module per resource.
//!
//! Reads take [`RequireManager`](crate::middleware::rbac::RequireManager),
//! writes take [`RequireAdmin`](crate::middleware::rbac::RequireAdmin). Every
//! handler answers with the [`ApiResponse`](crate::response::ApiResponse)
//! envelope.

use cadre_core::reorder::ReorderItem;
use serde::Deserialize;
use validator::Validate;

pub mod auth;
pub mod module;
pub mod org_unit;
pub mod permission;
pub mod role;
pub mod topic;
pub mod user;

/// Body of `PUT /modules/reorder` and `PUT /org-units/reorder`.
#[derive(Debug, Deserialize, Validate)]
pub struct ReorderRequest {
    pub items: Vec<ReorderItem>,
}
