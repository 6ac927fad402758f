//! Row types and DTOs, one module per table family.

pub mod module;
pub mod org_unit;
pub mod permission;
pub mod role;
pub mod topic;
pub mod user;
