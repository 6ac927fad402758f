//! Repository layer providing CRUD and listing operations for each entity.
//!
//! Each repository is a zero-sized struct with async methods that accept
//! a `&PgPool` as the first argument.

pub mod module_repo;
pub mod org_unit_repo;
pub mod permission_repo;
pub mod role_repo;
pub mod topic_repo;
pub mod user_repo;

pub use module_repo::ModuleRepo;
pub use org_unit_repo::OrgUnitRepo;
pub use permission_repo::PermissionRepo;
pub use role_repo::RoleRepo;
pub use topic_repo::TopicRepo;
pub use user_repo::UserRepo;
