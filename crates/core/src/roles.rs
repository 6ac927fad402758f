//! Well-known role name constants.
//!
//! These must match the seed data in `20260301000001_create_roles_and_permissions.sql`.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_MANAGER: &str = "manager";
pub const ROLE_TRAINEE: &str = "trainee";

/// Roles allowed to read the administrative catalogs.
pub fn can_read_admin(role: &str) -> bool {
    role == ROLE_ADMIN || role == ROLE_MANAGER
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_admins_and_managers_read_admin_catalogs() {
        assert!(can_read_admin(ROLE_ADMIN));
        assert!(can_read_admin(ROLE_MANAGER));
        assert!(!can_read_admin(ROLE_TRAINEE));
        assert!(!can_read_admin("Admin"));
    }
}
