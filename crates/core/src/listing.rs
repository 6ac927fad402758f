//! Per-entity list configuration: sortable and searchable columns.
//!
//! Column names in this module are the only identifiers ever interpolated
//! into list queries. Everything a caller sends is either matched against
//! these allow-lists or bound as a parameter.

use crate::ordering::{SortDirection, SortField};

/// Listing rules for one entity type.
#[derive(Debug, Clone, Copy)]
pub struct ListingConfig {
    /// Human-readable entity name used in messages.
    pub entity: &'static str,
    pub table: &'static str,
    pub sortable: &'static [SortField],
    /// Text columns matched by the free-text `search` term (OR-combined).
    pub searchable: &'static [&'static str],
    pub default_sort: (&'static str, SortDirection),
}

impl ListingConfig {
    pub fn is_sortable(&self, column: &str) -> bool {
        self.sortable.iter().any(|f| f.column == column)
    }
}

pub const MODULE_LISTING: ListingConfig = ListingConfig {
    entity: "Module",
    table: "modules",
    sortable: &[
        SortField::new("id", "id"),
        SortField::new("name", "name"),
        SortField::new("displayOrder", "display_order"),
        SortField::new("createdAt", "created_at"),
        SortField::new("updatedAt", "updated_at"),
    ],
    searchable: &["name", "description"],
    default_sort: ("display_order", SortDirection::Asc),
};

pub const TOPIC_LISTING: ListingConfig = ListingConfig {
    entity: "Topic",
    table: "topics",
    sortable: &[
        SortField::new("id", "id"),
        SortField::new("name", "name"),
        SortField::new("displayOrder", "display_order"),
        SortField::new("createdAt", "created_at"),
        SortField::new("updatedAt", "updated_at"),
    ],
    searchable: &["name", "description"],
    default_sort: ("display_order", SortDirection::Asc),
};

pub const ROLE_LISTING: ListingConfig = ListingConfig {
    entity: "Role",
    table: "roles",
    sortable: &[
        SortField::new("id", "id"),
        SortField::new("name", "name"),
        SortField::new("createdAt", "created_at"),
        SortField::new("updatedAt", "updated_at"),
    ],
    searchable: &["name", "description"],
    default_sort: ("name", SortDirection::Asc),
};

pub const PERMISSION_LISTING: ListingConfig = ListingConfig {
    entity: "Permission",
    table: "permissions",
    sortable: &[
        SortField::new("id", "id"),
        SortField::new("name", "name"),
        SortField::new("resource", "resource"),
        SortField::new("createdAt", "created_at"),
    ],
    searchable: &["name", "description", "resource"],
    default_sort: ("name", SortDirection::Asc),
};

pub const ORG_UNIT_LISTING: ListingConfig = ListingConfig {
    entity: "OrgUnit",
    table: "org_units",
    sortable: &[
        SortField::new("id", "id"),
        SortField::new("name", "name"),
        SortField::new("code", "code"),
        SortField::new("displayOrder", "display_order"),
        SortField::new("createdAt", "created_at"),
    ],
    searchable: &["name", "code"],
    default_sort: ("display_order", SortDirection::Asc),
};

pub const USER_LISTING: ListingConfig = ListingConfig {
    entity: "User",
    table: "users",
    sortable: &[
        SortField::new("id", "id"),
        SortField::new("username", "username"),
        SortField::new("email", "email"),
        SortField::new("fullName", "full_name"),
        SortField::new("createdAt", "created_at"),
        SortField::new("lastLoginAt", "last_login_at"),
    ],
    searchable: &["username", "email", "full_name"],
    default_sort: ("username", SortDirection::Asc),
};
