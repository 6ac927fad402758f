//! Domain logic shared by the storage and HTTP layers.
//!
//! No I/O lives here: ids and errors, the list-query resolvers (pagination,
//! predicates, ordering), per-entity listing rules, reorder batch checks and
//! request field validators.

pub mod error;
pub mod listing;
pub mod ordering;
pub mod pagination;
pub mod predicate;
pub mod reorder;
pub mod roles;
pub mod types;
pub mod validation;
