//! Sort field and direction resolution against per-entity allow-lists.

use crate::error::CoreError;
use crate::listing::ListingConfig;

/// Sort direction. Only ascending and descending exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    /// Parse a caller-supplied direction, case-insensitively.
    pub fn parse(raw: &str) -> Result<Self, CoreError> {
        match raw.trim().to_ascii_uppercase().as_str() {
            "ASC" => Ok(Self::Asc),
            "DESC" => Ok(Self::Desc),
            other => Err(CoreError::Validation(format!(
                "Invalid sort order '{other}'. Must be ASC or DESC"
            ))),
        }
    }

    pub fn as_sql(self) -> &'static str {
        match self {
            Self::Asc => "ASC",
            Self::Desc => "DESC",
        }
    }
}

/// A sortable field: the key callers send and the column it maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortField {
    pub key: &'static str,
    pub column: &'static str,
}

impl SortField {
    pub const fn new(key: &'static str, column: &'static str) -> Self {
        Self { key, column }
    }
}

/// A validated ORDER BY clause. `column` always comes from a [`ListingConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OrderClause {
    pub column: &'static str,
    pub direction: SortDirection,
}

impl OrderClause {
    /// Render as SQL, with `id` as a tiebreaker so paging is deterministic.
    pub fn to_sql(&self) -> String {
        if self.column == "id" {
            format!("id {}", self.direction.as_sql())
        } else {
            format!("{} {}, id ASC", self.column, self.direction.as_sql())
        }
    }
}

/// Resolve `sortBy`/`sortOrder` for the given entity.
///
/// An unknown field or direction is rejected; nothing reaches storage.
/// Without `sort_by` the entity default applies. An explicit field without a
/// direction sorts ascending.
pub fn resolve_order(
    config: &ListingConfig,
    sort_by: Option<&str>,
    sort_order: Option<&str>,
) -> Result<OrderClause, CoreError> {
    let direction = sort_order
        .filter(|s| !s.trim().is_empty())
        .map(SortDirection::parse)
        .transpose()?;

    let sort_by = sort_by.map(str::trim).filter(|s| !s.is_empty());
    let Some(requested) = sort_by else {
        let (column, default_direction) = config.default_sort;
        return Ok(OrderClause {
            column,
            direction: direction.unwrap_or(default_direction),
        });
    };

    let field = config
        .sortable
        .iter()
        .find(|f| f.key == requested || f.column == requested)
        .ok_or_else(|| {
            let allowed: Vec<&str> = config.sortable.iter().map(|f| f.key).collect();
            CoreError::Validation(format!(
                "Cannot sort {} by '{requested}'. Allowed fields: {}",
                config.entity,
                allowed.join(", ")
            ))
        })?;

    Ok(OrderClause {
        column: field.column,
        direction: direction.unwrap_or(SortDirection::Asc),
    })
}
