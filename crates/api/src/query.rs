//! Query-string parameters shared by every list endpoint.
//!
//! Values arrive as raw strings. `page`/`limit` resolve permissively; sort
//! keys and typed filters are checked and rejected with `VALIDATION_ERROR`.

use cadre_core::error::CoreError;
use cadre_core::listing::ListingConfig;
use cadre_core::ordering::resolve_order;
use cadre_core::pagination::PageRequest;
use cadre_core::predicate::PredicateBuilder;
use cadre_core::types::DbId;
use cadre_db::query::ListQuery;
use serde::Deserialize;

/// `?page=&limit=&sortBy=&sortOrder=&search=&isActive=` plus entity filters.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub search: Option<String>,
    pub is_active: Option<String>,
    pub module_id: Option<String>,
    pub parent_id: Option<String>,
    pub role_id: Option<String>,
    pub org_unit_id: Option<String>,
    pub resource: Option<String>,
}

impl ListParams {
    /// Tri-state activity filter: absent, `true` or `false`.
    pub fn is_active(&self) -> Result<Option<bool>, CoreError> {
        match self.is_active.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(raw) if raw.eq_ignore_ascii_case("true") => Ok(Some(true)),
            Some(raw) if raw.eq_ignore_ascii_case("false") => Ok(Some(false)),
            Some(raw) => Err(CoreError::Validation(format!(
                "isActive must be true or false, got '{raw}'"
            ))),
        }
    }

    pub fn module_id(&self) -> Result<Option<DbId>, CoreError> {
        parse_id("moduleId", self.module_id.as_deref())
    }

    pub fn parent_id(&self) -> Result<Option<DbId>, CoreError> {
        parse_id("parentId", self.parent_id.as_deref())
    }

    pub fn role_id(&self) -> Result<Option<DbId>, CoreError> {
        parse_id("roleId", self.role_id.as_deref())
    }

    pub fn org_unit_id(&self) -> Result<Option<DbId>, CoreError> {
        parse_id("orgUnitId", self.org_unit_id.as_deref())
    }

    pub fn resource(&self) -> Option<&str> {
        self.resource
            .as_deref()
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }

    /// Resolve into a [`ListQuery`] for `config`.
    ///
    /// Ordering is resolved first so an unknown sort key fails before any
    /// filter is built. `scope` adds the entity-specific equality filters on
    /// top of search and `isActive`.
    pub fn to_query<'a, F>(
        &self,
        config: &'a ListingConfig,
        scope: F,
    ) -> Result<ListQuery, CoreError>
    where
        F: FnOnce(PredicateBuilder<'a>) -> Result<PredicateBuilder<'a>, CoreError>,
    {
        let order = resolve_order(config, self.sort_by.as_deref(), self.sort_order.as_deref())?;
        let page = PageRequest::resolve(self.page.as_deref(), self.limit.as_deref());

        let builder = PredicateBuilder::new(config)
            .search(self.search.as_deref())
            .eq("is_active", self.is_active()?);
        let predicate = scope(builder)?.build();

        Ok(ListQuery {
            predicate,
            order,
            page,
        })
    }
}

fn parse_id(name: &str, raw: Option<&str>) -> Result<Option<DbId>, CoreError> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    raw.parse::<DbId>()
        .map(Some)
        .map_err(|_| CoreError::Validation(format!("{name} must be an integer id, got '{raw}'")))
}
