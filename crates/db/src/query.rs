//! Compilation of typed list queries into SQL.
//!
//! Column and table names come exclusively from `cadre_core::listing`
//! configuration; every caller-supplied value is bound with `push_bind`.

use cadre_core::listing::ListingConfig;
use cadre_core::ordering::OrderClause;
use cadre_core::pagination::{Page, PageRequest};
use cadre_core::predicate::{FilterValue, Predicate};
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, QueryBuilder};

/// A fully resolved list request: filter, order and page.
#[derive(Debug, Clone)]
pub struct ListQuery {
    pub predicate: Predicate,
    pub order: OrderClause,
    pub page: PageRequest,
}

/// Escape `LIKE` metacharacters so the term matches literally.
pub fn escape_like(term: &str) -> String {
    let mut escaped = String::with_capacity(term.len());
    for c in term.chars() {
        if matches!(c, '\\' | '%' | '_') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Append ` WHERE ...` for `predicate`, or nothing if it is trivial.
pub fn push_where(qb: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate) {
    if predicate.is_trivial() {
        return;
    }
    qb.push(" WHERE ");
    push_predicate(qb, predicate);
}

fn push_predicate(qb: &mut QueryBuilder<'_, Postgres>, predicate: &Predicate) {
    match predicate {
        Predicate::Eq { column, value } => {
            qb.push(*column).push(" = ");
            push_value(qb, value);
        }
        Predicate::Contains { column, term } => {
            qb.push(*column).push(" ILIKE '%' || ");
            qb.push_bind(escape_like(term));
            qb.push(" || '%' ESCAPE '\\'");
        }
        Predicate::AnyOf(items) => {
            let items: Vec<&Predicate> = items.iter().collect();
            push_group(qb, &items, " OR ", "FALSE");
        }
        Predicate::All(items) => {
            let items: Vec<&Predicate> = items.iter().filter(|p| !p.is_trivial()).collect();
            push_group(qb, &items, " AND ", "TRUE");
        }
    }
}

fn push_group(
    qb: &mut QueryBuilder<'_, Postgres>,
    items: &[&Predicate],
    separator: &str,
    empty: &str,
) {
    match items {
        [] => {
            qb.push(empty);
        }
        [single] => push_predicate(qb, single),
        _ => {
            qb.push("(");
            for (i, item) in items.iter().enumerate() {
                if i > 0 {
                    qb.push(separator);
                }
                push_predicate(qb, item);
            }
            qb.push(")");
        }
    }
}

fn push_value(qb: &mut QueryBuilder<'_, Postgres>, value: &FilterValue) {
    match value {
        FilterValue::Int(v) => {
            qb.push_bind(*v);
        }
        FilterValue::Bool(v) => {
            qb.push_bind(*v);
        }
        FilterValue::Text(v) => {
            qb.push_bind(v.clone());
        }
    }
}

/// Count the rows of `table` matching `predicate`.
pub async fn count_matching(
    pool: &PgPool,
    table: &'static str,
    predicate: &Predicate,
) -> Result<i64, sqlx::Error> {
    let mut qb = QueryBuilder::new(format!("SELECT COUNT(*) FROM {table}"));
    push_where(&mut qb, predicate);
    qb.build_query_scalar::<i64>().fetch_one(pool).await
}

/// Fetch one page of `config.table` plus the total count across all pages.
///
/// The count and the page are independent reads and run concurrently.
pub async fn fetch_page<T>(
    pool: &PgPool,
    config: &ListingConfig,
    columns: &str,
    query: &ListQuery,
) -> Result<Page<T>, sqlx::Error>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    let mut rows_qb = QueryBuilder::new(format!("SELECT {columns} FROM {}", config.table));
    push_where(&mut rows_qb, &query.predicate);
    rows_qb.push(" ORDER BY ").push(query.order.to_sql());
    rows_qb
        .push(" LIMIT ")
        .push_bind(query.page.limit)
        .push(" OFFSET ")
        .push_bind(query.page.offset());

    let (total, items) = tokio::try_join!(
        count_matching(pool, config.table, &query.predicate),
        rows_qb.build_query_as::<T>().fetch_all(pool),
    )?;

    tracing::debug!(
        entity = config.entity,
        total,
        page = query.page.page,
        limit = query.page.limit,
        "Fetched list page"
    );

    Ok(Page::new(items, total, query.page))
}
