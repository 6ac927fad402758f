//! Transactional application of reorder batches.
//!
//! All updates of a batch run in one transaction: either every row gets its
//! new `display_order` or none does. A missing id aborts and rolls back.

use cadre_core::error::CoreError;
use cadre_core::reorder::{validate_batch, ReorderItem};
use cadre_core::types::DbId;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, QueryBuilder};

use crate::error::DbError;

/// The table being reordered and an optional scope every row must belong to.
#[derive(Debug, Clone, Copy)]
pub struct ReorderTarget {
    pub entity: &'static str,
    pub table: &'static str,
    /// `(column, value)` restricting which rows the batch may touch.
    pub scope: Option<(&'static str, DbId)>,
}

/// Apply `batch` and return the affected rows ordered by their new position.
///
/// Stamps `updated_by` with `actor` and refreshes `updated_at` on each row.
pub async fn apply_reorder<T>(
    pool: &PgPool,
    target: &ReorderTarget,
    columns: &str,
    batch: &[ReorderItem],
    actor: DbId,
) -> Result<Vec<T>, DbError>
where
    T: for<'r> FromRow<'r, PgRow> + Send + Unpin,
{
    validate_batch(batch)?;
    if batch.is_empty() {
        return Ok(Vec::new());
    }

    let mut tx = pool.begin().await?;

    for item in batch {
        let mut qb = QueryBuilder::new(format!("UPDATE {} SET display_order = ", target.table));
        qb.push_bind(item.display_order)
            .push(", updated_by = ")
            .push_bind(actor)
            .push(", updated_at = NOW() WHERE id = ")
            .push_bind(item.id);
        if let Some((column, value)) = target.scope {
            qb.push(" AND ").push(column).push(" = ").push_bind(value);
        }

        let result = qb.build().execute(&mut *tx).await?;
        if result.rows_affected() == 0 {
            // Dropping `tx` rolls back the updates already issued.
            tracing::warn!(
                entity = target.entity,
                id = item.id,
                "Reorder target missing"
            );
            return Err(CoreError::NotFound {
                entity: target.entity,
                id: item.id,
            }
            .into());
        }
    }

    let ids: Vec<DbId> = batch.iter().map(|item| item.id).collect();
    let query = format!(
        "SELECT {columns} FROM {} WHERE id = ANY($1) ORDER BY display_order ASC, id ASC",
        target.table
    );
    let rows = sqlx::query_as::<_, T>(&query)
        .bind(&ids)
        .fetch_all(&mut *tx)
        .await?;

    tx.commit().await?;

    tracing::info!(
        entity = target.entity,
        count = batch.len(),
        actor,
        "Applied reorder batch"
    );
    Ok(rows)
}
