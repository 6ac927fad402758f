//! Reorder batches: `(id, display_order)` pairs applied as one operation.

use std::collections::HashSet;

use serde::Deserialize;

use crate::error::CoreError;
use crate::types::DbId;

/// Largest batch accepted by a single reorder request.
pub const MAX_REORDER_BATCH: usize = 500;

/// One entry of a reorder batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReorderItem {
    pub id: DbId,
    pub display_order: i32,
}

/// Reject batches that could not be applied meaningfully.
///
/// Orders need not be contiguous or unique; ids must be unique and orders
/// non-negative. An empty batch is valid.
pub fn validate_batch(batch: &[ReorderItem]) -> Result<(), CoreError> {
    if batch.len() > MAX_REORDER_BATCH {
        return Err(CoreError::Validation(format!(
            "Reorder batch exceeds maximum of {MAX_REORDER_BATCH} items"
        )));
    }
    let mut seen = HashSet::with_capacity(batch.len());
    for item in batch {
        if item.display_order < 0 {
            return Err(CoreError::Validation(format!(
                "Display order for id {} must not be negative",
                item.id
            )));
        }
        if !seen.insert(item.id) {
            return Err(CoreError::Validation(format!(
                "Id {} appears more than once in the reorder batch",
                item.id
            )));
        }
    }
    Ok(())
}
