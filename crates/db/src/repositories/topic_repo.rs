//! Repository for the `topics` table.

use cadre_core::error::CoreError;
use cadre_core::listing::TOPIC_LISTING;
use cadre_core::pagination::Page;
use cadre_core::reorder::ReorderItem;
use cadre_core::types::DbId;
use sqlx::PgPool;

use crate::aggregate::{self, TOPICS_BY_MODULE};
use crate::error::{conflict_on_unique, DbError};
use crate::models::topic::{CreateTopic, Topic, TopicStats, UpdateTopic};
use crate::query::{fetch_page, ListQuery};
use crate::reorder::{apply_reorder, ReorderTarget};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, module_id, name, description, display_order, is_active, \
    created_by, updated_by, created_at, updated_at";

const DUPLICATE_NAME: &str = "A topic with this name already exists in this module";

/// Provides CRUD, listing, reorder and clone operations for topics.
pub struct TopicRepo;

impl TopicRepo {
    /// Insert a new topic, returning the created row.
    ///
    /// Without an explicit `display_order` the topic goes after the last
    /// topic of its module.
    pub async fn create(pool: &PgPool, input: &CreateTopic, actor: DbId) -> Result<Topic, DbError> {
        let query = format!(
            "INSERT INTO topics \
                (module_id, name, description, display_order, is_active, created_by, updated_by) \
             VALUES ($1, $2, $3, \
                COALESCE($4, (SELECT COALESCE(MAX(display_order) + 1, 0) \
                              FROM topics WHERE module_id = $1)), \
                COALESCE($5, true), $6, $6) \
             RETURNING {COLUMNS}"
        );
        let topic = sqlx::query_as::<_, Topic>(&query)
            .bind(input.module_id)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(input.display_order)
            .bind(input.is_active)
            .bind(actor)
            .fetch_one(pool)
            .await
            .map_err(|e| conflict_on_unique(e, DUPLICATE_NAME))?;

        tracing::info!(
            topic_id = topic.id,
            module_id = topic.module_id,
            actor,
            "Topic created"
        );
        Ok(topic)
    }

    /// Find a topic by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Topic>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM topics WHERE id = $1");
        sqlx::query_as::<_, Topic>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// All topics of a module in display order.
    pub async fn list_for_module(
        pool: &PgPool,
        module_id: DbId,
    ) -> Result<Vec<Topic>, sqlx::Error> {
        let query = format!(
            "SELECT {COLUMNS} FROM topics WHERE module_id = $1 ORDER BY display_order, id"
        );
        sqlx::query_as::<_, Topic>(&query)
            .bind(module_id)
            .fetch_all(pool)
            .await
    }

    /// One page of topics.
    pub async fn list(pool: &PgPool, query: &ListQuery) -> Result<Page<Topic>, sqlx::Error> {
        fetch_page::<Topic>(pool, &TOPIC_LISTING, COLUMNS, query).await
    }

    /// Update a topic. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateTopic,
        actor: DbId,
    ) -> Result<Option<Topic>, DbError> {
        let query = format!(
            "UPDATE topics SET \
                module_id = COALESCE($2, module_id), \
                name = COALESCE($3, name), \
                description = COALESCE($4, description), \
                display_order = COALESCE($5, display_order), \
                updated_by = $6, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let topic = sqlx::query_as::<_, Topic>(&query)
            .bind(id)
            .bind(input.module_id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.display_order)
            .bind(actor)
            .fetch_optional(pool)
            .await
            .map_err(|e| conflict_on_unique(e, DUPLICATE_NAME))?;

        if topic.is_some() {
            tracing::info!(topic_id = id, actor, "Topic updated");
        }
        Ok(topic)
    }

    /// Set `is_active`. Idempotent; always refreshes the audit stamp.
    pub async fn set_active(
        pool: &PgPool,
        id: DbId,
        active: bool,
        actor: DbId,
    ) -> Result<Option<Topic>, sqlx::Error> {
        let query = format!(
            "UPDATE topics SET is_active = $2, updated_by = $3, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let topic = sqlx::query_as::<_, Topic>(&query)
            .bind(id)
            .bind(active)
            .bind(actor)
            .fetch_optional(pool)
            .await?;
        if topic.is_some() {
            tracing::info!(topic_id = id, active, actor, "Topic active flag set");
        }
        Ok(topic)
    }

    /// Delete a topic. Returns `true` if a row was removed.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM topics WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(topic_id = id, "Topic deleted");
        }
        Ok(deleted)
    }

    /// Reorder topics of one module in a single transaction.
    ///
    /// Ids that do not belong to `module_id` abort the whole batch.
    pub async fn reorder(
        pool: &PgPool,
        module_id: DbId,
        batch: &[ReorderItem],
        actor: DbId,
    ) -> Result<Vec<Topic>, DbError> {
        let target = ReorderTarget {
            entity: "Topic",
            table: "topics",
            scope: Some(("module_id", module_id)),
        };
        apply_reorder(pool, &target, COLUMNS, batch, actor).await
    }

    /// Copy a topic into `target_module_id`, appended after its last topic.
    ///
    /// Returns `None` if the source topic does not exist.
    pub async fn clone_into(
        pool: &PgPool,
        source_id: DbId,
        target_module_id: DbId,
        new_name: Option<&str>,
        actor: DbId,
    ) -> Result<Option<Topic>, DbError> {
        let Some(source) = Self::find_by_id(pool, source_id).await? else {
            return Ok(None);
        };
        let name = new_name.map(str::trim).unwrap_or(&source.name);

        let (module_exists, name_taken) = sqlx::query_as::<_, (bool, bool)>(
            "SELECT EXISTS(SELECT 1 FROM modules WHERE id = $1), \
                    EXISTS(SELECT 1 FROM topics WHERE module_id = $1 AND name = $2)",
        )
        .bind(target_module_id)
        .bind(name)
        .fetch_one(pool)
        .await?;

        if !module_exists {
            return Err(CoreError::NotFound {
                entity: "Module",
                id: target_module_id,
            }
            .into());
        }
        if name_taken {
            return Err(CoreError::Conflict(DUPLICATE_NAME.to_string()).into());
        }

        let query = format!(
            "INSERT INTO topics \
                (module_id, name, description, display_order, is_active, created_by, updated_by) \
             SELECT $1::BIGINT, $2::TEXT, $3::TEXT, COALESCE(MAX(display_order) + 1, 0), \
                    $4::BOOLEAN, $5::BIGINT, $5::BIGINT \
             FROM topics WHERE module_id = $1 \
             RETURNING {COLUMNS}"
        );
        let topic = sqlx::query_as::<_, Topic>(&query)
            .bind(target_module_id)
            .bind(name)
            .bind(&source.description)
            .bind(source.is_active)
            .bind(actor)
            .fetch_one(pool)
            .await
            .map_err(|e| conflict_on_unique(e, DUPLICATE_NAME))?;

        tracing::info!(
            source_id,
            topic_id = topic.id,
            target_module_id,
            actor,
            "Topic cloned"
        );
        Ok(Some(topic))
    }

    pub async fn stats(pool: &PgPool) -> Result<TopicStats, sqlx::Error> {
        let (topics, modules_with_topics) = tokio::try_join!(
            aggregate::active_split(pool, "topics"),
            aggregate::count_parents_with_children(pool, &TOPICS_BY_MODULE),
        )?;
        Ok(TopicStats {
            topics,
            modules_with_topics,
        })
    }
}
