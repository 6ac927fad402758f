//! Repository for the `modules` table.

use cadre_core::error::CoreError;
use cadre_core::listing::MODULE_LISTING;
use cadre_core::pagination::Page;
use cadre_core::reorder::ReorderItem;
use cadre_core::types::DbId;
use sqlx::PgPool;

use crate::aggregate::{self, TOPICS_BY_MODULE};
use crate::error::{conflict_on_unique, dependency_on_fk, DbError};
use crate::models::module::{
    CreateModule, Module, ModuleOption, ModuleStats, ModuleWithCount, ModuleWithTopics,
    UpdateModule,
};
use crate::models::topic::Topic;
use crate::query::{fetch_page, ListQuery};
use crate::reorder::{apply_reorder, ReorderTarget};
use crate::repositories::topic_repo::{TopicRepo, COLUMNS as TOPIC_COLUMNS};

/// Column list shared across queries to avoid repetition.
pub(crate) const COLUMNS: &str = "id, name, description, display_order, is_active, \
    created_by, updated_by, created_at, updated_at";

const DUPLICATE_NAME: &str = "A module with this name already exists";

/// Provides CRUD, listing, reorder and clone operations for modules.
pub struct ModuleRepo;

impl ModuleRepo {
    /// Insert a new module, returning the created row.
    pub async fn create(
        pool: &PgPool,
        input: &CreateModule,
        actor: DbId,
    ) -> Result<Module, DbError> {
        let query = format!(
            "INSERT INTO modules \
                (name, description, display_order, is_active, created_by, updated_by) \
             VALUES ($1, $2, COALESCE($3, 0), COALESCE($4, true), $5, $5) \
             RETURNING {COLUMNS}"
        );
        let module = sqlx::query_as::<_, Module>(&query)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(input.display_order)
            .bind(input.is_active)
            .bind(actor)
            .fetch_one(pool)
            .await
            .map_err(|e| conflict_on_unique(e, DUPLICATE_NAME))?;

        tracing::info!(module_id = module.id, actor, "Module created");
        Ok(module)
    }

    /// Find a module by its internal ID.
    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<Module>, sqlx::Error> {
        let query = format!("SELECT {COLUMNS} FROM modules WHERE id = $1");
        sqlx::query_as::<_, Module>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a module by ID with its topics in display order.
    pub async fn find_with_topics(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<ModuleWithTopics>, sqlx::Error> {
        let Some(module) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let topics = TopicRepo::list_for_module(pool, module.id).await?;
        Ok(Some(ModuleWithTopics { module, topics }))
    }

    /// One page of modules, each with its topic count.
    pub async fn list(
        pool: &PgPool,
        query: &ListQuery,
    ) -> Result<Page<ModuleWithCount>, sqlx::Error> {
        let page = fetch_page::<Module>(pool, &MODULE_LISTING, COLUMNS, query).await?;
        let ids: Vec<DbId> = page.items.iter().map(|m| m.id).collect();
        let counts = aggregate::count_children(pool, &TOPICS_BY_MODULE, &ids).await?;

        Ok(page.map_items(|module| ModuleWithCount {
            topic_count: counts.get(&module.id).copied().unwrap_or(0),
            module,
        }))
    }

    /// Active modules as `(id, name)` pairs for dropdowns.
    pub async fn options(pool: &PgPool) -> Result<Vec<ModuleOption>, sqlx::Error> {
        sqlx::query_as::<_, ModuleOption>(
            "SELECT id, name FROM modules WHERE is_active = true \
             ORDER BY display_order, name",
        )
        .fetch_all(pool)
        .await
    }

    /// Update a module. Only non-`None` fields are applied.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdateModule,
        actor: DbId,
    ) -> Result<Option<Module>, DbError> {
        let query = format!(
            "UPDATE modules SET \
                name = COALESCE($2, name), \
                description = COALESCE($3, description), \
                display_order = COALESCE($4, display_order), \
                updated_by = $5, \
                updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let module = sqlx::query_as::<_, Module>(&query)
            .bind(id)
            .bind(input.name.as_deref().map(str::trim))
            .bind(&input.description)
            .bind(input.display_order)
            .bind(actor)
            .fetch_optional(pool)
            .await
            .map_err(|e| conflict_on_unique(e, DUPLICATE_NAME))?;

        if module.is_some() {
            tracing::info!(module_id = id, actor, "Module updated");
        }
        Ok(module)
    }

    /// Set `is_active`. Idempotent; always refreshes the audit stamp.
    ///
    /// Returns `None` if no row with the given `id` exists.
    pub async fn set_active(
        pool: &PgPool,
        id: DbId,
        active: bool,
        actor: DbId,
    ) -> Result<Option<Module>, sqlx::Error> {
        let query = format!(
            "UPDATE modules SET is_active = $2, updated_by = $3, updated_at = NOW() \
             WHERE id = $1 \
             RETURNING {COLUMNS}"
        );
        let module = sqlx::query_as::<_, Module>(&query)
            .bind(id)
            .bind(active)
            .bind(actor)
            .fetch_optional(pool)
            .await?;
        if module.is_some() {
            tracing::info!(module_id = id, active, actor, "Module active flag set");
        }
        Ok(module)
    }

    /// Delete a module that has no topics.
    ///
    /// Returns `Ok(false)` if the module does not exist and a
    /// [`CoreError::Dependency`] if topics still reference it.
    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, DbError> {
        let topic_count = aggregate::count_for_parent(pool, &TOPICS_BY_MODULE, id).await?;
        if topic_count > 0 {
            return Err(CoreError::Dependency(format!(
                "Cannot delete module: it still has {topic_count} topic(s)"
            ))
            .into());
        }

        let result = sqlx::query("DELETE FROM modules WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await
            .map_err(|e| dependency_on_fk(e, "Cannot delete module: it still has topics"))?;

        let deleted = result.rows_affected() > 0;
        if deleted {
            tracing::info!(module_id = id, "Module deleted");
        }
        Ok(deleted)
    }

    /// Apply a reorder batch to modules in one transaction.
    pub async fn reorder(
        pool: &PgPool,
        batch: &[ReorderItem],
        actor: DbId,
    ) -> Result<Vec<Module>, DbError> {
        let target = ReorderTarget {
            entity: "Module",
            table: "modules",
            scope: None,
        };
        apply_reorder(pool, &target, COLUMNS, batch, actor).await
    }

    /// Duplicate a module and all of its topics under `new_name`.
    ///
    /// The copy is placed after the last module and starts with the source's
    /// active flag. Returns `None` if the source does not exist.
    pub async fn clone_with_topics(
        pool: &PgPool,
        source_id: DbId,
        new_name: &str,
        actor: DbId,
    ) -> Result<Option<ModuleWithTopics>, DbError> {
        let new_name = new_name.trim();
        let mut tx = pool.begin().await?;

        let source_query = format!("SELECT {COLUMNS} FROM modules WHERE id = $1");
        let Some(source) = sqlx::query_as::<_, Module>(&source_query)
            .bind(source_id)
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        let taken = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM modules WHERE name = $1)",
        )
        .bind(new_name)
        .fetch_one(&mut *tx)
        .await?;
        if taken {
            return Err(CoreError::Conflict(DUPLICATE_NAME.to_string()).into());
        }

        let insert_query = format!(
            "INSERT INTO modules \
                (name, description, display_order, is_active, created_by, updated_by) \
             SELECT $1::TEXT, $2::TEXT, COALESCE(MAX(display_order) + 1, 0), \
                    $3::BOOLEAN, $4::BIGINT, $4::BIGINT \
             FROM modules \
             RETURNING {COLUMNS}"
        );
        let module = sqlx::query_as::<_, Module>(&insert_query)
            .bind(new_name)
            .bind(&source.description)
            .bind(source.is_active)
            .bind(actor)
            .fetch_one(&mut *tx)
            .await
            .map_err(|e| conflict_on_unique(e, DUPLICATE_NAME))?;

        let copy_query = format!(
            "INSERT INTO topics \
                (module_id, name, description, display_order, is_active, created_by, updated_by) \
             SELECT $1::BIGINT, name, description, display_order, is_active, \
                    $2::BIGINT, $2::BIGINT \
             FROM topics WHERE module_id = $3 \
             ORDER BY display_order, id \
             RETURNING {TOPIC_COLUMNS}"
        );
        let mut topics = sqlx::query_as::<_, Topic>(&copy_query)
            .bind(module.id)
            .bind(actor)
            .bind(source.id)
            .fetch_all(&mut *tx)
            .await?;
        topics.sort_by_key(|t| (t.display_order, t.id));

        tx.commit().await?;

        tracing::info!(
            source_id,
            module_id = module.id,
            topic_count = topics.len(),
            actor,
            "Module cloned"
        );
        Ok(Some(ModuleWithTopics { module, topics }))
    }

    /// Module and topic totals, computed with concurrent independent queries.
    pub async fn stats(pool: &PgPool) -> Result<ModuleStats, sqlx::Error> {
        let (modules, modules_with_topics, topics) = tokio::try_join!(
            aggregate::active_split(pool, "modules"),
            aggregate::count_parents_with_children(pool, &TOPICS_BY_MODULE),
            aggregate::active_split(pool, "topics"),
        )?;
        Ok(ModuleStats {
            modules,
            modules_with_topics,
            topics,
        })
    }
}
