//! PostgreSQL storage for the administrative backend.
//!
//! Repositories are zero-sized structs whose async methods take `&PgPool`
//! first. List queries are assembled from the typed predicates and order
//! clauses of `cadre_core` (see [`query`]); grouped counts and statistics
//! live in [`aggregate`]; batch reordering in [`reorder`].

use sqlx::postgres::PgPoolOptions;

pub mod aggregate;
pub mod error;
pub mod models;
pub mod query;
pub mod reorder;
pub mod repositories;

pub type DbPool = sqlx::PgPool;

/// Default upper bound on pooled connections.
pub const DEFAULT_MAX_CONNECTIONS: u32 = 20;

/// Create a connection pool from a database URL.
pub async fn create_pool(database_url: &str, max_connections: u32) -> Result<DbPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
}

/// Round-trip a trivial query to verify connectivity.
pub async fn health_check(pool: &DbPool) -> Result<(), sqlx::Error> {
    sqlx::query_scalar::<_, i32>("SELECT 1").fetch_one(pool).await?;
    Ok(())
}

/// Apply all pending migrations from `crates/db/migrations`.
pub async fn run_migrations(pool: &DbPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
