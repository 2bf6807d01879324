//! PostgreSQL storage layer.
//!
//! Operations are split into submodules by domain:
//!
//! - [`codes`] — submission code prefixes and per-prefix sequence minting
//! - [`submissions`] — submission store and status state machine
//! - [`reviews`] — reviewer assignment and scoring
//! - [`payments`] — payment proof tracking
//! - [`users`] — minimal user lookups

pub mod codes;
mod models;
pub mod payments;
pub mod reviews;
pub mod submissions;
pub mod users;

pub use models::*;

use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::sync::Arc;

pub type DbPool = Arc<PgPool>;

pub async fn create_pool(database_url: &str) -> Result<DbPool, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(database_url)
        .await?;

    Ok(Arc::new(pool))
}

pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}
