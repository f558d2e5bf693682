use crate::core::config::DatabaseConfig;
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::time::Duration;
use tokio::sync::OnceCell;

/// Process-wide pool, created on first use and reused afterwards
static POOL: OnceCell<PgPool> = OnceCell::const_new();

pub async fn create_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(config.max_connections)
        .min_connections(config.min_connections)
        .acquire_timeout(Duration::from_secs(config.acquire_timeout_secs))
        .idle_timeout(Duration::from_secs(config.idle_timeout_secs))
        .max_lifetime(Duration::from_secs(config.max_lifetime_secs))
        .connect(&config.url)
        .await
}

/// Returns the shared pool, connecting on the first call.
///
/// Later calls ignore `config` and hand out a clone of the memoised pool.
pub async fn shared_pool(config: &DatabaseConfig) -> Result<PgPool, sqlx::Error> {
    POOL.get_or_try_init(|| create_pool(config)).await.cloned()
}
