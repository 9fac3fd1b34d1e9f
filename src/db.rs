use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::{MySqlPool, mysql::MySqlPoolOptions};
use tracing::info;

use crate::config::{Config, StorageBackend};
use crate::storage::{Storage, memory::MemoryStorage, mysql::MySqlStorage};

pub async fn init_db(database_url: &str, max_connections: u32) -> Result<MySqlPool> {
    let pool = MySqlPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await
        .context("Failed to connect to database")?;

    sqlx::migrate!("./migrations")
        .run(&pool)
        .await
        .context("Failed to run database migrations")?;
    log::info!("Database schema is up to date");

    Ok(pool)
}

/// Builds the single storage handle shared by every worker.
pub async fn init_storage(config: &Config) -> Result<Arc<dyn Storage>> {
    info!(backend = %config.storage_backend, "Initializing storage");

    let storage: Arc<dyn Storage> = match config.storage_backend {
        StorageBackend::Mysql => {
            let database_url = config
                .database_url
                .as_deref()
                .context("DATABASE_URL must be set when STORAGE_BACKEND is mysql")?;
            let pool = init_db(database_url, config.db_max_connections).await?;
            Arc::new(MySqlStorage::new(pool))
        }
        StorageBackend::Memory => Arc::new(MemoryStorage::new()),
    };

    Ok(storage)
}
