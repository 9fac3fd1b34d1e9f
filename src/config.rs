use anyhow::{Context, Result, bail, ensure};
use dotenvy::dotenv;
use std::{env, fmt};
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumString)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
pub enum StorageBackend {
    Mysql,
    Memory,
}

#[derive(Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub secret_key: String,
    pub token_ttl_secs: u64,

    pub storage_backend: StorageBackend,
    /// Required for the MySQL backend
    pub database_url: Option<String>,
    pub db_max_connections: u32,

    pub log_dir: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("secret_key", &"<redacted>")
            .field("token_ttl_secs", &self.token_ttl_secs)
            .field("storage_backend", &self.storage_backend)
            .field("database_url", &self.database_url.as_ref().map(|_| "<redacted>"))
            .field("db_max_connections", &self.db_max_connections)
            .field("log_dir", &self.log_dir)
            .finish()
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let secret_key = var("SECRET_KEY").context("SECRET_KEY must be set")?;

        let storage_backend = match var("STORAGE_BACKEND") {
            Some(raw) => raw
                .trim()
                .parse::<StorageBackend>()
                .with_context(|| format!("STORAGE_BACKEND must be mysql or memory, got {raw:?}"))?,
            None => StorageBackend::Mysql,
        };

        let database_url = var("DATABASE_URL");
        if storage_backend == StorageBackend::Mysql && database_url.is_none() {
            bail!("DATABASE_URL must be set when STORAGE_BACKEND is mysql");
        }

        let token_ttl_secs: u64 = var("TOKEN_TTL_SECS")
            .unwrap_or_else(|| "3600".to_string()) // 1 hour
            .parse()
            .context("TOKEN_TTL_SECS must be a positive number of seconds")?;
        ensure!(token_ttl_secs > 0, "TOKEN_TTL_SECS must be a positive number of seconds");

        let db_max_connections: u32 = var("DB_MAX_CONNECTIONS")
            .unwrap_or_else(|| "10".to_string())
            .parse()
            .context("DB_MAX_CONNECTIONS must be a positive number")?;
        ensure!(db_max_connections > 0, "DB_MAX_CONNECTIONS must be a positive number");

        Ok(Self {
            host: var("HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: var("PORT")
                .unwrap_or_else(|| "4000".to_string())
                .parse()
                .context("PORT must be a valid port number")?,
            secret_key,
            token_ttl_secs,
            storage_backend,
            database_url,
            db_max_connections,
            log_dir: var("LOG_DIR").unwrap_or_else(|| "logs".to_string()),
        })
    }
}
