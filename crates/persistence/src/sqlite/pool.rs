//! Connection pool setup and migrations

use crate::error::{PersistenceError, PersistenceResult};
use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::str::FromStr;

pub const DEFAULT_DATABASE_URL: &str = "sqlite:data/tenderhub.db?mode=rwc";

/// Pool configuration.
///
/// `max_connections` defaults to 1: every write goes through a single
/// connection, so per-entity operations are applied one at a time.
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub auto_migrate: bool,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_DATABASE_URL.to_string(),
            max_connections: 1,
            auto_migrate: true,
        }
    }
}

impl DatabaseConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    pub fn with_max_connections(mut self, max_connections: u32) -> Self {
        self.max_connections = max_connections;
        self
    }

    pub fn with_auto_migrate(mut self, auto_migrate: bool) -> Self {
        self.auto_migrate = auto_migrate;
        self
    }
}

/// Open a pool; creates the database file if missing and enables foreign keys
pub async fn create_pool(config: &DatabaseConfig) -> PersistenceResult<SqlitePool> {
    if config.max_connections == 0 {
        return Err(PersistenceError::Configuration(
            "max_connections must be at least 1".to_string(),
        ));
    }

    let options = SqliteConnectOptions::from_str(&config.url)?
        .create_if_missing(true)
        .foreign_keys(true);

    // An in-memory database lives only as long as its connection
    let pool = SqlitePoolOptions::new()
        .max_connections(config.max_connections)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect_with(options)
        .await?;

    tracing::debug!(url = %config.url, max_connections = config.max_connections, "Opened SQLite pool");
    Ok(pool)
}

/// Apply pending migrations
pub async fn run_migrations(pool: &SqlitePool) -> PersistenceResult<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    tracing::info!("Database migrations applied");
    Ok(())
}

/// Open a pool and migrate it when configured to
pub async fn init_database(config: &DatabaseConfig) -> PersistenceResult<SqlitePool> {
    let pool = create_pool(config).await?;
    if config.auto_migrate {
        run_migrations(&pool).await?;
    }
    Ok(pool)
}

/// Migrated in-memory database on one connection, for tests
pub async fn memory_pool() -> PersistenceResult<SqlitePool> {
    init_database(&DatabaseConfig::new("sqlite::memory:")).await
}
