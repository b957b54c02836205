//! Database connection, migrations and status

use anyhow::{Context, Result};
use tenderhub_persistence::{create_pool, run_migrations, Database, DatabaseConfig};

use crate::Cli;

pub fn config_from(cli: &Cli) -> DatabaseConfig {
    DatabaseConfig::new(cli.database_url.clone())
        .with_max_connections(cli.max_connections)
        .with_auto_migrate(cli.auto_migrate)
}

/// Make sure the directory of a file-backed database exists
fn ensure_parent_dir(url: &str) -> Result<()> {
    let path = url
        .trim_start_matches("sqlite://")
        .trim_start_matches("sqlite:");
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(":memory:") {
        return Ok(());
    }
    if let Some(parent) = std::path::Path::new(path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
    }
    Ok(())
}

pub async fn connect(config: &DatabaseConfig) -> Result<Database> {
    ensure_parent_dir(&config.url)?;
    Database::connect(config)
        .await
        .with_context(|| format!("Failed to open database {}", config.url))
}

pub async fn migrate(config: &DatabaseConfig) -> Result<()> {
    ensure_parent_dir(&config.url)?;
    let pool = create_pool(config).await.context("Failed to connect to database")?;
    run_migrations(&pool).await.context("Failed to apply migrations")?;
    pool.close().await;
    println!("{}", serde_json::json!({ "migrated": true, "url": config.url }));
    Ok(())
}

pub async fn show_status(config: &DatabaseConfig) -> Result<()> {
    let database = connect(config).await?;
    let counts = database
        .table_counts()
        .await
        .context("Failed to count rows. Run 'tenderhub migrate' first.")?;
    println!("{}", serde_json::to_string_pretty(&counts)?);
    database.close().await;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_url_needs_no_directory() {
        assert!(ensure_parent_dir("sqlite::memory:").is_ok());
    }
}
