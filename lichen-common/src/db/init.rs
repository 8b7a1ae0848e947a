//! Database initialization
//!
//! Opens (or creates) the SQLite database and brings the schema up. Every
//! `create_*_table` function is idempotent (`CREATE TABLE IF NOT EXISTS`) and
//! callable on its own, so tests can build exactly the subset of schema they
//! exercise against an in-memory pool.

use crate::Result;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use std::path::Path;
use tracing::info;

/// Initialize the database connection pool and create tables if needed.
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    // Create parent directory if it doesn't exist
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // mode=rwc: read, write, create
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&db_url)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    // Enable foreign keys
    sqlx::query("PRAGMA foreign_keys = ON").execute(&pool).await?;

    // WAL allows a supervisor or reporting query to read while the agent
    // writes
    sqlx::query("PRAGMA journal_mode = WAL").execute(&pool).await?;

    sqlx::query("PRAGMA busy_timeout = 5000").execute(&pool).await?;

    create_schema(&pool).await?;

    Ok(pool)
}

/// Create all lichen tables (idempotent)
pub async fn create_schema(pool: &SqlitePool) -> Result<()> {
    create_agents_table(pool).await?;
    create_pfiles_table(pool).await?;
    create_licenses_table(pool).await?;
    create_heritage_results_table(pool).await?;
    create_heritage_findings_table(pool).await?;
    Ok(())
}

/// Agent identities: one row per (name, version) pair
pub async fn create_agents_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS agents (
            agent_id INTEGER PRIMARY KEY,
            name TEXT NOT NULL,
            version TEXT NOT NULL,
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(name, version)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Distinct file contents per upload, deduplicated by sha256
pub async fn create_pfiles_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS pfiles (
            pfile_id INTEGER PRIMARY KEY,
            upload_id INTEGER NOT NULL,
            sha256 TEXT NOT NULL,
            UNIQUE(upload_id, sha256)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// License catalog, keyed by exact short name
pub async fn create_licenses_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS licenses (
            license_id INTEGER PRIMARY KEY,
            short_name TEXT NOT NULL UNIQUE,
            full_name TEXT
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Per-file lookup results, at most one row per (pfile, agent)
pub async fn create_heritage_results_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS heritage_results (
            pfile_id INTEGER NOT NULL REFERENCES pfiles(pfile_id),
            agent_id INTEGER NOT NULL REFERENCES agents(agent_id),
            status INTEGER NOT NULL,
            licenses TEXT NOT NULL DEFAULT '',
            created_at TEXT NOT NULL DEFAULT CURRENT_TIMESTAMP,
            UNIQUE(pfile_id, agent_id)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}

/// Links recognized license names to catalog entries, scoped to an agent run
pub async fn create_heritage_findings_table(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS heritage_findings (
            agent_id INTEGER NOT NULL REFERENCES agents(agent_id),
            pfile_id INTEGER NOT NULL REFERENCES pfiles(pfile_id),
            license_id INTEGER NOT NULL REFERENCES licenses(license_id)
        )
        "#,
    )
    .execute(pool)
    .await?;
    Ok(())
}
