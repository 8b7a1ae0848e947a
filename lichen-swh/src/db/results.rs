//! Heritage result and finding persistence
//!
//! Results are written exactly once per (pfile, agent) and never updated or
//! deleted here; the batch loop's pre-filter guarantees the uniqueness the
//! table also enforces.

use sqlx::{Row, SqlitePool};
use std::collections::HashSet;

/// A persisted lookup result row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredResult {
    pub pfile_id: i64,
    pub agent_id: i64,
    pub status: i64,
    pub licenses: String,
}

/// Pfile ids of this upload already recorded by this agent
pub async fn processed_pfile_ids(
    pool: &SqlitePool,
    upload_id: i64,
    agent_id: i64,
) -> Result<HashSet<i64>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT r.pfile_id
        FROM heritage_results r
        JOIN pfiles p ON p.pfile_id = r.pfile_id
        WHERE p.upload_id = ? AND r.agent_id = ?
        "#,
    )
    .bind(upload_id)
    .bind(agent_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|row| row.get("pfile_id")).collect())
}

/// Insert the single result row for a processed pfile
pub async fn insert_result(
    pool: &SqlitePool,
    pfile_id: i64,
    agent_id: i64,
    status: i64,
    licenses: &str,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        r#"
        INSERT INTO heritage_results (pfile_id, agent_id, status, licenses)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(pfile_id)
    .bind(agent_id)
    .bind(status)
    .bind(licenses)
    .execute(pool)
    .await?;

    Ok(())
}

/// Link a recognized license name to its catalog entry for this run
pub async fn insert_finding(
    pool: &SqlitePool,
    agent_id: i64,
    pfile_id: i64,
    license_id: i64,
) -> Result<(), sqlx::Error> {
    sqlx::query(
        "INSERT INTO heritage_findings (agent_id, pfile_id, license_id) VALUES (?, ?, ?)",
    )
    .bind(agent_id)
    .bind(pfile_id)
    .bind(license_id)
    .execute(pool)
    .await?;

    Ok(())
}

/// Load the result row for one pfile, if recorded
pub async fn load_result(
    pool: &SqlitePool,
    pfile_id: i64,
    agent_id: i64,
) -> Result<Option<StoredResult>, sqlx::Error> {
    let row = sqlx::query(
        r#"
        SELECT pfile_id, agent_id, status, licenses
        FROM heritage_results
        WHERE pfile_id = ? AND agent_id = ?
        "#,
    )
    .bind(pfile_id)
    .bind(agent_id)
    .fetch_optional(pool)
    .await?;

    Ok(row.map(|row| StoredResult {
        pfile_id: row.get("pfile_id"),
        agent_id: row.get("agent_id"),
        status: row.get("status"),
        licenses: row.get("licenses"),
    }))
}

/// Catalog ids linked to a pfile by this agent
pub async fn findings_for_pfile(
    pool: &SqlitePool,
    agent_id: i64,
    pfile_id: i64,
) -> Result<Vec<i64>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT license_id
        FROM heritage_findings
        WHERE agent_id = ? AND pfile_id = ?
        ORDER BY license_id
        "#,
    )
    .bind(agent_id)
    .bind(pfile_id)
    .fetch_all(pool)
    .await?;

    Ok(rows.into_iter().map(|row| row.get("license_id")).collect())
}
