//! Pfile enumeration and registration
//!
//! Pfiles are distinct file contents within an upload, deduplicated by
//! sha256. The agent itself only enumerates them; registration exists for
//! the upload path and for seeding test fixtures.

use crate::models::PFile;
use sha2::{Digest, Sha256};
use sqlx::{Row, SqlitePool};
use std::fs;
use std::path::Path;

/// Calculate the lowercase hex sha256 of file contents
pub fn calculate_file_hash(file_path: &Path) -> std::io::Result<String> {
    let contents = fs::read(file_path)?;
    let hash = Sha256::digest(&contents);
    Ok(format!("{:x}", hash))
}

/// All pfiles belonging to an upload, ordered by pfile id.
///
/// The order carries no meaning but is deterministic so runs are
/// reproducible.
pub async fn pfiles_for_upload(
    pool: &SqlitePool,
    upload_id: i64,
) -> Result<Vec<PFile>, sqlx::Error> {
    let rows = sqlx::query(
        r#"
        SELECT pfile_id, upload_id, sha256
        FROM pfiles
        WHERE upload_id = ?
        ORDER BY pfile_id
        "#,
    )
    .bind(upload_id)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|row| PFile {
            pfile_id: row.get("pfile_id"),
            upload_id: row.get("upload_id"),
            sha256: row.get("sha256"),
        })
        .collect())
}

/// Register a pfile by content hash, returning its id.
///
/// Re-registering the same (upload, sha256) pair returns the existing id.
pub async fn register_pfile(
    pool: &SqlitePool,
    upload_id: i64,
    sha256: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO pfiles (upload_id, sha256) VALUES (?, ?)")
        .bind(upload_id)
        .bind(sha256)
        .execute(pool)
        .await?;

    let pfile_id: i64 =
        sqlx::query_scalar("SELECT pfile_id FROM pfiles WHERE upload_id = ? AND sha256 = ?")
            .bind(upload_id)
            .bind(sha256)
            .fetch_one(pool)
            .await?;

    Ok(pfile_id)
}

/// Hash a file on disk and register it as a pfile of the upload
pub async fn register_package_file(
    pool: &SqlitePool,
    upload_id: i64,
    file_path: &Path,
) -> Result<i64, sqlx::Error> {
    let sha256 = calculate_file_hash(file_path).map_err(sqlx::Error::Io)?;
    register_pfile(pool, upload_id, &sha256).await
}
