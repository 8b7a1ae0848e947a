//! License catalog lookups

use sqlx::SqlitePool;

/// Find a catalog license id by exact short-name match.
///
/// License names reported by the archive are matched verbatim; casing and
/// spelling must agree with the catalog entry.
pub async fn find_by_short_name(
    pool: &SqlitePool,
    short_name: &str,
) -> Result<Option<i64>, sqlx::Error> {
    sqlx::query_scalar("SELECT license_id FROM licenses WHERE short_name = ?")
        .bind(short_name)
        .fetch_optional(pool)
        .await
}

/// Insert a catalog entry, returning its id (existing id if already present)
pub async fn insert_license(
    pool: &SqlitePool,
    short_name: &str,
    full_name: Option<&str>,
) -> Result<i64, sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO licenses (short_name, full_name) VALUES (?, ?)")
        .bind(short_name)
        .bind(full_name)
        .execute(pool)
        .await?;

    let license_id: i64 =
        sqlx::query_scalar("SELECT license_id FROM licenses WHERE short_name = ?")
            .bind(short_name)
            .fetch_one(pool)
            .await?;

    Ok(license_id)
}
