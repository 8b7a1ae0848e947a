//! Database access for lichen-swh

pub mod licenses;
pub mod pfiles;
pub mod results;

use sqlx::SqlitePool;

/// Get or create the agent identity row for this (name, version) pair.
///
/// The returned id scopes everything the run persists, so results written by
/// one agent version never shadow another's.
pub async fn current_agent_id(
    pool: &SqlitePool,
    name: &str,
    version: &str,
) -> Result<i64, sqlx::Error> {
    sqlx::query("INSERT OR IGNORE INTO agents (name, version) VALUES (?, ?)")
        .bind(name)
        .bind(version)
        .execute(pool)
        .await?;

    let agent_id: i64 =
        sqlx::query_scalar("SELECT agent_id FROM agents WHERE name = ? AND version = ?")
            .bind(name)
            .bind(version)
            .fetch_one(pool)
            .await?;

    Ok(agent_id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;

    #[tokio::test]
    async fn test_current_agent_id_is_stable() {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(":memory:")
            .await
            .unwrap();
        lichen_common::db::init::create_agents_table(&pool).await.unwrap();

        let first = current_agent_id(&pool, "lichen-swh", "0.1.0").await.unwrap();
        let second = current_agent_id(&pool, "lichen-swh", "0.1.0").await.unwrap();
        assert_eq!(first, second);

        let other = current_agent_id(&pool, "lichen-swh", "0.2.0").await.unwrap();
        assert_ne!(first, other);
    }
}
