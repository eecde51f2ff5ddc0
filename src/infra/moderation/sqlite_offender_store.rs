// SQLite-backed offender ledger.
//
// One row per user. The increment is a single UPSERT with RETURNING so that
// concurrent violations by the same user serialize at the database and every
// caller sees the exact count its own write produced.

use crate::core::moderation::{ModerationError, OffenderStore};
use async_trait::async_trait;
use chrono::Utc;
use sqlx::{Pool, Row, Sqlite};

pub struct SqliteOffenderStore {
    pool: Pool<Sqlite>,
}

impl SqliteOffenderStore {
    pub fn new(pool: Pool<Sqlite>) -> Self {
        Self { pool }
    }

    /// Run database migrations to create required tables.
    pub async fn migrate(&self) -> Result<(), ModerationError> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS offender_records (
                user_id INTEGER PRIMARY KEY,
                violation_count INTEGER NOT NULL DEFAULT 0,
                last_reason TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await
        .map_err(|e| ModerationError::Storage(e.to_string()))?;

        Ok(())
    }
}

#[async_trait]
impl OffenderStore for SqliteOffenderStore {
    async fn record_violation(&self, user_id: i64, reason: &str) -> Result<u32, ModerationError> {
        let now = Utc::now().to_rfc3339();

        let row = sqlx::query(
            r#"
            INSERT INTO offender_records (user_id, violation_count, last_reason, updated_at)
            VALUES (?, 1, ?, ?)
            ON CONFLICT(user_id) DO UPDATE SET
                violation_count = violation_count + 1,
                last_reason = excluded.last_reason,
                updated_at = excluded.updated_at
            RETURNING violation_count
            "#,
        )
        .bind(user_id)
        .bind(reason)
        .bind(&now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| ModerationError::Storage(e.to_string()))?;

        let count: i64 = row.get("violation_count");
        Ok(count as u32)
    }

    async fn violation_count(&self, user_id: i64) -> Result<u32, ModerationError> {
        let row = sqlx::query("SELECT violation_count FROM offender_records WHERE user_id = ?")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| ModerationError::Storage(e.to_string()))?;

        Ok(row
            .map(|r| r.get::<i64, _>("violation_count") as u32)
            .unwrap_or(0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::sqlite::SqlitePoolOptions;
    use std::sync::Arc;

    async fn store() -> (SqliteOffenderStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("moderation.db");
        let pool = SqlitePoolOptions::new()
            .connect(&format!("sqlite://{}?mode=rwc", path.display()))
            .await
            .unwrap();
        let store = SqliteOffenderStore::new(pool);
        store.migrate().await.unwrap();
        (store, dir)
    }

    #[tokio::test]
    async fn counts_start_at_zero_and_increment() {
        let (store, _dir) = store().await;

        assert_eq!(store.violation_count(1).await.unwrap(), 0);
        assert_eq!(store.record_violation(1, "off-topic").await.unwrap(), 1);
        assert_eq!(store.record_violation(1, "outside-region").await.unwrap(), 2);
        assert_eq!(store.violation_count(1).await.unwrap(), 2);

        // A different user's ledger is untouched.
        assert_eq!(store.violation_count(2).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn concurrent_increments_are_never_lost() {
        let (store, _dir) = store().await;
        let store = Arc::new(store);

        let mut handles = Vec::new();
        for _ in 0..20 {
            let store = Arc::clone(&store);
            handles.push(tokio::spawn(async move {
                store.record_violation(7, "off-topic").await.unwrap()
            }));
        }

        let mut returned = Vec::new();
        for handle in handles {
            returned.push(handle.await.unwrap());
        }

        // Every call saw a distinct count and nothing was lost.
        returned.sort_unstable();
        assert_eq!(returned, (1..=20).collect::<Vec<u32>>());
        assert_eq!(store.violation_count(7).await.unwrap(), 20);
    }
}
