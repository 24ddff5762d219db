use std::collections::HashMap;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, SecondsFormat, Utc};
use parking_lot::RwLock;
use solace_core::{MoodEntry, MoodScore};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};

pub trait MoodRepository: Send + Sync {
    async fn insert_entry(&self, entry: &MoodEntry) -> Result<()>;
    /// Newest first.
    async fn recent_entries(&self, user_id: &str, limit: usize) -> Result<Vec<MoodEntry>>;
    /// Drops everything but the `keep` newest entries for `user_id`.
    async fn prune_entries(&self, user_id: &str, keep: usize) -> Result<u64>;
    async fn clear_entries(&self, user_id: &str) -> Result<u64>;
}

#[derive(Clone, Default)]
pub struct MemoryStore {
    entries: Arc<RwLock<HashMap<String, Vec<MoodEntry>>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl MoodRepository for MemoryStore {
    async fn insert_entry(&self, entry: &MoodEntry) -> Result<()> {
        let mut guard = self.entries.write();
        let entries = guard.entry(entry.user_id.clone()).or_default();
        entries.push(entry.clone());
        entries.sort_by(|a, b| b.recorded_at.cmp(&a.recorded_at));
        Ok(())
    }

    async fn recent_entries(&self, user_id: &str, limit: usize) -> Result<Vec<MoodEntry>> {
        Ok(self
            .entries
            .read()
            .get(user_id)
            .map(|entries| entries.iter().take(limit).cloned().collect())
            .unwrap_or_default())
    }

    async fn prune_entries(&self, user_id: &str, keep: usize) -> Result<u64> {
        let mut guard = self.entries.write();
        let Some(entries) = guard.get_mut(user_id) else {
            return Ok(0);
        };

        let removed = entries.len().saturating_sub(keep);
        entries.truncate(keep);
        Ok(removed as u64)
    }

    async fn clear_entries(&self, user_id: &str) -> Result<u64> {
        Ok(self
            .entries
            .write()
            .remove(user_id)
            .map(|entries| entries.len() as u64)
            .unwrap_or(0))
    }
}

#[derive(Clone)]
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        // every connection to an in-memory database sees its own empty schema
        let max_connections = if database_url.contains(":memory:") { 1 } else { 5 };
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .with_context(|| format!("failed connecting to sqlite at {}", database_url))?;

        let store = Self { pool };
        store.ensure_schema().await?;
        Ok(store)
    }

    async fn ensure_schema(&self) -> Result<()> {
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS mood_entries (
              id TEXT PRIMARY KEY,
              user_id TEXT NOT NULL,
              score INTEGER NOT NULL,
              note TEXT NOT NULL,
              recorded_at TEXT NOT NULL
            );
            "#,
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            r#"
            CREATE INDEX IF NOT EXISTS mood_entries_user_recorded
            ON mood_entries (user_id, recorded_at DESC);
            "#,
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

impl MoodRepository for SqliteStore {
    async fn insert_entry(&self, entry: &MoodEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO mood_entries (id, user_id, score, note, recorded_at)
            VALUES (?1, ?2, ?3, ?4, ?5)
            ON CONFLICT(id) DO UPDATE SET
              score=excluded.score,
              note=excluded.note,
              recorded_at=excluded.recorded_at
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.user_id)
        .bind(entry.score.value() as i64)
        .bind(&entry.note)
        .bind(entry.recorded_at.to_rfc3339_opts(SecondsFormat::Micros, true))
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn recent_entries(&self, user_id: &str, limit: usize) -> Result<Vec<MoodEntry>> {
        let rows = sqlx::query(
            r#"
            SELECT id, user_id, score, note, recorded_at
            FROM mood_entries
            WHERE user_id = ?1
            ORDER BY recorded_at DESC
            LIMIT ?2
            "#,
        )
        .bind(user_id)
        .bind(limit as i64)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|row| -> Result<MoodEntry> {
                let score = MoodScore::new(row.get::<i64, _>("score"))?;
                Ok(MoodEntry {
                    id: row.get("id"),
                    user_id: row.get("user_id"),
                    score,
                    note: row.get("note"),
                    recorded_at: row
                        .get::<String, _>("recorded_at")
                        .parse::<DateTime<Utc>>()
                        .context("invalid recorded_at in mood_entries")?,
                })
            })
            .collect()
    }

    async fn prune_entries(&self, user_id: &str, keep: usize) -> Result<u64> {
        let result = sqlx::query(
            r#"
            DELETE FROM mood_entries
            WHERE user_id = ?1
              AND id NOT IN (
                SELECT id FROM mood_entries
                WHERE user_id = ?1
                ORDER BY recorded_at DESC
                LIMIT ?2
              )
            "#,
        )
        .bind(user_id)
        .bind(keep as i64)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected())
    }

    async fn clear_entries(&self, user_id: &str) -> Result<u64> {
        let result = sqlx::query("DELETE FROM mood_entries WHERE user_id = ?1")
            .bind(user_id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected())
    }
}

#[derive(Clone)]
pub enum Store {
    Memory(MemoryStore),
    Sqlite(SqliteStore),
}

impl Store {
    pub fn memory() -> Self {
        Self::Memory(MemoryStore::new())
    }

    pub async fn sqlite(database_url: &str) -> Result<Self> {
        let sqlite = SqliteStore::connect(database_url).await?;
        Ok(Self::Sqlite(sqlite))
    }

    pub fn backend_name(&self) -> &'static str {
        match self {
            Store::Memory(_) => "memory",
            Store::Sqlite(_) => "sqlite",
        }
    }
}

impl MoodRepository for Store {
    async fn insert_entry(&self, entry: &MoodEntry) -> Result<()> {
        match self {
            Store::Memory(store) => store.insert_entry(entry).await,
            Store::Sqlite(store) => store.insert_entry(entry).await,
        }
    }

    async fn recent_entries(&self, user_id: &str, limit: usize) -> Result<Vec<MoodEntry>> {
        match self {
            Store::Memory(store) => store.recent_entries(user_id, limit).await,
            Store::Sqlite(store) => store.recent_entries(user_id, limit).await,
        }
    }

    async fn prune_entries(&self, user_id: &str, keep: usize) -> Result<u64> {
        match self {
            Store::Memory(store) => store.prune_entries(user_id, keep).await,
            Store::Sqlite(store) => store.prune_entries(user_id, keep).await,
        }
    }

    async fn clear_entries(&self, user_id: &str) -> Result<u64> {
        match self {
            Store::Memory(store) => store.clear_entries(user_id).await,
            Store::Sqlite(store) => store.clear_entries(user_id).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use super::*;

    fn entry(id: &str, user_id: &str, score: i64, minutes_ago: i64) -> MoodEntry {
        MoodEntry {
            id: id.to_string(),
            user_id: user_id.to_string(),
            score: MoodScore::new(score).unwrap(),
            note: String::new(),
            recorded_at: Utc::now() - Duration::minutes(minutes_ago),
        }
    }

    #[tokio::test]
    async fn memory_store_returns_newest_first() {
        let store = MemoryStore::new();
        store.insert_entry(&entry("a", "u1", 3, 30)).await.unwrap();
        store.insert_entry(&entry("b", "u1", 7, 10)).await.unwrap();
        store.insert_entry(&entry("c", "u2", 9, 5)).await.unwrap();

        let recent = store.recent_entries("u1", 10).await.unwrap();
        let ids = recent.iter().map(|e| e.id.as_str()).collect::<Vec<_>>();
        assert_eq!(ids, vec!["b", "a"]);
    }

    #[tokio::test]
    async fn memory_store_prunes_oldest() {
        let store = MemoryStore::new();
        for i in 0..5 {
            store
                .insert_entry(&entry(&format!("e{i}"), "u1", 5, 50 - i * 10))
                .await
                .unwrap();
        }

        assert_eq!(store.prune_entries("u1", 2).await.unwrap(), 3);
        let ids = store
            .recent_entries("u1", 10)
            .await
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["e4".to_string(), "e3".to_string()]);
        assert_eq!(store.prune_entries("nobody", 2).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn sqlite_store_round_trips_entries() {
        let store = SqliteStore::connect("sqlite::memory:").await.unwrap();
        store.insert_entry(&entry("old", "u1", 2, 60)).await.unwrap();
        store.insert_entry(&entry("new", "u1", 8, 1)).await.unwrap();

        let recent = store.recent_entries("u1", 1).await.unwrap();
        assert_eq!(recent.len(), 1);
        assert_eq!(recent[0].id, "new");
        assert_eq!(recent[0].score.value(), 8);

        assert_eq!(store.prune_entries("u1", 1).await.unwrap(), 1);
        assert_eq!(store.clear_entries("u1").await.unwrap(), 1);
        assert!(store.recent_entries("u1", 5).await.unwrap().is_empty());
    }
}
