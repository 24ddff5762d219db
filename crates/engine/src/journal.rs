use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use solace_core::mood::average_score;
use solace_core::{MoodEntry, MoodScore, MOOD_HISTORY_LIMIT};
use solace_observability::AppMetrics;
use solace_storage::MoodRepository;
use tracing::{info, instrument};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize)]
pub struct MoodSummary {
    pub entries: usize,
    pub average_score: Option<f32>,
    pub latest: Option<MoodEntry>,
}

/// Keeps each user's recent mood ratings. The response engine never reads these;
/// callers open the journal when a turn classifies as `mood_tracking`.
#[derive(Clone)]
pub struct MoodJournal<S>
where
    S: MoodRepository,
{
    store: Arc<S>,
    metrics: Arc<AppMetrics>,
    history_limit: usize,
}

impl<S> MoodJournal<S>
where
    S: MoodRepository,
{
    pub fn new(store: Arc<S>, metrics: Arc<AppMetrics>) -> Self {
        Self {
            store,
            metrics,
            history_limit: MOOD_HISTORY_LIMIT,
        }
    }

    pub fn history_limit(&self) -> usize {
        self.history_limit
    }

    pub async fn record(&self, user_id: &str, score: MoodScore, note: &str) -> Result<MoodEntry> {
        self.record_at(user_id, score, note, Utc::now()).await
    }

    #[instrument(skip(self, note, recorded_at))]
    pub async fn record_at(
        &self,
        user_id: &str,
        score: MoodScore,
        note: &str,
        recorded_at: DateTime<Utc>,
    ) -> Result<MoodEntry> {
        let entry = MoodEntry {
            id: Uuid::new_v4().to_string(),
            user_id: user_id.to_string(),
            score,
            note: note.trim().to_string(),
            recorded_at,
        };

        self.store
            .insert_entry(&entry)
            .await
            .context("failed to save mood entry")?;
        let pruned = self
            .store
            .prune_entries(user_id, self.history_limit)
            .await
            .context("failed to prune mood history")?;

        self.metrics.inc_mood_entry();
        info!(score = score.value(), pruned, "mood entry recorded");

        Ok(entry)
    }

    /// Newest first, never more than the history limit.
    pub async fn history(&self, user_id: &str, limit: usize) -> Result<Vec<MoodEntry>> {
        self.store
            .recent_entries(user_id, limit.min(self.history_limit))
            .await
            .context("failed to load mood history")
    }

    pub async fn summary(&self, user_id: &str) -> Result<MoodSummary> {
        let entries = self.history(user_id, self.history_limit).await?;
        let scores = entries.iter().map(|entry| entry.score).collect::<Vec<_>>();

        Ok(MoodSummary {
            entries: entries.len(),
            average_score: average_score(&scores),
            latest: entries.into_iter().next(),
        })
    }

    pub async fn clear(&self, user_id: &str) -> Result<u64> {
        self.store
            .clear_entries(user_id)
            .await
            .context("failed to clear mood history")
    }
}

#[cfg(test)]
mod tests {
    use chrono::Duration;
    use solace_storage::MemoryStore;

    use super::*;

    fn journal() -> MoodJournal<MemoryStore> {
        MoodJournal::new(Arc::new(MemoryStore::new()), AppMetrics::shared())
    }

    fn score(value: i64) -> MoodScore {
        MoodScore::new(value).unwrap()
    }

    #[tokio::test]
    async fn records_trimmed_notes() {
        let journal = journal();
        let entry = journal
            .record("u1", score(6), "  long walk helped \n")
            .await
            .unwrap();
        assert_eq!(entry.note, "long walk helped");
        assert_eq!(entry.user_id, "u1");

        let history = journal.history("u1", 10).await.unwrap();
        assert_eq!(history.len(), 1);
        assert_eq!(history[0].id, entry.id);
    }

    #[tokio::test]
    async fn history_is_newest_first_and_respects_limit() {
        let journal = journal();
        let start = Utc::now() - Duration::days(5);
        for value in 0..5 {
            journal
                .record_at("u1", score(value), "", start + Duration::hours(value))
                .await
                .unwrap();
        }

        let history = journal.history("u1", 3).await.unwrap();
        let scores = history
            .iter()
            .map(|entry| entry.score.value())
            .collect::<Vec<_>>();
        assert_eq!(scores, vec![4, 3, 2]);
    }

    #[tokio::test]
    async fn default_limit_keeps_thirty_entries() {
        let journal = journal();
        assert_eq!(journal.history_limit(), 30);
        for _ in 0..32 {
            journal.record("u1", score(5), "").await.unwrap();
        }
        assert_eq!(journal.history("u1", 100).await.unwrap().len(), 30);
    }

    #[tokio::test]
    async fn summarizes_history() {
        let journal = journal();
        let empty = journal.summary("u1").await.unwrap();
        assert_eq!(empty.entries, 0);
        assert!(empty.average_score.is_none());

        let earlier = Utc::now() - Duration::hours(3);
        journal
            .record_at("u1", score(8), "", earlier + Duration::hours(1))
            .await
            .unwrap();
        journal.record_at("u1", score(2), "", earlier).await.unwrap();

        let summary = journal.summary("u1").await.unwrap();
        assert_eq!(summary.entries, 2);
        assert_eq!(summary.average_score, Some(5.0));
        assert_eq!(summary.latest.map(|entry| entry.score.value()), Some(8));
    }

    #[tokio::test]
    async fn users_are_isolated() {
        let journal = journal();
        journal.record("u1", score(4), "").await.unwrap();
        journal.record("u2", score(9), "").await.unwrap();

        assert_eq!(journal.clear("u1").await.unwrap(), 1);
        assert!(journal.history("u1", 10).await.unwrap().is_empty());
        assert_eq!(journal.history("u2", 10).await.unwrap().len(), 1);
    }
}
