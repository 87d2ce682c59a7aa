use anyhow::Result;

use crate::store::kv::KeyValueStore;
use crate::store::schema::{Checkpoint, HIGH_SCORE_KEY, PROGRESS_KEY, PersistedProgress};

/// Merges session results into durable progress over a key-value store.
pub struct ProgressStore<S> {
    store: S,
}

impl<S: KeyValueStore> ProgressStore<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Missing, unreadable, or unparseable progress all load as defaults.
    pub fn load(&self) -> PersistedProgress {
        match self.store.get(PROGRESS_KEY) {
            Ok(Some(content)) => match serde_json::from_str(&content) {
                Ok(progress) => progress,
                Err(err) => {
                    tracing::warn!(%err, "stored progress is malformed, starting fresh");
                    PersistedProgress::default()
                }
            },
            Ok(None) => PersistedProgress::default(),
            Err(err) => {
                tracing::warn!(%err, "failed to read stored progress, starting fresh");
                PersistedProgress::default()
            }
        }
    }

    /// The plain high-score key, falling back to the progress record.
    pub fn high_score(&self) -> u32 {
        self.stored_high_score()
            .unwrap_or_else(|| self.load().high_score)
    }

    fn stored_high_score(&self) -> Option<u32> {
        self.store
            .get(HIGH_SCORE_KEY)
            .ok()
            .flatten()
            .and_then(|s| s.trim().parse().ok())
    }

    /// Merge a checkpoint into stored progress and write both keys.
    pub fn save(&mut self, checkpoint: &Checkpoint<'_>) -> Result<PersistedProgress> {
        let stored = self.load();
        let merged = stored.merged(checkpoint, self.stored_high_score().unwrap_or(0));

        let json = serde_json::to_string_pretty(&merged)?;
        self.store.set(PROGRESS_KEY, &json)?;
        self.store
            .set(HIGH_SCORE_KEY, &merged.high_score.to_string())?;

        tracing::info!(
            levels_completed = merged.levels_completed,
            high_score = merged.high_score,
            badges = merged.earned_badges.len(),
            "progress saved"
        );
        Ok(merged)
    }

    pub fn inner(&self) -> &S {
        &self.store
    }

    pub fn into_inner(self) -> S {
        self.store
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeSet;

    use super::*;
    use crate::catalog::BadgeId;
    use crate::store::kv::MemoryStore;

    fn checkpoint(new_levels: u32, score: u32, badges: &BTreeSet<BadgeId>) -> Checkpoint<'_> {
        Checkpoint {
            new_levels,
            score,
            earned_badges: badges,
        }
    }

    #[test]
    fn empty_store_loads_defaults() {
        let store = ProgressStore::new(MemoryStore::new());
        let progress = store.load();
        assert_eq!(progress.levels_completed, 0);
        assert!(progress.earned_badges.is_empty());
        assert_eq!(progress.high_score, 0);
        assert_eq!(store.high_score(), 0);
    }

    #[test]
    fn malformed_record_loads_defaults() {
        let mut kv = MemoryStore::new();
        kv.set(PROGRESS_KEY, "{not json").unwrap();
        let store = ProgressStore::new(kv);
        assert_eq!(store.load(), PersistedProgress::default());
    }

    #[test]
    fn high_score_never_decreases() {
        let mut store = ProgressStore::new(MemoryStore::new());
        let none = BTreeSet::new();

        store.save(&checkpoint(0, 30, &none)).unwrap();
        assert_eq!(store.high_score(), 30);

        store.save(&checkpoint(0, 50, &none)).unwrap();
        assert_eq!(store.high_score(), 50);

        store.save(&checkpoint(0, 20, &none)).unwrap();
        assert_eq!(store.high_score(), 50);
        assert_eq!(store.load().high_score, 50);
    }

    #[test]
    fn both_keys_are_written() {
        let mut store = ProgressStore::new(MemoryStore::new());
        let badges: BTreeSet<BadgeId> = [BadgeId::Streak5].into_iter().collect();
        store.save(&checkpoint(4, 45, &badges)).unwrap();

        let kv = store.into_inner();
        assert_eq!(kv.get(HIGH_SCORE_KEY).unwrap().as_deref(), Some("45"));
        let record: PersistedProgress =
            serde_json::from_str(&kv.get(PROGRESS_KEY).unwrap().unwrap()).unwrap();
        assert_eq!(record.levels_completed, 4);
        assert!(record.earned_badges.contains(&BadgeId::Streak5));
    }

    #[test]
    fn levels_accumulate_and_badges_union() {
        let mut store = ProgressStore::new(MemoryStore::new());
        let first: BTreeSet<BadgeId> = [BadgeId::Streak5].into_iter().collect();
        let second: BTreeSet<BadgeId> = [BadgeId::DailyChallenge].into_iter().collect();

        store.save(&checkpoint(3, 10, &first)).unwrap();
        let merged = store.save(&checkpoint(11, 5, &second)).unwrap();

        assert_eq!(merged.levels_completed, 14);
        assert_eq!(merged.earned_badges.len(), 2);
    }

    #[test]
    fn high_score_key_wins_over_stale_record() {
        let mut kv = MemoryStore::new();
        kv.set(HIGH_SCORE_KEY, "80").unwrap();
        let mut store = ProgressStore::new(kv);
        let merged = store.save(&checkpoint(1, 10, &BTreeSet::new())).unwrap();
        assert_eq!(merged.high_score, 80);
    }
}
