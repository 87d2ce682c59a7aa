use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::catalog::BadgeId;

const SCHEMA_VERSION: u32 = 1;

pub const PROGRESS_KEY: &str = "progress";
pub const HIGH_SCORE_KEY: &str = "high_score";

/// Cross-session progress. Field names match the record format written by
/// earlier builds, so they stay camelCase.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersistedProgress {
    pub schema_version: u32,
    pub levels_completed: u32,
    #[serde(deserialize_with = "known_badges")]
    pub earned_badges: BTreeSet<BadgeId>,
    pub high_score: u32,
    pub last_saved_at: Option<DateTime<Utc>>,
}

impl Default for PersistedProgress {
    fn default() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            levels_completed: 0,
            earned_badges: BTreeSet::new(),
            high_score: 0,
            last_saved_at: None,
        }
    }
}

/// Unknown badge ids are skipped instead of failing the whole record, which
/// would otherwise reset every badge.
fn known_badges<'de, D>(deserializer: D) -> Result<BTreeSet<BadgeId>, D::Error>
where
    D: Deserializer<'de>,
{
    let ids: Vec<String> = Vec::deserialize(deserializer)?;
    Ok(ids.iter().filter_map(|id| BadgeId::from_id(id)).collect())
}

/// What a session contributes at a checkpoint.
#[derive(Clone, Debug)]
pub struct Checkpoint<'a> {
    /// Levels not yet counted by an earlier checkpoint of the same session.
    pub new_levels: u32,
    pub score: u32,
    pub earned_badges: &'a BTreeSet<BadgeId>,
}

impl PersistedProgress {
    pub fn merged(&self, checkpoint: &Checkpoint<'_>, stored_high_score: u32) -> Self {
        let mut earned_badges = self.earned_badges.clone();
        earned_badges.extend(checkpoint.earned_badges.iter().copied());

        Self {
            schema_version: SCHEMA_VERSION,
            levels_completed: self.levels_completed.saturating_add(checkpoint.new_levels),
            earned_badges,
            high_score: checkpoint
                .score
                .max(self.high_score)
                .max(stored_high_score),
            last_saved_at: Some(Utc::now()),
        }
    }
}
