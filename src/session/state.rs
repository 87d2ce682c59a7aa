use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::catalog::{BadgeId, Catalog, Mode, Tier};
use crate::store::schema::PersistedProgress;

/// Choices made before a session starts. Fixed for the session's lifetime.
#[derive(Clone, Debug, PartialEq)]
pub struct SessionSettings {
    pub tier: Tier,
    pub mode: Mode,
    pub accent: String,
    pub speed: f32,
}

impl SessionSettings {
    /// `speed` overrides the tier's default narration speed when given.
    pub fn new(catalog: &Catalog, tier: Tier, mode: Mode, accent: &str, speed: Option<f32>) -> Self {
        Self {
            tier,
            mode,
            accent: accent.to_string(),
            speed: speed.unwrap_or_else(|| catalog.default_speed(tier)),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Idle,
    LevelActive,
    Evaluated,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct WrongAnswer {
    pub challenge: String,
    pub submitted: String,
    pub tier: Tier,
    pub mode: Mode,
    #[serde(default)]
    pub timed_out: bool,
}

#[derive(Clone, Debug)]
pub struct SessionState {
    pub settings: SessionSettings,
    pub phase: Phase,
    pub score: u32,
    pub streak: u32,
    /// Levels started this session, 1-based once the first level starts.
    pub level: u32,
    pub earned_badges: BTreeSet<BadgeId>,
    pub current_challenge: Option<String>,
    /// Challenges shown since the pool was last exhausted.
    pub used_challenges: HashSet<String>,
    pub time_remaining: u32,
    /// Set once the first playback finished and the countdown is armed.
    pub is_playing: bool,
    pub wrong_answers: Vec<WrongAnswer>,
    pub completion_time: Option<u32>,
    /// Cumulative levels from earlier sessions, as of the last load or save.
    pub levels_completed: u32,
}

impl SessionState {
    pub fn new(settings: SessionSettings, time_limit: u32, progress: &PersistedProgress) -> Self {
        Self {
            settings,
            phase: Phase::Idle,
            score: 0,
            streak: 0,
            level: 0,
            earned_badges: progress.earned_badges.clone(),
            current_challenge: None,
            used_challenges: HashSet::new(),
            time_remaining: time_limit,
            is_playing: false,
            wrong_answers: Vec::new(),
            completion_time: None,
            levels_completed: progress.levels_completed,
        }
    }
}
