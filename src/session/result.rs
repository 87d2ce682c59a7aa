use serde::{Deserialize, Serialize};

use crate::catalog::BadgeId;

/// Outcome of one evaluated level, returned by both submission and timeout.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelResult {
    pub is_correct: bool,
    /// Points added to the score, speed bonus included.
    pub points: u32,
    pub bonus_points: u32,
    pub correct_answer: String,
    pub user_answer: String,
    pub new_badges: Vec<BadgeId>,
    pub streak: u32,
    pub score: u32,
    #[serde(default)]
    pub timed_out: bool,
    /// Seconds from countdown start to evaluation.
    pub completion_time: u32,
}

impl LevelResult {
    /// Headline for the feedback panel.
    pub fn title(&self) -> String {
        if self.timed_out {
            "Time's up!".to_string()
        } else if self.is_correct {
            format!("Correct! Finished in {} sec", self.completion_time)
        } else {
            "Incorrect".to_string()
        }
    }
}
