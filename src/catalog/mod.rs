use std::collections::{HashMap, HashSet};
use std::fmt;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

const BUILTIN_CATALOG: &str = include_str!("../../assets/catalog.json");

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[derive(clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Tier {
    Beginner,
    Intermediate,
    Advanced,
    VeryHard,
}

impl Tier {
    pub const ALL: [Tier; 4] = [
        Tier::Beginner,
        Tier::Intermediate,
        Tier::Advanced,
        Tier::VeryHard,
    ];

    pub fn index(self) -> usize {
        match self {
            Tier::Beginner => 0,
            Tier::Intermediate => 1,
            Tier::Advanced => 2,
            Tier::VeryHard => 3,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Tier::Beginner => "beginner",
            Tier::Intermediate => "intermediate",
            Tier::Advanced => "advanced",
            Tier::VeryHard => "very-hard",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Tier::Beginner => "Beginner",
            Tier::Intermediate => "Intermediate",
            Tier::Advanced => "Advanced",
            Tier::VeryHard => "Very Hard",
        }
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[derive(clap::ValueEnum)]
#[serde(rename_all = "kebab-case")]
pub enum Mode {
    Word,
    Sentence,
}

impl Mode {
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Word => "word",
            Mode::Sentence => "sentence",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Mode::Word => "Word",
            Mode::Sentence => "Sentence",
        }
    }

    pub fn toggle(self) -> Self {
        match self {
            Mode::Word => Mode::Sentence,
            Mode::Sentence => Mode::Word,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Identifiers are persisted, so the serialized names must stay stable.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BadgeId {
    #[serde(rename = "streak5")]
    Streak5,
    #[serde(rename = "streak10")]
    Streak10,
    #[serde(rename = "streak20")]
    Streak20,
    #[serde(rename = "dailyChallenge")]
    DailyChallenge,
}

impl BadgeId {
    pub const ALL: [BadgeId; 4] = [
        BadgeId::Streak5,
        BadgeId::Streak10,
        BadgeId::Streak20,
        BadgeId::DailyChallenge,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BadgeId::Streak5 => "streak5",
            BadgeId::Streak10 => "streak10",
            BadgeId::Streak20 => "streak20",
            BadgeId::DailyChallenge => "dailyChallenge",
        }
    }

    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|b| b.as_str() == id)
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BadgeInfo {
    pub id: BadgeId,
    pub name: String,
    pub description: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TierContent {
    pub time_limit_secs: u32,
    pub default_speed: f32,
    pub words: Vec<String>,
    pub sentences: Vec<String>,
}

impl TierContent {
    fn pool(&self, mode: Mode) -> &[String] {
        match mode {
            Mode::Word => &self.words,
            Mode::Sentence => &self.sentences,
        }
    }

    /// Drop repeated challenges, keeping the first occurrence, so every
    /// distinct challenge is equally likely to be drawn.
    fn dedup_pools(&mut self) {
        for pool in [&mut self.words, &mut self.sentences] {
            let mut seen = HashSet::new();
            pool.retain(|challenge| seen.insert(challenge.clone()));
        }
    }
}

#[derive(Deserialize)]
struct CatalogFile {
    tiers: HashMap<Tier, TierContent>,
    #[serde(default)]
    badges: Vec<BadgeInfo>,
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog is not valid JSON: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read catalog file: {0}")]
    Io(#[from] std::io::Error),
    #[error("catalog has no entry for tier '{0}'")]
    MissingTier(&'static str),
    #[error("catalog tier '{tier}' has an empty {mode} pool")]
    EmptyPool { tier: &'static str, mode: &'static str },
    #[error("catalog tier '{0}' has a zero time limit")]
    ZeroTimeLimit(&'static str),
}

/// Read-only content table: challenge pools, time limits, default speeds and
/// badge metadata. Every tier is guaranteed present once constructed.
#[derive(Clone, Debug)]
pub struct Catalog {
    tiers: Vec<TierContent>,
    badges: Vec<BadgeInfo>,
}

impl Catalog {
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::from_json(BUILTIN_CATALOG)
    }

    pub fn from_path(path: &Path) -> Result<Self, CatalogError> {
        let content = fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let mut file: CatalogFile = serde_json::from_str(json)?;

        let mut tiers = Vec::with_capacity(Tier::ALL.len());
        for tier in Tier::ALL {
            let mut content = file
                .tiers
                .remove(&tier)
                .ok_or(CatalogError::MissingTier(tier.as_str()))?;
            content.dedup_pools();
            for mode in [Mode::Word, Mode::Sentence] {
                if content.pool(mode).is_empty() {
                    return Err(CatalogError::EmptyPool {
                        tier: tier.as_str(),
                        mode: mode.as_str(),
                    });
                }
            }
            if content.time_limit_secs == 0 {
                return Err(CatalogError::ZeroTimeLimit(tier.as_str()));
            }
            tiers.push(content);
        }

        Ok(Self {
            tiers,
            badges: file.badges,
        })
    }

    fn content(&self, tier: Tier) -> &TierContent {
        &self.tiers[tier.index()]
    }

    pub fn pool(&self, tier: Tier, mode: Mode) -> &[String] {
        self.content(tier).pool(mode)
    }

    pub fn time_limit(&self, tier: Tier) -> u32 {
        self.content(tier).time_limit_secs
    }

    pub fn default_speed(&self, tier: Tier) -> f32 {
        self.content(tier).default_speed
    }

    /// Badge metadata, falling back to the identifier when the catalog omits it.
    pub fn badge(&self, id: BadgeId) -> BadgeInfo {
        self.badges
            .iter()
            .find(|b| b.id == id)
            .cloned()
            .unwrap_or_else(|| BadgeInfo {
                id,
                name: id.as_str().to_string(),
                description: String::new(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_catalog_has_every_tier_and_mode() {
        let catalog = Catalog::builtin().unwrap();
        for tier in Tier::ALL {
            assert!(!catalog.pool(tier, Mode::Word).is_empty());
            assert!(!catalog.pool(tier, Mode::Sentence).is_empty());
            assert_eq!(catalog.time_limit(tier), 30);
        }
        assert_eq!(catalog.default_speed(Tier::Beginner), 0.75);
        assert_eq!(catalog.default_speed(Tier::VeryHard), 1.5);
    }

    #[test]
    fn builtin_badges_have_names() {
        let catalog = Catalog::builtin().unwrap();
        for id in BadgeId::ALL {
            assert!(!catalog.badge(id).description.is_empty());
        }
        assert_eq!(catalog.badge(BadgeId::Streak5).name, "Hot Streak");
    }

    #[test]
    fn missing_tier_is_rejected() {
        let json = r#"{"tiers": {"beginner": {"time_limit_secs": 30, "default_speed": 1.0,
            "words": ["a"], "sentences": ["b"]}}}"#;
        let err = Catalog::from_json(json).unwrap_err();
        assert!(matches!(err, CatalogError::MissingTier("intermediate")));
    }

    #[test]
    fn empty_pool_is_rejected() {
        let tier = |words: &str| {
            format!(
                r#"{{"time_limit_secs": 30, "default_speed": 1.0, "words": [{words}], "sentences": ["s"]}}"#
            )
        };
        let json = format!(
            r#"{{"tiers": {{"beginner": {}, "intermediate": {}, "advanced": {}, "very-hard": {}}}}}"#,
            tier(r#""a""#),
            tier(""),
            tier(r#""c""#),
            tier(r#""d""#),
        );
        let err = Catalog::from_json(&json).unwrap_err();
        assert!(err.to_string().contains("intermediate"));
        assert!(err.to_string().contains("word"));
    }

    #[test]
    fn repeated_challenges_are_loaded_once() {
        let tier = r#"{"time_limit_secs": 30, "default_speed": 1.0,
            "words": ["a", "a", "a", "b"], "sentences": ["x", "y", "x"]}"#;
        let json = format!(
            r#"{{"tiers": {{"beginner": {tier}, "intermediate": {tier}, "advanced": {tier}, "very-hard": {tier}}}}}"#
        );
        let catalog = Catalog::from_json(&json).unwrap();
        assert_eq!(catalog.pool(Tier::Beginner, Mode::Word), ["a", "b"]);
        assert_eq!(catalog.pool(Tier::VeryHard, Mode::Sentence), ["x", "y"]);
    }

    #[test]
    fn unknown_badge_falls_back_to_id() {
        let json = r#"{"tiers": {
            "beginner": {"time_limit_secs": 30, "default_speed": 1.0, "words": ["a"], "sentences": ["b"]},
            "intermediate": {"time_limit_secs": 30, "default_speed": 1.0, "words": ["a"], "sentences": ["b"]},
            "advanced": {"time_limit_secs": 30, "default_speed": 1.0, "words": ["a"], "sentences": ["b"]},
            "very-hard": {"time_limit_secs": 30, "default_speed": 1.0, "words": ["a"], "sentences": ["b"]}
        }}"#;
        let catalog = Catalog::from_json(json).unwrap();
        assert_eq!(catalog.badge(BadgeId::Streak10).name, "streak10");
    }

    #[test]
    fn tier_cycling_wraps() {
        assert_eq!(Tier::VeryHard.next(), Tier::Beginner);
        assert_eq!(Tier::Beginner.prev(), Tier::VeryHard);
        assert_eq!(Mode::Word.toggle(), Mode::Sentence);
    }
}
