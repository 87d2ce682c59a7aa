use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use serde::{Deserialize, Serialize};

use crate::catalog::{Mode, Tier};
use crate::narration::{ACCENTS, NarratorKind};

const MIN_SPEED: f32 = 0.5;
const MAX_SPEED: f32 = 2.0;
const MAX_FEEDBACK_DELAY_MS: u64 = 10_000;
const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_tier")]
    pub tier: Tier,
    #[serde(default = "default_mode")]
    pub mode: Mode,
    #[serde(default = "default_accent")]
    pub accent: String,
    /// Narration speed override. Unset means the tier's default.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub speed: Option<f32>,
    #[serde(default = "default_theme")]
    pub theme: String,
    #[serde(default)]
    pub narrator: NarratorKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub narrator_program: Option<String>,
    #[serde(default = "default_feedback_delay_ms")]
    pub feedback_delay_ms: u64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

fn default_tier() -> Tier {
    Tier::Beginner
}
fn default_mode() -> Mode {
    Mode::Word
}
fn default_accent() -> String {
    "en-US".to_string()
}
fn default_theme() -> String {
    "terminal-default".to_string()
}
fn default_feedback_delay_ms() -> u64 {
    2000
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tier: default_tier(),
            mode: default_mode(),
            accent: default_accent(),
            speed: None,
            theme: default_theme(),
            narrator: NarratorKind::default(),
            narrator_program: None,
            feedback_delay_ms: default_feedback_delay_ms(),
            catalog_path: None,
            log_level: default_log_level(),
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = fs::read_to_string(path)?;
            let mut config: Config = toml::from_str(&content)?;
            config.validate();
            Ok(config)
        } else {
            Ok(Config::default())
        }
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    pub fn config_dir() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("dictum")
    }

    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.toml")
    }

    /// Reset unknown values to defaults and clamp numeric ranges. Call after
    /// deserialization so hand-edited files can't put the game in a bad state.
    pub fn validate(&mut self) {
        if !ACCENTS.contains(&self.accent.as_str()) {
            self.accent = default_accent();
        }
        self.speed = self
            .speed
            .filter(|s| s.is_finite())
            .map(|s| s.clamp(MIN_SPEED, MAX_SPEED));
        if self.theme.trim().is_empty() {
            self.theme = default_theme();
        }
        if self.narrator_program.as_deref().is_some_and(|p| p.trim().is_empty()) {
            self.narrator_program = None;
        }
        self.feedback_delay_ms = self.feedback_delay_ms.min(MAX_FEEDBACK_DELAY_MS);
        self.log_level = self.log_level.to_lowercase();
        if !LOG_LEVELS.contains(&self.log_level.as_str()) {
            self.log_level = default_log_level();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_config_serde_defaults_from_empty() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.feedback_delay_ms, 2000);
        assert_eq!(config.narrator, NarratorKind::Auto);
        assert_eq!(config.speed, None);
    }

    #[test]
    fn test_config_partial_file_keeps_defaults() {
        let toml_str = r#"
tier = "very-hard"
mode = "sentence"
speed = 1.25
"#;
        let config: Config = toml::from_str(toml_str).unwrap();
        assert_eq!(config.tier, Tier::VeryHard);
        assert_eq!(config.mode, Mode::Sentence);
        assert_eq!(config.speed, Some(1.25));
        assert_eq!(config.accent, "en-US");
        assert_eq!(config.theme, "terminal-default");
    }

    #[test]
    fn test_config_save_and_load() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let config = Config {
            tier: Tier::Advanced,
            accent: "en-GB".to_string(),
            narrator: NarratorKind::None,
            ..Config::default()
        };
        config.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = TempDir::new().unwrap();
        let config = Config::load_from(&dir.path().join("absent.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_validate_resets_out_of_range_values() {
        let mut config = Config {
            accent: "xx-YY".to_string(),
            speed: Some(9.0),
            theme: "  ".to_string(),
            narrator_program: Some(String::new()),
            feedback_delay_ms: 60_000,
            log_level: "LOUD".to_string(),
            ..Config::default()
        };
        config.validate();
        assert_eq!(config.accent, "en-US");
        assert_eq!(config.speed, Some(2.0));
        assert_eq!(config.theme, "terminal-default");
        assert_eq!(config.narrator_program, None);
        assert_eq!(config.feedback_delay_ms, 10_000);
        assert_eq!(config.log_level, "info");
    }

    #[test]
    fn test_validate_drops_non_finite_speed() {
        let mut config = Config {
            speed: Some(f32::NAN),
            log_level: "DEBUG".to_string(),
            ..Config::default()
        };
        config.validate();
        assert_eq!(config.speed, None);
        assert_eq!(config.log_level, "debug");
    }
}
