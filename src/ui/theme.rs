use std::fs;
use std::path::Path;

use ratatui::style::Color;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};

use crate::config::Config;

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

pub const DEFAULT_THEME: &str = "terminal-default";

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ThemeColors {
    pub bg: String,
    pub fg: String,
    pub text_dim: String,
    pub accent: String,
    pub accent_dim: String,
    pub border: String,
    pub border_focused: String,
    pub header_bg: String,
    pub header_fg: String,
    pub bar_filled: String,
    pub bar_empty: String,
    pub word_correct: String,
    pub word_incorrect: String,
    pub word_missing: String,
    pub badge: String,
    pub error: String,
    pub warning: String,
    pub success: String,
}

impl Theme {
    /// User themes in `<config_dir>/dictum/themes/` shadow bundled ones.
    pub fn load(name: &str) -> Option<Self> {
        Self::load_user(&Config::config_dir().join("themes"), name)
            .or_else(|| Self::load_bundled(name))
    }

    fn load_user(dir: &Path, name: &str) -> Option<Self> {
        let content = fs::read_to_string(dir.join(format!("{name}.toml"))).ok()?;
        match toml::from_str::<Theme>(&content) {
            Ok(theme) => Some(theme),
            Err(err) => {
                tracing::warn!(theme = name, %err, "ignoring malformed user theme");
                None
            }
        }
    }

    fn load_bundled(name: &str) -> Option<Self> {
        let file = ThemeAssets::get(&format!("{name}.toml"))?;
        let content = std::str::from_utf8(file.data.as_ref()).ok()?;
        toml::from_str::<Theme>(content).ok()
    }

    pub fn available_themes() -> Vec<String> {
        let mut names: Vec<String> = ThemeAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(|n| n.to_string()))
            .collect();
        names.sort();
        names
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::load_bundled(DEFAULT_THEME).unwrap_or_else(|| Self {
            name: DEFAULT_THEME.to_string(),
            colors: ThemeColors::default(),
        })
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: "reset".to_string(),
            fg: "reset".to_string(),
            text_dim: "darkgray".to_string(),
            accent: "cyan".to_string(),
            accent_dim: "darkgray".to_string(),
            border: "gray".to_string(),
            border_focused: "cyan".to_string(),
            header_bg: "reset".to_string(),
            header_fg: "white".to_string(),
            bar_filled: "cyan".to_string(),
            bar_empty: "darkgray".to_string(),
            word_correct: "green".to_string(),
            word_incorrect: "red".to_string(),
            word_missing: "yellow".to_string(),
            badge: "yellow".to_string(),
            error: "red".to_string(),
            warning: "yellow".to_string(),
            success: "green".to_string(),
        }
    }
}

impl ThemeColors {
    /// `#rrggbb` or a named terminal color. Anything else renders as the
    /// terminal's default color.
    pub fn parse_color(value: &str) -> Color {
        if let Some(hex) = value.strip_prefix('#') {
            if hex.len() == 6 {
                if let (Ok(r), Ok(g), Ok(b)) = (
                    u8::from_str_radix(&hex[0..2], 16),
                    u8::from_str_radix(&hex[2..4], 16),
                    u8::from_str_radix(&hex[4..6], 16),
                ) {
                    return Color::Rgb(r, g, b);
                }
            }
            return Color::Reset;
        }
        value.parse().unwrap_or(Color::Reset)
    }

    pub fn bg(&self) -> Color { Self::parse_color(&self.bg) }
    pub fn fg(&self) -> Color { Self::parse_color(&self.fg) }
    pub fn text_dim(&self) -> Color { Self::parse_color(&self.text_dim) }
    pub fn accent(&self) -> Color { Self::parse_color(&self.accent) }
    pub fn accent_dim(&self) -> Color { Self::parse_color(&self.accent_dim) }
    pub fn border(&self) -> Color { Self::parse_color(&self.border) }
    pub fn border_focused(&self) -> Color { Self::parse_color(&self.border_focused) }
    pub fn header_bg(&self) -> Color { Self::parse_color(&self.header_bg) }
    pub fn header_fg(&self) -> Color { Self::parse_color(&self.header_fg) }
    pub fn bar_filled(&self) -> Color { Self::parse_color(&self.bar_filled) }
    pub fn bar_empty(&self) -> Color { Self::parse_color(&self.bar_empty) }
    pub fn word_correct(&self) -> Color { Self::parse_color(&self.word_correct) }
    pub fn word_incorrect(&self) -> Color { Self::parse_color(&self.word_incorrect) }
    pub fn word_missing(&self) -> Color { Self::parse_color(&self.word_missing) }
    pub fn badge(&self) -> Color { Self::parse_color(&self.badge) }
    pub fn error(&self) -> Color { Self::parse_color(&self.error) }
    pub fn warning(&self) -> Color { Self::parse_color(&self.warning) }
    pub fn success(&self) -> Color { Self::parse_color(&self.success) }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn parses_hex_and_named_colors() {
        assert_eq!(ThemeColors::parse_color("#89b4fa"), Color::Rgb(0x89, 0xb4, 0xfa));
        assert_eq!(ThemeColors::parse_color("red"), Color::Red);
        assert_eq!(ThemeColors::parse_color("#12"), Color::Reset);
        assert_eq!(ThemeColors::parse_color("not-a-color"), Color::Reset);
    }

    #[test]
    fn bundled_themes_all_parse() {
        let names = Theme::available_themes();
        assert!(names.contains(&DEFAULT_THEME.to_string()));
        for name in names {
            assert!(Theme::load_bundled(&name).is_some(), "theme {name} failed to parse");
        }
    }

    #[test]
    fn user_theme_fills_missing_colors() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("mine.toml"),
            "name = \"mine\"\n[colors]\naccent = \"#ff0000\"\n",
        )
        .unwrap();
        let theme = Theme::load_user(dir.path(), "mine").unwrap();
        assert_eq!(theme.colors.accent(), Color::Rgb(255, 0, 0));
        assert_eq!(theme.colors.word_correct(), Color::Green);
    }

    #[test]
    fn malformed_user_theme_is_skipped() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("bad.toml"), "name = ").unwrap();
        assert!(Theme::load_user(dir.path(), "bad").is_none());
    }
}
