use std::fs;

use ratatui::style::Color;
use rust_embed::Embed;
use serde::{Deserialize, Serialize};

use mathadv::engine::DifficultyLevel;

#[derive(Embed)]
#[folder = "assets/themes/"]
struct ThemeAssets;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Theme {
    pub name: String,
    pub colors: ThemeColors,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ThemeColors {
    pub bg: String,
    pub fg: String,
    pub muted: String,
    pub accent: String,
    pub border: String,
    pub header_bg: String,
    pub header_fg: String,
    pub expression: String,
    pub cursor_bg: String,
    pub cursor_fg: String,
    pub bar_filled: String,
    pub bar_empty: String,
    pub easy: String,
    pub medium: String,
    pub hard: String,
    pub error: String,
    pub warning: String,
    pub success: String,
}

impl Theme {
    pub fn load(name: &str) -> Option<Self> {
        // User themes override bundled ones
        if let Some(config_dir) = dirs::config_dir() {
            let user_theme_path = config_dir
                .join("mathadv")
                .join("themes")
                .join(format!("{name}.toml"));
            if let Ok(content) = fs::read_to_string(&user_theme_path) {
                if let Ok(theme) = toml::from_str::<Theme>(&content) {
                    return Some(theme);
                }
            }
        }

        let file = ThemeAssets::get(&format!("{name}.toml"))?;
        let content = std::str::from_utf8(file.data.as_ref()).ok()?;
        toml::from_str::<Theme>(content).ok()
    }

    pub fn available_themes() -> Vec<String> {
        ThemeAssets::iter()
            .filter_map(|f| f.strip_suffix(".toml").map(|n| n.to_string()))
            .collect()
    }
}

impl Default for Theme {
    fn default() -> Self {
        Self::load("chalkboard").unwrap_or_else(|| Self {
            name: "default".to_string(),
            colors: ThemeColors::default(),
        })
    }
}

impl Default for ThemeColors {
    fn default() -> Self {
        Self {
            bg: "#1f2a24".to_string(),
            fg: "#e8ece4".to_string(),
            muted: "#7d8c83".to_string(),
            accent: "#f2d16b".to_string(),
            border: "#4a5a50".to_string(),
            header_bg: "#2b3a32".to_string(),
            header_fg: "#e8ece4".to_string(),
            expression: "#ffffff".to_string(),
            cursor_bg: "#f2d16b".to_string(),
            cursor_fg: "#1f2a24".to_string(),
            bar_filled: "#8fc9a3".to_string(),
            bar_empty: "#2b3a32".to_string(),
            easy: "#8fc9a3".to_string(),
            medium: "#f2d16b".to_string(),
            hard: "#f08a7e".to_string(),
            error: "#f08a7e".to_string(),
            warning: "#f2b56b".to_string(),
            success: "#8fc9a3".to_string(),
        }
    }
}

impl ThemeColors {
    pub fn parse_color(hex: &str) -> Color {
        let hex = hex.trim_start_matches('#');
        if hex.len() == 6 {
            if let (Ok(r), Ok(g), Ok(b)) = (
                u8::from_str_radix(&hex[0..2], 16),
                u8::from_str_radix(&hex[2..4], 16),
                u8::from_str_radix(&hex[4..6], 16),
            ) {
                return Color::Rgb(r, g, b);
            }
        }
        Color::White
    }

    pub fn bg(&self) -> Color { Self::parse_color(&self.bg) }
    pub fn fg(&self) -> Color { Self::parse_color(&self.fg) }
    pub fn muted(&self) -> Color { Self::parse_color(&self.muted) }
    pub fn accent(&self) -> Color { Self::parse_color(&self.accent) }
    pub fn border(&self) -> Color { Self::parse_color(&self.border) }
    pub fn header_bg(&self) -> Color { Self::parse_color(&self.header_bg) }
    pub fn header_fg(&self) -> Color { Self::parse_color(&self.header_fg) }
    pub fn expression(&self) -> Color { Self::parse_color(&self.expression) }
    pub fn cursor_bg(&self) -> Color { Self::parse_color(&self.cursor_bg) }
    pub fn cursor_fg(&self) -> Color { Self::parse_color(&self.cursor_fg) }
    pub fn bar_filled(&self) -> Color { Self::parse_color(&self.bar_filled) }
    pub fn bar_empty(&self) -> Color { Self::parse_color(&self.bar_empty) }
    pub fn error(&self) -> Color { Self::parse_color(&self.error) }
    pub fn warning(&self) -> Color { Self::parse_color(&self.warning) }
    pub fn success(&self) -> Color { Self::parse_color(&self.success) }

    pub fn level(&self, level: DifficultyLevel) -> Color {
        match level {
            DifficultyLevel::Easy => Self::parse_color(&self.easy),
            DifficultyLevel::Medium => Self::parse_color(&self.medium),
            DifficultyLevel::Hard => Self::parse_color(&self.hard),
        }
    }

    /// Green at or above the stable band, amber in it, red below.
    pub fn accuracy(&self, percent: f64) -> Color {
        if percent >= 80.0 {
            self.success()
        } else if percent >= 67.0 {
            self.warning()
        } else {
            self.error()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bundled_themes_parse() {
        let names = Theme::available_themes();
        assert!(names.contains(&"chalkboard".to_string()));
        for name in names {
            assert!(Theme::load(&name).is_some(), "theme {name} failed to parse");
        }
    }

    #[test]
    fn parse_color_falls_back_to_white() {
        assert_eq!(ThemeColors::parse_color("#102030"), Color::Rgb(0x10, 0x20, 0x30));
        assert_eq!(ThemeColors::parse_color("nope"), Color::White);
    }
}
