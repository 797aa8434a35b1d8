//! Light and dark palettes, btop-style `theme[key]="value"` overrides, hex → ratatui Color.

use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Colours for one palette.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Block colours for cell ids 1..=6.
    pub blocks: [Color; 6],
    /// Board background.
    pub bg: Color,
    /// Grid and borders.
    pub grid: Color,
    /// Score, labels.
    pub text: Color,
    /// Titles, banners, drop preview.
    pub highlight: Color,
    pub game_over: Color,
    /// Secondary text (controls help).
    pub inactive: Color,
}

#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("invalid hex: {0}")]
    InvalidHex(String),
}

impl Default for Theme {
    fn default() -> Self {
        Self::light()
    }
}

impl Theme {
    pub fn light() -> Self {
        Self {
            blocks: [
                Color::Rgb(120, 37, 179), // purple
                Color::Rgb(100, 179, 179), // teal
                Color::Rgb(80, 34, 22),   // brown
                Color::Rgb(80, 134, 22),  // green
                Color::Rgb(180, 34, 22),  // red
                Color::Rgb(180, 34, 122), // magenta
            ],
            bg: Color::Rgb(255, 255, 255),
            grid: Color::Rgb(128, 128, 128),
            text: Color::Rgb(0, 0, 0),
            highlight: Color::Rgb(255, 215, 0),
            game_over: Color::Rgb(255, 125, 0),
            inactive: Color::Rgb(128, 128, 128),
        }
    }

    pub fn dark() -> Self {
        Self {
            blocks: [
                Color::Rgb(200, 100, 255),
                Color::Rgb(100, 255, 255),
                Color::Rgb(200, 100, 50),
                Color::Rgb(100, 255, 100),
                Color::Rgb(255, 100, 100),
                Color::Rgb(255, 100, 200),
            ],
            bg: Color::Rgb(40, 40, 40),
            grid: Color::Rgb(200, 200, 200),
            text: Color::Rgb(255, 255, 255),
            highlight: Color::Rgb(255, 215, 0),
            game_over: Color::Rgb(255, 125, 0),
            inactive: Color::Rgb(128, 128, 128),
        }
    }

    /// Colour for a board cell id; 0 (empty) maps to the background.
    #[inline]
    pub fn block_color(&self, id: u8) -> Color {
        match id {
            0 => self.bg,
            n => self.blocks[(n as usize - 1) % self.blocks.len()],
        }
    }

    /// Override entries from a btop-style theme map. Unknown keys and bad
    /// hex values keep the current colour.
    fn apply_map(&mut self, map: &HashMap<String, String>) {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let [purple, teal, brown, green, red, magenta] = &mut self.blocks;
        let slots: [(&[&str], &mut Color); 12] = [
            (&["cpu_box"], purple),
            (&["hi_fg", "proc_misc"], teal),
            (&["temp_mid"], brown),
            (&["mem_box", "cpu_start"], green),
            (&["cpu_end", "temp_end"], red),
            (&["net_box"], magenta),
            (&["main_bg", "meter_bg"], &mut self.bg),
            (&["div_line"], &mut self.grid),
            (&["main_fg"], &mut self.text),
            (&["title"], &mut self.highlight),
            (&["selected_bg"], &mut self.game_over),
            (&["inactive_fg"], &mut self.inactive),
        ];
        for (keys, slot) in slots {
            if let Some(color) = keys.iter().find_map(|&k| get(k)) {
                *slot = color;
            }
        }
    }
}

/// Both palettes and which one is showing.
#[derive(Debug, Clone)]
pub struct ThemeSet {
    light: Theme,
    dark: Theme,
    is_dark: bool,
}

impl ThemeSet {
    pub fn new(is_dark: bool) -> Self {
        Self {
            light: Theme::light(),
            dark: Theme::dark(),
            is_dark,
        }
    }

    /// Built-in palettes, with the dark one overridden from a btop-style file
    /// when a path is given.
    pub fn load(path: Option<&Path>, is_dark: bool) -> Result<Self, ThemeError> {
        let mut set = Self::new(is_dark);
        let Some(path) = path else {
            return Ok(set);
        };
        let s = std::fs::read_to_string(path)?;
        set.dark.apply_map(&parse_theme_file(&s));
        Ok(set)
    }

    pub fn current(&self) -> &Theme {
        if self.is_dark { &self.dark } else { &self.light }
    }

    pub fn is_dark(&self) -> bool {
        self.is_dark
    }

    pub fn toggle(&mut self) {
        self.is_dark = !self.is_dark;
    }
}

/// Parse btop-style theme file into key -> value map.
fn parse_theme_file(s: &str) -> HashMap<String, String> {
    let mut map = HashMap::new();
    for line in s.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let Some(stripped) = line.strip_prefix("theme[") else {
            continue;
        };
        let Some(end) = stripped.find(']') else {
            continue;
        };
        let key = stripped[..end].trim();
        let rest = stripped[end + 1..].trim();
        if let Some(value) = rest.strip_prefix('=') {
            let value = value.trim().trim_matches('"').trim_matches('\'');
            if !value.is_empty() {
                map.insert(key.to_string(), value.to_string());
            }
        }
    }
    map
}

/// Parse hex colour "#RRGGBB" or "#RGB" into ratatui Color.
pub fn parse_hex(s: &str) -> Result<Color, ThemeError> {
    let s = s.trim().trim_start_matches('#');
    let invalid = || ThemeError::InvalidHex(s.to_string());
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(invalid)
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2)?, channel(2..4)?, channel(4..6)?),
        3 => (channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17),
        _ => return Err(invalid()),
    };
    Ok(Color::Rgb(r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_hex_6() {
        let c = parse_hex("#98C379").unwrap();
        assert!(matches!(c, Color::Rgb(0x98, 0xC3, 0x79)));
    }

    #[test]
    fn test_parse_hex_3() {
        let c = parse_hex("#FFF").unwrap();
        assert!(matches!(c, Color::Rgb(255, 255, 255)));
    }

    #[test]
    fn test_parse_hex_rejects_garbage() {
        assert!(parse_hex("#12345").is_err());
        assert!(parse_hex("#GGGGGG").is_err());
        assert!(parse_hex("#ÿÿÿ").is_err());
    }

    #[test]
    fn test_parse_theme_line() {
        let map = parse_theme_file(r##"theme[main_bg]="#31353F""##);
        assert_eq!(map.get("main_bg"), Some(&"#31353F".to_string()));
        assert!(parse_theme_file("# theme[main_bg]=\"#000\"").is_empty());
    }

    #[test]
    fn empty_cell_uses_background() {
        let theme = Theme::dark();
        assert_eq!(theme.block_color(0), theme.bg);
        assert_eq!(theme.block_color(1), theme.blocks[0]);
        assert_eq!(theme.block_color(6), theme.blocks[5]);
    }

    #[test]
    fn toggle_flips_palette() {
        let mut set = ThemeSet::new(false);
        assert_eq!(set.current(), &Theme::light());
        set.toggle();
        assert!(set.is_dark());
        assert_eq!(set.current(), &Theme::dark());
    }

    #[test]
    fn file_overrides_dark_palette() {
        let path = std::env::temp_dir().join(format!(
            "tetris_boom_theme_{}.theme",
            std::process::id()
        ));
        std::fs::write(&path, "theme[main_bg]=\"#101010\"\ntheme[title]='#abc'\n").unwrap();
        let set = ThemeSet::load(Some(&path), true).unwrap();
        assert_eq!(set.current().bg, Color::Rgb(0x10, 0x10, 0x10));
        assert_eq!(set.current().highlight, Color::Rgb(0xAA, 0xBB, 0xCC));
        assert_eq!(set.current().text, Theme::dark().text);
        let _ = std::fs::remove_file(path);
    }
}
