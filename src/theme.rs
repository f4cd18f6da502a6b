//! Theme loading: btop-style `theme[key]="value"` and hex → ratatui Color.

use crate::Palette;
use ratatui::style::Color;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Block and UI colours, One Dark by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Theme {
    /// Blocks with an odd sequence number.
    pub odd_block: Color,
    /// Blocks with an even sequence number (including the base).
    pub even_block: Color,
    /// Falling trim pieces.
    pub trim: Color,
    /// Playfield background.
    pub bg: Color,
    /// Border.
    pub div_line: Color,
    /// Text (score, speed).
    pub main_fg: Color,
    /// Highlight / titles.
    pub title: Color,
    /// Background art.
    pub inactive_fg: Color,
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
        Self::onedark_default()
    }
}

impl Theme {
    pub fn onedark_default() -> Self {
        Self {
            odd_block: Color::Rgb(0xE0, 0x6C, 0x75),   // red
            even_block: Color::Rgb(0x61, 0xAF, 0xEF),  // blue
            trim: Color::Rgb(0x96, 0x96, 0x96),        // grey
            bg: Color::Rgb(0x28, 0x2C, 0x34),          // main_bg
            div_line: Color::Rgb(0x3F, 0x44, 0x4F),    // div_line
            main_fg: Color::Rgb(0xAB, 0xB2, 0xBF),     // main_fg
            title: Color::Rgb(0xE5, 0xC0, 0x7B),       // title
            inactive_fg: Color::Rgb(0x5C, 0x63, 0x70), // inactive_fg
        }
    }

    /// Load theme from a btop-style file: `theme[key]="value"` or `theme[key]='value'`.
    /// Falls back to One Dark defaults if path is None or the file is missing.
    pub fn load(path: Option<&Path>, palette: Palette) -> Result<Self, ThemeError> {
        let path = match path {
            Some(p) if p.exists() => p,
            Some(p) => {
                log::warn!("theme file {} not found, using defaults", p.display());
                return Ok(Self::default_for_palette(palette));
            }
            None => return Ok(Self::default_for_palette(palette)),
        };
        let s = std::fs::read_to_string(path)?;
        let map = parse_theme_file(&s);
        let mut theme = Self::from_map(&map);
        theme.apply_palette(palette);
        Ok(theme)
    }

    fn default_for_palette(palette: Palette) -> Self {
        let mut t = Self::onedark_default();
        t.apply_palette(palette);
        t
    }

    /// Override block colours for high-contrast or colorblind play.
    pub fn apply_palette(&mut self, palette: Palette) {
        match palette {
            Palette::Normal => {}
            Palette::HighContrast => {
                self.odd_block = Color::Rgb(0xFF, 0x00, 0x00);
                self.even_block = Color::Rgb(0x00, 0x88, 0xFF);
                self.trim = Color::Rgb(0xFF, 0xFF, 0xFF);
            }
            Palette::Colorblind => {
                // Blue/orange pair, distinguishable without red/green
                self.odd_block = Color::Rgb(0xEE, 0x77, 0x33);
                self.even_block = Color::Rgb(0x00, 0x77, 0xBB);
                self.trim = Color::Rgb(0xBB, 0xBB, 0xBB);
            }
        }
    }

    /// Own keys first (`odd_block`, `even_block`, `trim`), then the matching btop keys.
    fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).and_then(|v| parse_hex(v).ok());
        let d = Self::onedark_default();
        Self {
            odd_block: get("odd_block")
                .or_else(|| get("cpu_end"))
                .unwrap_or(d.odd_block),
            even_block: get("even_block")
                .or_else(|| get("cpu_box"))
                .unwrap_or(d.even_block),
            trim: get("trim").or_else(|| get("graph_text")).unwrap_or(d.trim),
            bg: get("main_bg").or_else(|| get("meter_bg")).unwrap_or(d.bg),
            div_line: get("div_line").unwrap_or(d.div_line),
            main_fg: get("main_fg").unwrap_or(d.main_fg),
            title: get("title").unwrap_or(d.title),
            inactive_fg: get("inactive_fg").unwrap_or(d.inactive_fg),
        }
    }

    /// Colour for a block by sequence-number parity.
    #[inline]
    pub fn block_color(&self, number: u32) -> Color {
        if number % 2 == 1 {
            self.odd_block
        } else {
            self.even_block
        }
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
    let channel = |range: std::ops::Range<usize>| {
        s.get(range)
            .and_then(|h| u8::from_str_radix(h, 16).ok())
            .ok_or_else(|| ThemeError::InvalidHex(s.to_string()))
    };
    let (r, g, b) = match s.len() {
        6 => (channel(0..2)?, channel(2..4)?, channel(4..6)?),
        3 => (channel(0..1)? * 17, channel(1..2)? * 17, channel(2..3)? * 17),
        _ => return Err(ThemeError::InvalidHex(s.to_string())),
    };
    Ok(Color::Rgb(r, g, b))
}
