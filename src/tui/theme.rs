use ratatui::style::Color;

use crate::model::{TaskStatus, ThemePref, UiConfig};

/// Parsed color theme for the TUI
#[derive(Debug, Clone, PartialEq)]
pub struct Theme {
    pub background: Color,
    pub text: Color,
    pub text_bright: Color,
    pub highlight: Color,
    pub dim: Color,
    pub red: Color,
    pub yellow: Color,
    pub green: Color,
    pub cyan: Color,
    pub purple: Color,
    pub blue: Color,
    pub selection_bg: Color,
    pub selection_border: Color,
    pub gauge: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Theme::dark()
    }
}

impl Theme {
    pub fn dark() -> Self {
        Theme {
            background: Color::Rgb(0x0C, 0x00, 0x1B),
            text: Color::Rgb(0xB0, 0xAA, 0xFF),
            text_bright: Color::Rgb(0xFF, 0xFF, 0xFF),
            highlight: Color::Rgb(0xFB, 0x41, 0x96),
            dim: Color::Rgb(0x7D, 0x78, 0xBF),
            red: Color::Rgb(0xFF, 0x44, 0x44),
            yellow: Color::Rgb(0xFF, 0xD7, 0x00),
            green: Color::Rgb(0x44, 0xFF, 0x88),
            cyan: Color::Rgb(0x44, 0xDD, 0xFF),
            purple: Color::Rgb(0xCC, 0x66, 0xFF),
            blue: Color::Rgb(0x3B, 0x82, 0xF6),
            selection_bg: Color::Rgb(0x3D, 0x14, 0x38),
            selection_border: Color::Rgb(0xFB, 0x41, 0x96),
            gauge: Color::Rgb(0x3B, 0x82, 0xF6),
        }
    }

    pub fn light() -> Self {
        Theme {
            background: Color::Rgb(0xF8, 0xF8, 0xFC),
            text: Color::Rgb(0x33, 0x33, 0x4D),
            text_bright: Color::Rgb(0x00, 0x00, 0x00),
            highlight: Color::Rgb(0xC0, 0x1C, 0x6B),
            dim: Color::Rgb(0x88, 0x88, 0xA0),
            red: Color::Rgb(0xC6, 0x28, 0x28),
            yellow: Color::Rgb(0xB2, 0x86, 0x00),
            green: Color::Rgb(0x2E, 0x7D, 0x32),
            cyan: Color::Rgb(0x00, 0x83, 0x8F),
            purple: Color::Rgb(0x7B, 0x1F, 0xA2),
            blue: Color::Rgb(0x25, 0x63, 0xEB),
            selection_bg: Color::Rgb(0xE4, 0xDC, 0xF4),
            selection_border: Color::Rgb(0xC0, 0x1C, 0x6B),
            gauge: Color::Rgb(0x25, 0x63, 0xEB),
        }
    }

    /// Base palette from the stored preference (system follows dark), then
    /// `[ui.colors]` overrides from the config.
    pub fn from_config(pref: ThemePref, ui: &UiConfig) -> Self {
        let mut theme = match pref {
            ThemePref::Light => Theme::light(),
            ThemePref::Dark | ThemePref::System => Theme::dark(),
        };

        for (key, value) in &ui.colors {
            let Some(color) = parse_hex_color(value) else {
                log::warn!("ignoring ui.colors.{}: not a #RRGGBB color", key);
                continue;
            };
            match key.as_str() {
                "background" => theme.background = color,
                "text" => theme.text = color,
                "text_bright" => theme.text_bright = color,
                "highlight" => theme.highlight = color,
                "dim" => theme.dim = color,
                "red" => theme.red = color,
                "yellow" => theme.yellow = color,
                "green" => theme.green = color,
                "cyan" => theme.cyan = color,
                "purple" => theme.purple = color,
                "blue" => theme.blue = color,
                "selection_bg" => theme.selection_bg = color,
                "selection_border" => theme.selection_border = color,
                "gauge" => theme.gauge = color,
                _ => log::warn!("unknown ui.colors key: {}", key),
            }
        }

        theme
    }

    pub fn status_color(&self, status: TaskStatus) -> Color {
        match status {
            TaskStatus::Todo => self.text,
            TaskStatus::InProgress => self.highlight,
            TaskStatus::Done => self.dim,
        }
    }

    /// Project swatch color, falling back to blue for bad values
    pub fn project_color(&self, hex: &str) -> Color {
        parse_hex_color(hex).unwrap_or(self.blue)
    }
}

/// Parse a hex color string like "#FF4444" into an RGB Color
pub fn parse_hex_color(hex: &str) -> Option<Color> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Color::Rgb(r, g, b))
}
