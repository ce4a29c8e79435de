use serde::{Deserialize, Serialize};

/// User profile (singleton)
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub full_name: String,
    pub email: String,
}

/// Color scheme preference (singleton)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePref {
    Dark,
    Light,
    #[default]
    System,
}

impl ThemePref {
    pub fn parse_theme(s: &str) -> Option<ThemePref> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dark" => Some(ThemePref::Dark),
            "light" => Some(ThemePref::Light),
            "system" => Some(ThemePref::System),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ThemePref::Dark => "dark",
            ThemePref::Light => "light",
            ThemePref::System => "system",
        }
    }
}
