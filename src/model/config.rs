use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ops::timer::TimerMode;

/// Configuration from flowstate.toml
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub ui: UiConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Default: see src/cli/handlers/init.rs
    #[serde(default = "default_minutes")]
    pub default_minutes: u32,
    #[serde(default)]
    pub mode: TimerMode,
    /// Elapsed-mode sessions fill the progress gauge over this many minutes
    #[serde(default = "default_flow_horizon")]
    pub flow_horizon_minutes: u32,
}

impl Default for TimerConfig {
    fn default() -> Self {
        TimerConfig {
            default_minutes: default_minutes(),
            mode: TimerMode::default(),
            flow_horizon_minutes: default_flow_horizon(),
        }
    }
}

fn default_minutes() -> u32 {
    25
}

fn default_flow_horizon() -> u32 {
    60
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UiConfig {
    #[serde(default = "default_true")]
    pub show_key_hints: bool,
    /// Palette overrides, e.g. `highlight = "#FB4196"`
    #[serde(default)]
    pub colors: HashMap<String, String>,
}

impl Default for UiConfig {
    fn default() -> Self {
        UiConfig {
            show_key_hints: true,
            colors: HashMap::new(),
        }
    }
}

fn default_true() -> bool {
    true
}
