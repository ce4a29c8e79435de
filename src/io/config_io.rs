use std::fs;
use std::path::{Path, PathBuf};

use crate::model::config::AppConfig;

pub const CONFIG_FILE: &str = "flowstate.toml";

/// Written the first time a data directory is used.
pub const CONFIG_TEMPLATE: &str = r##"# flowstate configuration
# Edit freely, or use: flow config set <key> <value>

[timer]
# Countdown length used when no --minutes is given (1-180)
default_minutes = 25
# "countdown" or "elapsed"
mode = "countdown"
# Elapsed-mode sessions fill the progress gauge over this many minutes
flow_horizon_minutes = 60

[ui]
show_key_hints = true

# [ui.colors]
# background = "#0C001B"
# text = "#B0AAFF"
# highlight = "#FB4196"
# dim = "#7D78BF"
# green = "#44FF88"
# yellow = "#FFD700"
# red = "#FF4444"
"##;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("could not read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("could not write {path}: {source}")]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid flowstate.toml: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid flowstate.toml: {0}")]
    Syntax(#[from] toml_edit::TomlError),
    #[error("unknown config key: {0}")]
    UnknownKey(String),
    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: String, reason: String },
}

pub fn config_path(data_dir: &Path) -> PathBuf {
    data_dir.join(CONFIG_FILE)
}

/// Write the config template if no config exists yet.
pub fn ensure_config(data_dir: &Path) -> Result<(), ConfigError> {
    let path = config_path(data_dir);
    if path.exists() {
        return Ok(());
    }
    fs::write(&path, CONFIG_TEMPLATE).map_err(|source| ConfigError::Write { path, source })
}

/// Read the config, returning both the parsed config and the raw
/// toml_edit document for format-preserving edits. A missing file reads as
/// the defaults with an empty document.
pub fn read_config(data_dir: &Path) -> Result<(AppConfig, toml_edit::DocumentMut), ConfigError> {
    let path = config_path(data_dir);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
        Err(source) => return Err(ConfigError::Read { path, source }),
    };
    let config: AppConfig = toml::from_str(&text)?;
    let doc: toml_edit::DocumentMut = text.parse()?;
    Ok((config, doc))
}

/// Load just the parsed config, falling back to defaults on any error.
pub fn load_config_or_default(data_dir: &Path) -> AppConfig {
    match read_config(data_dir) {
        Ok((config, _)) => config,
        Err(e) => {
            log::warn!("{}, using defaults", e);
            AppConfig::default()
        }
    }
}

/// Write the config document back to disk, preserving formatting.
pub fn write_config(data_dir: &Path, doc: &toml_edit::DocumentMut) -> Result<(), ConfigError> {
    let path = config_path(data_dir);
    fs::write(&path, doc.to_string()).map_err(|source| ConfigError::Write { path, source })
}

/// Look up a dotted key (`timer.default_minutes`) in the document.
pub fn get_value(doc: &toml_edit::DocumentMut, key: &str) -> Option<String> {
    let mut item = doc.as_item();
    for part in key.split('.') {
        item = item.get(part)?;
    }
    Some(match item.as_str() {
        Some(s) => s.to_string(),
        None => item.to_string().trim().to_string(),
    })
}

/// Set a dotted key, creating intermediate tables. The value is stored as an
/// integer or boolean when it parses as one, otherwise as a string. The edited
/// document must still parse as a valid config.
pub fn set_value(
    doc: &mut toml_edit::DocumentMut,
    key: &str,
    raw: &str,
) -> Result<AppConfig, ConfigError> {
    let parts: Vec<&str> = key.split('.').collect();
    let Some((leaf, tables)) = parts.split_last() else {
        return Err(ConfigError::UnknownKey(key.to_string()));
    };
    if !is_known_key(key) {
        return Err(ConfigError::UnknownKey(key.to_string()));
    }

    let mut table = doc.as_table_mut();
    for name in tables {
        if !table.contains_key(name) {
            table.insert(name, toml_edit::Item::Table(toml_edit::Table::new()));
        }
        table = table[*name]
            .as_table_mut()
            .ok_or_else(|| ConfigError::UnknownKey(key.to_string()))?;
    }

    table[*leaf] = if let Ok(n) = raw.parse::<i64>() {
        toml_edit::value(n)
    } else if let Ok(b) = raw.parse::<bool>() {
        toml_edit::value(b)
    } else {
        toml_edit::value(raw)
    };

    let config: AppConfig =
        toml::from_str(&doc.to_string()).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            reason: e.message().to_string(),
        })?;
    if !(1..=180).contains(&config.timer.default_minutes) {
        return Err(ConfigError::InvalidValue {
            key: key.to_string(),
            reason: "minutes must be between 1 and 180".to_string(),
        });
    }
    Ok(config)
}

fn is_known_key(key: &str) -> bool {
    matches!(
        key,
        "timer.default_minutes" | "timer.mode" | "timer.flow_horizon_minutes" | "ui.show_key_hints"
    ) || key.starts_with("ui.colors.")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::timer::TimerMode;
    use tempfile::TempDir;

    #[test]
    fn template_parses_to_defaults() {
        let config: AppConfig = toml::from_str(CONFIG_TEMPLATE).unwrap();
        let defaults = AppConfig::default();
        assert_eq!(config.timer.default_minutes, defaults.timer.default_minutes);
        assert_eq!(config.timer.mode, defaults.timer.mode);
    }

    #[test]
    fn missing_config_reads_defaults() {
        let tmp = TempDir::new().unwrap();
        let (config, doc) = read_config(tmp.path()).unwrap();
        assert_eq!(config.timer.default_minutes, 25);
        assert!(doc.to_string().is_empty());
    }

    #[test]
    fn round_trip_preserves_comments() {
        let tmp = TempDir::new().unwrap();
        ensure_config(tmp.path()).unwrap();
        let (_config, doc) = read_config(tmp.path()).unwrap();
        write_config(tmp.path(), &doc).unwrap();
        let written = fs::read_to_string(config_path(tmp.path())).unwrap();
        assert_eq!(written, CONFIG_TEMPLATE);
    }

    #[test]
    fn set_value_keeps_formatting() {
        let mut doc: toml_edit::DocumentMut = CONFIG_TEMPLATE.parse().unwrap();
        let config = set_value(&mut doc, "timer.default_minutes", "50").unwrap();
        assert_eq!(config.timer.default_minutes, 50);
        let text = doc.to_string();
        assert!(text.contains("default_minutes = 50"));
        assert!(text.contains("# Countdown length used"));
        assert_eq!(get_value(&doc, "timer.default_minutes").as_deref(), Some("50"));
    }

    #[test]
    fn set_value_creates_tables() {
        let mut doc = toml_edit::DocumentMut::new();
        let config = set_value(&mut doc, "timer.mode", "elapsed").unwrap();
        assert_eq!(config.timer.mode, TimerMode::Elapsed);
        set_value(&mut doc, "ui.colors.highlight", "#FF0000").unwrap();
        assert_eq!(get_value(&doc, "ui.colors.highlight").as_deref(), Some("#FF0000"));
    }

    #[test]
    fn set_value_rejects_bad_input() {
        let mut doc: toml_edit::DocumentMut = CONFIG_TEMPLATE.parse().unwrap();
        assert!(matches!(
            set_value(&mut doc, "timer.bogus", "1"),
            Err(ConfigError::UnknownKey(_))
        ));
        assert!(matches!(
            set_value(&mut doc, "timer.default_minutes", "500"),
            Err(ConfigError::InvalidValue { .. })
        ));
        assert!(matches!(
            set_value(&mut doc, "timer.mode", "sideways"),
            Err(ConfigError::InvalidValue { .. })
        ));
    }
}
