//! TOML-based application configuration.
//!
//! Stores user preferences including:
//! - Timer cadence and session behaviour
//! - Terminal display options
//! - Per-category default colors
//! - The saved set to run when none is given
//!
//! Configuration is stored at `<data dir>/config.toml`.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use super::data_dir;
use crate::error::{ConfigError, Result};
use crate::timer::{is_hex_color, IntervalCategory, SessionOptions};

/// Session timing configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimerConfig {
    /// Milliseconds between ticks. Each tick counts as one second.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default = "default_true")]
    pub auto_start: bool,
    #[serde(default = "default_event_buffer")]
    pub event_buffer: usize,
}

/// Terminal display configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DisplayConfig {
    #[serde(default = "default_bar_width")]
    pub progress_bar_width: u32,
    /// Ring the terminal bell on every interval change.
    #[serde(default = "default_true")]
    pub bell_on_advance: bool,
    #[serde(default = "default_true")]
    pub color_output: bool,
}

/// Default color per interval category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColorsConfig {
    #[serde(default = "default_warmup_color")]
    pub warmup: String,
    #[serde(default = "default_intense_color")]
    pub intense: String,
    #[serde(default = "default_medium_color")]
    pub medium: String,
    #[serde(default = "default_cooldown_color")]
    pub cooldown: String,
    #[serde(default = "default_custom_color")]
    pub custom: String,
}

/// Application configuration.
///
/// Serialized to/from TOML at `<data dir>/config.toml`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Saved set id used by `run` when no source is given.
    #[serde(default)]
    pub default_set: Option<String>,
    #[serde(default)]
    pub timer: TimerConfig,
    #[serde(default)]
    pub display: DisplayConfig,
    #[serde(default)]
    pub colors: ColorsConfig,
}

fn default_tick_interval_ms() -> u64 {
    1000
}
fn default_event_buffer() -> usize {
    64
}
fn default_bar_width() -> u32 {
    30
}
fn default_true() -> bool {
    true
}
fn default_warmup_color() -> String {
    IntervalCategory::Warmup.default_color().into()
}
fn default_intense_color() -> String {
    IntervalCategory::Intense.default_color().into()
}
fn default_medium_color() -> String {
    IntervalCategory::Medium.default_color().into()
}
fn default_cooldown_color() -> String {
    IntervalCategory::Cooldown.default_color().into()
}
fn default_custom_color() -> String {
    IntervalCategory::Custom.default_color().into()
}

impl Default for TimerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: default_tick_interval_ms(),
            auto_start: true,
            event_buffer: default_event_buffer(),
        }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            progress_bar_width: default_bar_width(),
            bell_on_advance: true,
            color_output: true,
        }
    }
}

impl Default for ColorsConfig {
    fn default() -> Self {
        Self {
            warmup: default_warmup_color(),
            intense: default_intense_color(),
            medium: default_medium_color(),
            cooldown: default_cooldown_color(),
            custom: default_custom_color(),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            default_set: None,
            timer: TimerConfig::default(),
            display: DisplayConfig::default(),
            colors: ColorsConfig::default(),
        }
    }
}

impl ColorsConfig {
    pub fn for_category(&self, category: IntervalCategory) -> &str {
        match category {
            IntervalCategory::Warmup => &self.warmup,
            IntervalCategory::Intense => &self.intense,
            IntervalCategory::Medium => &self.medium,
            IntervalCategory::Cooldown => &self.cooldown,
            IntervalCategory::Custom => &self.custom,
        }
    }
}

impl Config {
    fn get_json_value_by_path<'a>(
        root: &'a serde_json::Value,
        key: &str,
    ) -> Option<&'a serde_json::Value> {
        if key.is_empty() {
            return None;
        }

        let mut current = root;
        for part in key.split('.') {
            current = current.get(part)?;
        }
        Some(current)
    }

    fn set_json_value_by_path(
        root: &mut serde_json::Value,
        key: &str,
        value: &str,
        optional: bool,
    ) -> Result<()> {
        let unknown = || ConfigError::UnknownKey(key.to_string());
        let invalid = |message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let mut parts = key.split('.').peekable();
        if parts.peek().is_none() || key.is_empty() {
            return Err(unknown().into());
        }

        let mut current = root;
        while let Some(part) = parts.next() {
            if parts.peek().is_some() {
                current = current.get_mut(part).ok_or_else(unknown)?;
                continue;
            }

            let obj = current.as_object_mut().ok_or_else(unknown)?;
            let existing = obj.get(part).ok_or_else(unknown)?;

            let clears = optional && (value.trim().is_empty() || value.eq_ignore_ascii_case("none"));
            let new_value = match existing {
                _ if clears => serde_json::Value::Null,
                serde_json::Value::Bool(_) => serde_json::Value::Bool(
                    value
                        .parse::<bool>()
                        .map_err(|_| invalid(format!("cannot parse '{value}' as bool")))?,
                ),
                serde_json::Value::Number(_) => value
                    .parse::<u64>()
                    .map(|n| serde_json::Value::Number(n.into()))
                    .map_err(|_| invalid(format!("cannot parse '{value}' as a whole number")))?,
                serde_json::Value::Object(_) | serde_json::Value::Array(_) => {
                    serde_json::from_str(value).map_err(|e| invalid(e.to_string()))?
                }
                _ => serde_json::Value::String(value.into()),
            };

            obj.insert(part.to_string(), new_value);
            return Ok(());
        }

        Err(unknown().into())
    }

    fn path() -> Result<PathBuf> {
        Ok(data_dir()?.join("config.toml"))
    }

    /// Load from the data directory, writing defaults if the file is missing.
    ///
    /// # Errors
    ///
    /// Returns an error if the config file exists but cannot be parsed,
    /// or if the default config cannot be written to disk.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::path()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        match std::fs::read_to_string(path) {
            Ok(content) => {
                let cfg: Config = toml::from_str(&content).map_err(|e| ConfigError::LoadFailed {
                    path: path.to_path_buf(),
                    message: e.to_string(),
                })?;
                cfg.validate()?;
                Ok(cfg)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                let cfg = Self::default();
                cfg.save_to(path)?;
                Ok(cfg)
            }
            Err(e) => Err(ConfigError::LoadFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            }
            .into()),
        }
    }

    /// Persist to the data directory.
    ///
    /// # Errors
    ///
    /// Returns an error if the config cannot be serialized or written to disk.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        let save_failed = |message: String| ConfigError::SaveFailed {
            path: path.to_path_buf(),
            message,
        };
        let content = toml::to_string_pretty(self).map_err(|e| save_failed(e.to_string()))?;
        std::fs::write(path, content).map_err(|e| save_failed(e.to_string()))?;
        Ok(())
    }

    /// Get a config value as string by dot-separated key.
    pub fn get(&self, key: &str) -> Option<String> {
        let json = serde_json::to_value(self).ok()?;
        let val = Self::get_json_value_by_path(&json, key)?;
        match val {
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }

    /// Set a config value by dot-separated key without saving.
    ///
    /// # Errors
    ///
    /// Returns an error if the key is unknown or the value does not fit.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let mut json = serde_json::to_value(&*self)?;
        // Keys that are unset by default take "" or "none" to clear them.
        let defaults = serde_json::to_value(Self::default())?;
        let optional =
            Self::get_json_value_by_path(&defaults, key).is_some_and(serde_json::Value::is_null);
        Self::set_json_value_by_path(&mut json, key, value, optional)?;
        let updated: Config = serde_json::from_value(json).map_err(|e| ConfigError::InvalidValue {
            key: key.to_string(),
            message: e.to_string(),
        })?;
        updated.validate()?;
        *self = updated;
        Ok(())
    }

    fn validate(&self) -> Result<()> {
        if self.timer.tick_interval_ms == 0 {
            return Err(ConfigError::InvalidValue {
                key: "timer.tick_interval_ms".into(),
                message: "must be greater than zero".into(),
            }
            .into());
        }
        for category in IntervalCategory::ALL {
            let color = self.colors.for_category(category);
            if !is_hex_color(color) {
                return Err(ConfigError::InvalidValue {
                    key: format!("colors.{category}"),
                    message: format!("'{color}' is not a #RRGGBB color"),
                }
                .into());
            }
        }
        Ok(())
    }

    pub fn session_options(&self) -> SessionOptions {
        SessionOptions {
            tick_interval: Duration::from_millis(self.timer.tick_interval_ms),
            event_buffer: self.timer.event_buffer,
        }
    }

    /// Load from disk, returning default on error.
    /// This is a convenience method that never fails.
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_roundtrip() {
        let cfg = Config::default();
        let toml_str = toml::to_string_pretty(&cfg).unwrap();
        let parsed: Config = toml::from_str(&toml_str).unwrap();
        assert_eq!(parsed, cfg);
        assert_eq!(parsed.timer.tick_interval_ms, 1000);
    }

    #[test]
    fn partial_file_fills_defaults() {
        let parsed: Config = toml::from_str("[timer]\nauto_start = false\n").unwrap();
        assert!(!parsed.timer.auto_start);
        assert_eq!(parsed.timer.event_buffer, 64);
        assert_eq!(parsed.colors.intense, "#EF4444");
    }

    #[test]
    fn get_dotted_key() {
        let cfg = Config::default();
        assert_eq!(cfg.get("timer.tick_interval_ms").as_deref(), Some("1000"));
        assert_eq!(cfg.get("colors.warmup").as_deref(), Some("#3B82F6"));
        assert_eq!(cfg.get("timer.nope"), None);
    }

    #[test]
    fn set_preserves_types() {
        let mut cfg = Config::default();
        cfg.set("display.bell_on_advance", "false").unwrap();
        cfg.set("timer.tick_interval_ms", "250").unwrap();
        cfg.set("default_set", "abc").unwrap();
        assert!(!cfg.display.bell_on_advance);
        assert_eq!(cfg.timer.tick_interval_ms, 250);
        assert_eq!(cfg.default_set.as_deref(), Some("abc"));
        assert_eq!(cfg.session_options().tick_interval, Duration::from_millis(250));
    }

    #[test]
    fn default_set_can_be_cleared() {
        let mut cfg = Config::default();
        cfg.set("default_set", "abc").unwrap();
        cfg.set("default_set", "none").unwrap();
        assert_eq!(cfg.default_set, None);

        cfg.set("default_set", "abc").unwrap();
        cfg.set("default_set", "").unwrap();
        assert_eq!(cfg.default_set, None);

        // Clearing only applies to keys that are unset by default.
        assert!(cfg.set("colors.custom", "").is_err());
    }

    #[test]
    fn set_rejects_bad_values() {
        let mut cfg = Config::default();
        assert!(cfg.set("timer.tick_interval_ms", "fast").is_err());
        assert!(cfg.set("timer.tick_interval_ms", "0").is_err());
        assert!(cfg.set("colors.intense", "red").is_err());
        assert!(cfg.set("unknown.key", "1").is_err());
        assert_eq!(cfg, Config::default());
    }

    #[test]
    fn load_writes_defaults_when_missing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let cfg = Config::load_from(&path).unwrap();
        assert_eq!(cfg, Config::default());
        assert!(path.exists());

        let mut changed = cfg.clone();
        changed.set("display.progress_bar_width", "10").unwrap();
        changed.save_to(&path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap().display.progress_bar_width, 10);
    }
}
