//! Engine configuration.
//!
//! Resolution order, highest priority first:
//! 1. Environment variables (`TEAMTASK_CAPACITY_MAX`, `TEAMTASK_ACTIVITY_LIMIT`)
//! 2. TOML config file, when a path is given
//! 3. Defaults
//!
//! # Invariants
//! - A returned `EngineConfig` has passed `validate()`.

use crate::model::task::TaskPriority;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_CAPACITY_MAX: &str = "TEAMTASK_CAPACITY_MAX";
pub const ENV_ACTIVITY_LIMIT: &str = "TEAMTASK_ACTIVITY_LIMIT";

/// Tunables for capacity checks and rebalance passes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// Smallest capacity accepted when adding a member.
    pub capacity_min: u32,
    /// Largest capacity accepted when adding a member.
    pub capacity_max: u32,
    /// Cap on activity records returned by a rebalance pass or feed.
    pub activity_display_limit: u32,
    /// Stop draining a member once its tracked load drops below capacity.
    ///
    /// Off by default: a pass drains every low/medium task while targets
    /// have room.
    pub stop_when_relieved: bool,
    /// Priority used when a create request omits one.
    pub default_priority: TaskPriority,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            capacity_min: 1,
            capacity_max: 50,
            activity_display_limit: 10,
            stop_when_relieved: false,
            default_priority: TaskPriority::Medium,
        }
    }
}

impl EngineConfig {
    /// Parses a TOML document; missing keys fall back to defaults.
    pub fn from_toml_str(contents: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(contents).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.capacity_min == 0 {
            return Err(ConfigError::Invalid(
                "capacity_min must be at least 1".to_string(),
            ));
        }
        if self.capacity_min > self.capacity_max {
            return Err(ConfigError::Invalid(format!(
                "capacity_min {} exceeds capacity_max {}",
                self.capacity_min, self.capacity_max
            )));
        }
        if self.activity_display_limit == 0 {
            return Err(ConfigError::Invalid(
                "activity_display_limit must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    pub fn capacity_in_bounds(&self, capacity: u32) -> bool {
        (self.capacity_min..=self.capacity_max).contains(&capacity)
    }

    /// Applies overrides read through `lookup`, then re-validates.
    pub fn apply_overrides(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        if let Some(value) = lookup(ENV_CAPACITY_MAX) {
            self.capacity_max = parse_override(ENV_CAPACITY_MAX, &value)?;
        }
        if let Some(value) = lookup(ENV_ACTIVITY_LIMIT) {
            self.activity_display_limit = parse_override(ENV_ACTIVITY_LIMIT, &value)?;
        }
        self.validate()
    }
}

/// Resolves configuration from an optional file plus process environment.
pub fn load_config(path: Option<&Path>) -> Result<EngineConfig, ConfigError> {
    let mut config = match path {
        Some(path) => {
            let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            EngineConfig::from_toml_str(&contents)?
        }
        None => EngineConfig::default(),
    };
    config.apply_overrides(|key| std::env::var(key).ok())?;
    Ok(config)
}

fn parse_override(key: &str, value: &str) -> Result<u32, ConfigError> {
    value
        .trim()
        .parse::<u32>()
        .map_err(|_| ConfigError::Invalid(format!("{key} must be a non-negative integer, got `{value}`")))
}

/// Configuration load/validation failure.
#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{load_config, ConfigError, EngineConfig, ENV_ACTIVITY_LIMIT, ENV_CAPACITY_MAX};
    use crate::model::task::TaskPriority;
    use std::io::Write;

    #[test]
    fn defaults_bound_capacity_to_one_through_fifty() {
        let config = EngineConfig::default();
        assert!(config.capacity_in_bounds(1));
        assert!(config.capacity_in_bounds(50));
        assert!(!config.capacity_in_bounds(0));
        assert!(!config.capacity_in_bounds(51));
        assert_eq!(config.activity_display_limit, 10);
    }

    #[test]
    fn partial_toml_keeps_defaults_for_missing_keys() {
        let config = EngineConfig::from_toml_str(
            "capacity_max = 5\ndefault_priority = \"low\"\n",
        )
        .unwrap();
        assert_eq!(config.capacity_max, 5);
        assert_eq!(config.capacity_min, 1);
        assert_eq!(config.default_priority, TaskPriority::Low);
        assert!(!config.stop_when_relieved);
    }

    #[test]
    fn inverted_bounds_are_rejected() {
        let err = EngineConfig::from_toml_str("capacity_min = 10\ncapacity_max = 5\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = EngineConfig::from_toml_str("capacity_max = \"lots\"").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn overrides_replace_file_values() {
        let mut config = EngineConfig::default();
        config
            .apply_overrides(|key| match key {
                ENV_CAPACITY_MAX => Some("5".to_string()),
                ENV_ACTIVITY_LIMIT => Some(" 3 ".to_string()),
                _ => None,
            })
            .unwrap();
        assert_eq!(config.capacity_max, 5);
        assert_eq!(config.activity_display_limit, 3);
    }

    #[test]
    fn non_numeric_override_is_rejected() {
        let mut config = EngineConfig::default();
        let err = config
            .apply_overrides(|key| (key == ENV_CAPACITY_MAX).then(|| "many".to_string()))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_CAPACITY_MAX));
    }

    #[test]
    fn load_config_reads_file_from_disk() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "stop_when_relieved = true").unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert!(config.stop_when_relieved);
    }

    #[test]
    fn load_config_reports_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = load_config(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
