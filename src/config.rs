//! Configuration Module
//! TOML configuration with defaults, merge and validation.

use crate::data::{Category, QueryParams, SourceSchema};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const APP_NAME: &str = "collision_dashboard";
pub const DEFAULT_MAX_ROWS: usize = 100_000;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Could not determine config directory")]
    NoConfigDir,
    #[error("Failed to read config file at {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("Failed to parse config file at {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
    #[error("Config file already exists at {0}. Use --force to overwrite.")]
    AlreadyExists(PathBuf),
    #[error("Failed to write config file: {0}")]
    Write(#[from] std::io::Error),
}

/// Manages the config directory and config file operations
#[derive(Clone)]
pub struct ConfigManager {
    config_dir: PathBuf,
}

impl ConfigManager {
    /// Create a ConfigManager with a custom config directory (primarily for testing)
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    pub fn new(app_name: &str) -> Result<Self, ConfigError> {
        let config_dir = dirs::config_dir()
            .ok_or(ConfigError::NoConfigDir)?
            .join(app_name);
        Ok(Self { config_dir })
    }

    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    pub fn config_file(&self) -> PathBuf {
        self.config_dir.join("config.toml")
    }

    /// Write the default configuration template.
    pub fn write_default_config(&self, force: bool) -> Result<PathBuf, ConfigError> {
        let path = self.config_file();
        if path.exists() && !force {
            return Err(ConfigError::AlreadyExists(path));
        }
        std::fs::create_dir_all(&self.config_dir)?;
        std::fs::write(&path, DEFAULT_CONFIG_TEMPLATE)?;
        Ok(path)
    }
}

/// Complete application configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub version: String,
    pub dataset: DatasetConfig,
    pub columns: SourceSchema,
    pub defaults: FilterDefaults,
    pub logging: LoggingConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            version: "0.1".to_string(),
            dataset: DatasetConfig::default(),
            columns: SourceSchema::default(),
            defaults: FilterDefaults::default(),
            logging: LoggingConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatasetConfig {
    pub path: Option<PathBuf>,
    pub max_rows: usize,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            path: None,
            max_rows: DEFAULT_MAX_ROWS,
        }
    }
}

/// Filter values the dashboard starts with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct FilterDefaults {
    pub injury_threshold: u32,
    pub hour: u32,
    pub category: Category,
    pub show_raw: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// `tracing_subscriber::EnvFilter` directive; `RUST_LOG` wins when set.
    pub filter: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
        }
    }
}

impl AppConfig {
    /// Load defaults overlaid with the user config file, if any.
    ///
    /// An explicit `path` must exist; the per-user file is optional, as is
    /// the config directory itself. Call [`AppConfig::validate`] once command
    /// line overrides have been applied.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let mut config = AppConfig::default();

        let user_config = match path {
            Some(path) => Some(Self::from_file(path)?),
            None => Self::user_file(ConfigManager::new(APP_NAME))?,
        };
        if let Some(user_config) = user_config {
            config.merge(user_config);
        }

        Ok(config)
    }

    /// Read the per-user file; no config directory counts as no file.
    fn user_file(
        manager: Result<ConfigManager, ConfigError>,
    ) -> Result<Option<Self>, ConfigError> {
        let manager = match manager {
            Ok(manager) => manager,
            Err(ConfigError::NoConfigDir) => return Ok(None),
            Err(e) => return Err(e),
        };
        let file = manager.config_file();
        if file.exists() {
            Ok(Some(Self::from_file(&file)?))
        } else {
            Ok(None)
        }
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: AppConfig) {
        let default = AppConfig::default();
        if other.version != default.version {
            self.version = other.version;
        }
        self.dataset.merge(other.dataset);
        self.columns.merge(other.columns);
        self.defaults.merge(other.defaults);
        self.logging.merge(other.logging);
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.dataset.max_rows == 0 {
            return Err(ConfigError::Invalid(
                "dataset.max_rows must be positive".to_string(),
            ));
        }
        if let Some(empty) = self.columns.required().iter().position(|c| c.trim().is_empty()) {
            return Err(ConfigError::Invalid(format!(
                "columns entry {} is empty",
                empty + 1
            )));
        }
        self.defaults
            .to_params()
            .map_err(|e| ConfigError::Invalid(format!("defaults: {}", e)))?;
        Ok(())
    }
}

impl DatasetConfig {
    pub fn merge(&mut self, other: Self) {
        if other.path.is_some() {
            self.path = other.path;
        }
        if other.max_rows != DEFAULT_MAX_ROWS {
            self.max_rows = other.max_rows;
        }
    }
}

impl SourceSchema {
    pub fn merge(&mut self, other: Self) {
        let default = SourceSchema::default();
        let fields = [
            (&mut self.crash_date, other.crash_date, &default.crash_date),
            (&mut self.crash_time, other.crash_time, &default.crash_time),
            (&mut self.latitude, other.latitude, &default.latitude),
            (&mut self.longitude, other.longitude, &default.longitude),
            (
                &mut self.injured_persons,
                other.injured_persons,
                &default.injured_persons,
            ),
            (
                &mut self.injured_pedestrians,
                other.injured_pedestrians,
                &default.injured_pedestrians,
            ),
            (
                &mut self.injured_cyclists,
                other.injured_cyclists,
                &default.injured_cyclists,
            ),
            (
                &mut self.injured_motorists,
                other.injured_motorists,
                &default.injured_motorists,
            ),
            (
                &mut self.on_street_name,
                other.on_street_name,
                &default.on_street_name,
            ),
        ];
        for (current, incoming, default) in fields {
            if &incoming != default {
                *current = incoming;
            }
        }
    }
}

impl FilterDefaults {
    pub fn merge(&mut self, other: Self) {
        let default = FilterDefaults::default();
        if other.injury_threshold != default.injury_threshold {
            self.injury_threshold = other.injury_threshold;
        }
        if other.hour != default.hour {
            self.hour = other.hour;
        }
        if other.category != default.category {
            self.category = other.category;
        }
        if other.show_raw != default.show_raw {
            self.show_raw = other.show_raw;
        }
    }

    pub fn to_params(&self) -> Result<QueryParams, crate::data::QueryError> {
        QueryParams::new(self.injury_threshold, self.hour, self.category, self.show_raw)
    }
}

impl LoggingConfig {
    pub fn merge(&mut self, other: Self) {
        if other.filter != LoggingConfig::default().filter {
            self.filter = other.filter;
        }
    }
}

pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# collision_dashboard configuration
version = "0.1"

[dataset]
# Collision CSV to open at startup
# path = "data/Motor_Vehicle_Collisions_-_Crashes.csv"
# Rows read from the source before rows without coordinates are dropped
max_rows = 100000

[columns]
# Source column names (matched case-insensitively)
crash_date = "CRASH_DATE"
crash_time = "CRASH_TIME"
latitude = "LATITUDE"
longitude = "LONGITUDE"
injured_persons = "INJURED_PERSONS"
injured_pedestrians = "INJURED_PEDESTRIANS"
injured_cyclists = "INJURED_CYCLISTS"
injured_motorists = "INJURED_MOTORISTS"
on_street_name = "ON_STREET_NAME"

[defaults]
# 0-19
injury_threshold = 0
# 0-23
hour = 0
# pedestrians | cyclists | motorists
category = "pedestrians"
show_raw = false

[logging]
# RUST_LOG takes precedence
filter = "info"
"#;
