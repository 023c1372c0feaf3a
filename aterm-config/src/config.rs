//! Top-level `Config` and its persistence.
//!
//! The config lives at `~/.config/aterm/config.yaml` and is written
//! atomically (temp file + rename). Only the saved layouts are persisted;
//! runtime session state never reaches this file.

use crate::error::ConfigError;
use crate::profile::{Profile, default_profiles};
use crate::project::Project;
use crate::timing::{IoTiming, NotificationConfig, StatusTiming};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// Log level for the debug log file
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// No logging (log file not created)
    Off,
    /// Errors only
    Error,
    /// Warnings and errors
    #[default]
    Warn,
    /// Informational messages
    Info,
    /// Debug messages
    Debug,
    /// Most verbose
    Trace,
}

impl LogLevel {
    /// Convert to the `log` crate's level filter
    pub fn to_level_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Off => log::LevelFilter::Off,
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_profiles")]
    pub profiles: Vec<Profile>,

    #[serde(default)]
    pub projects: Vec<Project>,

    #[serde(default)]
    pub status: StatusTiming,

    #[serde(default)]
    pub io: IoTiming,

    #[serde(default)]
    pub notifications: NotificationConfig,

    #[serde(default)]
    pub log_level: LogLevel,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            profiles: default_profiles(),
            projects: Vec::new(),
            status: StatusTiming::default(),
            io: IoTiming::default(),
            notifications: NotificationConfig::default(),
            log_level: LogLevel::default(),
        }
    }
}

impl Config {
    /// Directory holding the config file
    pub fn config_dir() -> PathBuf {
        // Use XDG convention on all platforms: ~/.config/aterm
        if let Some(home_dir) = dirs::home_dir() {
            home_dir.join(".config").join("aterm")
        } else {
            PathBuf::from(".")
        }
    }

    /// Default config file path
    pub fn config_path() -> PathBuf {
        Self::config_dir().join("config.yaml")
    }

    /// Load configuration from the default path, creating it if missing
    pub fn load() -> anyhow::Result<Self> {
        Ok(Self::load_from(&Self::config_path())?)
    }

    /// Load configuration from a specific file.
    ///
    /// A missing file yields the default config, which is written out so
    /// the user has something to edit.
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            log::info!("Config file not found, creating default at {:?}", path);
            let config = Self::default();
            if let Err(e) = config.save_to(path) {
                log::error!("Failed to save default config: {}", e);
                return Err(e);
            }
            return Ok(config);
        }

        log::info!("Loading existing config from {:?}", path);
        let contents = fs::read_to_string(path)?;
        let config: Config = if contents.trim().is_empty() {
            Self::default()
        } else {
            serde_yaml_ng::from_str(&contents)?
        };
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to the default path
    pub fn save(&self) -> anyhow::Result<()> {
        Ok(self.save_to(&Self::config_path())?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<(), ConfigError> {
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let yaml = serde_yaml_ng::to_string(self)?;

        // Atomic save: write to temp file then rename to prevent corruption on crash
        let temp_path = path.with_extension("yaml.tmp");
        fs::write(&temp_path, &yaml)?;
        fs::rename(&temp_path, path)?;

        log::info!("Saved config ({} projects) to {:?}", self.projects.len(), path);
        Ok(())
    }

    /// Check every project's saved layouts and id uniqueness
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut project_ids = std::collections::HashSet::new();
        for project in &self.projects {
            if !project_ids.insert(project.id.as_str()) {
                return Err(ConfigError::Validation(format!(
                    "duplicate project id '{}'",
                    project.id
                )));
            }
            for layout in &project.layouts {
                layout.validate().map_err(|e| match e {
                    ConfigError::Validation(msg) => {
                        ConfigError::Validation(format!("project '{}': {}", project.name, msg))
                    }
                    other => other,
                })?;
            }
        }
        Ok(())
    }

    /// Look up a profile by id
    pub fn profile(&self, id: &str) -> Option<&Profile> {
        self.profiles.iter().find(|p| p.id == id)
    }

    /// Look up a project by id
    pub fn project(&self, id: &str) -> Option<&Project> {
        self.projects.iter().find(|p| p.id == id)
    }

    /// Look up a project by id for modification
    pub fn project_mut(&mut self, id: &str) -> Option<&mut Project> {
        self.projects.iter_mut().find(|p| p.id == id)
    }
}
