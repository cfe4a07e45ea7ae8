//! Configuration loading and management
//!
//! Handles parsing of `taskbook.toml` configuration files. Every section is
//! optional; a missing file yields the full default configuration.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Default config file name, looked up in the storage root.
pub const CONFIG_FILENAME: &str = "taskbook.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Storage configuration
    #[serde(default)]
    pub storage: StorageConfig,

    /// Category configuration
    #[serde(default)]
    pub categories: CategoriesConfig,

    /// Event output configuration
    #[serde(default)]
    pub events: EventsConfig,
}

/// Storage-related configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Override for the storage root directory; platform data dir when unset
    #[serde(default)]
    pub root: Option<PathBuf>,
}

/// Category-related configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoriesConfig {
    /// Labels seeded for a principal with no persisted categories
    #[serde(default = "default_category_seed")]
    pub defaults: Vec<String>,
}

fn default_category_seed() -> Vec<String> {
    vec![
        "Personal".to_string(),
        "Work".to_string(),
        "Shopping".to_string(),
    ]
}

impl Default for CategoriesConfig {
    fn default() -> Self {
        Self {
            defaults: default_category_seed(),
        }
    }
}

/// Event output configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventsConfig {
    /// Event destination: `-` for stdout, otherwise a JSONL file path
    #[serde(default)]
    pub destination: Option<String>,
}

impl Config {
    /// Load configuration from an explicit file path.
    ///
    /// A missing file yields `Config::default()`; a present but malformed
    /// file is an error.
    pub fn load_from_path(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration from `taskbook.toml` under the given directory.
    pub fn load_from_dir(dir: &Path) -> Result<Self> {
        Self::load_from_path(&dir.join(CONFIG_FILENAME))
    }
}
