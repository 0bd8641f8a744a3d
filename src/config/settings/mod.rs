
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable overriding the configuration directory
pub const HOME_ENV_VAR: &str = "ARTICLE_SEARCH_HOME";

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Config {
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(skip)]
    pub base_dir: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct SearchConfig {
    /// Number of nearest documents returned per query
    pub neighbors: usize,
    /// Terms must appear in at least this many documents to enter the vocabulary
    pub min_document_frequency: usize,
}

impl Default for SearchConfig {
    #[inline]
    fn default() -> Self {
        Self {
            neighbors: 5,
            min_document_frequency: 2,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DatabaseConfig {
    pub max_connections: u32,
}

impl Default for DatabaseConfig {
    #[inline]
    fn default() -> Self {
        Self {
            max_connections: 10,
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration directory not found or could not be created")]
    DirectoryError,
    #[error("Invalid neighbor count: {0} (must be between 1 and 100)")]
    InvalidNeighbors(usize),
    #[error("Invalid minimum document frequency: {0} (must be between 1 and 100)")]
    InvalidMinDocumentFrequency(usize),
    #[error("Invalid max connections: {0} (must be between 1 and 64)")]
    InvalidMaxConnections(u32),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("TOML parsing error: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl Config {
    /// Load the configuration from the default configuration directory
    #[inline]
    pub fn load() -> Result<Self> {
        let config_dir = Self::config_dir()?;
        Self::load_from(config_dir)
    }

    #[inline]
    pub fn load_from<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join("config.toml");

        if !config_path.exists() {
            return Ok(Self {
                base_dir: config_dir.as_ref().to_path_buf(),
                ..Self::default()
            });
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let mut config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))?;
        config.base_dir = config_dir.as_ref().to_path_buf();

        config
            .validate()
            .with_context(|| "Configuration validation failed")?;

        Ok(config)
    }

    #[inline]
    pub fn save(&self) -> Result<()> {
        self.validate()
            .context("Configuration validation failed before saving")?;

        let config_dir = self.get_base_dir();

        fs::create_dir_all(config_dir).with_context(|| {
            format!(
                "Failed to create config directory: {}",
                config_dir.display()
            )
        })?;

        let config_path = self.config_file_path();
        let content = toml::to_string_pretty(self).context("Failed to serialize config to TOML")?;

        fs::write(&config_path, content)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// Resolve the configuration directory, honoring `ARTICLE_SEARCH_HOME`
    #[inline]
    pub fn config_dir() -> Result<PathBuf, ConfigError> {
        if let Some(dir) = std::env::var_os(HOME_ENV_VAR).filter(|dir| !dir.is_empty()) {
            return Ok(PathBuf::from(dir));
        }

        dirs::home_dir()
            .map(|home| home.join(".article-search"))
            .or_else(|| dirs::data_dir().map(|data| data.join("article-search")))
            .ok_or(ConfigError::DirectoryError)
    }

    /// Get the base directory for the application
    #[inline]
    pub fn get_base_dir(&self) -> &Path {
        &self.base_dir
    }

    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.search.validate()?;
        self.database.validate()?;
        Ok(())
    }

    #[inline]
    pub fn config_file_path(&self) -> PathBuf {
        self.get_base_dir().join("config.toml")
    }

    /// Get the path for the SQLite article store
    #[inline]
    pub fn database_path(&self) -> PathBuf {
        self.get_base_dir().join("articles.db")
    }
}

impl SearchConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=100).contains(&self.neighbors) {
            return Err(ConfigError::InvalidNeighbors(self.neighbors));
        }

        if !(1..=100).contains(&self.min_document_frequency) {
            return Err(ConfigError::InvalidMinDocumentFrequency(
                self.min_document_frequency,
            ));
        }

        Ok(())
    }

    #[inline]
    pub fn set_neighbors(&mut self, neighbors: usize) -> Result<(), ConfigError> {
        if !(1..=100).contains(&neighbors) {
            return Err(ConfigError::InvalidNeighbors(neighbors));
        }
        self.neighbors = neighbors;
        Ok(())
    }

    #[inline]
    pub fn set_min_document_frequency(&mut self, min_df: usize) -> Result<(), ConfigError> {
        if !(1..=100).contains(&min_df) {
            return Err(ConfigError::InvalidMinDocumentFrequency(min_df));
        }
        self.min_document_frequency = min_df;
        Ok(())
    }
}

impl DatabaseConfig {
    #[inline]
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(1..=64).contains(&self.max_connections) {
            return Err(ConfigError::InvalidMaxConnections(self.max_connections));
        }
        Ok(())
    }

    #[inline]
    pub fn set_max_connections(&mut self, max_connections: u32) -> Result<(), ConfigError> {
        if !(1..=64).contains(&max_connections) {
            return Err(ConfigError::InvalidMaxConnections(max_connections));
        }
        self.max_connections = max_connections;
        Ok(())
    }
}
