//! Application configuration: where the SQLite store lives

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use serde::Deserialize;

/// Resolved runtime configuration
#[derive(Debug, Clone)]
pub struct Config {
    pub database_path: PathBuf,
}

/// On-disk configuration file; every field is optional
#[derive(Debug, Default, Deserialize)]
struct ConfigFile {
    database_path: Option<PathBuf>,
}

impl Config {
    /// Resolve configuration, in precedence order: explicit override, the
    /// INITSYNC_DB environment variable, config.toml, platform default.
    pub fn load(db_override: Option<PathBuf>) -> Result<Self> {
        if let Some(path) = db_override {
            return Ok(Self {
                database_path: path,
            });
        }

        if let Ok(path) = std::env::var("INITSYNC_DB") {
            return Ok(Self {
                database_path: PathBuf::from(path),
            });
        }

        let file = read_config_file()?;
        let database_path = match file.database_path {
            Some(path) => path,
            None => default_database_path()?,
        };

        Ok(Self { database_path })
    }
}

fn read_config_file() -> Result<ConfigFile> {
    let Some(config_dir) = dirs::config_dir() else {
        return Ok(ConfigFile::default());
    };

    let path = config_dir.join("initsync").join("config.toml");
    if !path.exists() {
        return Ok(ConfigFile::default());
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file: {}", path.display()))?;
    toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {}", path.display()))
}

fn default_database_path() -> Result<PathBuf> {
    let data_dir = dirs::data_dir().context("Could not determine platform data directory")?;
    Ok(data_dir.join("initsync").join("initsync.db"))
}
