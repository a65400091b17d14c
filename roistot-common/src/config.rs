//! Configuration loading
//!
//! Every setting is resolved with the same priority order:
//! 1. Command-line argument (highest priority)
//! 2. Environment variable
//! 3. TOML config file
//! 4. Compiled default (fallback)

use crate::db::MAX_BIND_PARAMETERS;
use crate::{Error, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Largest number of rows sent to the store in one bulk insert
pub const DEFAULT_BULK_CREATE_SIZE: usize = 100;

/// Upper bound for the bulk create size; `villains_in_stories` binds 8 values per row
pub const MAX_BULK_CREATE_SIZE: usize = MAX_BIND_PARAMETERS / 8;

pub const ENV_DATABASE: &str = "ROISTOT_DATABASE";
pub const ENV_SALT: &str = "ROISTOT_SALT";
pub const ENV_BULK_SIZE: &str = "ROISTOT_BULK_SIZE";
pub const ENV_LOG_LEVEL: &str = "ROISTOT_LOG_LEVEL";

/// Contents of `config.toml`; every key is optional
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TomlConfig {
    pub database_path: Option<PathBuf>,
    pub hash_salt: Option<String>,
    pub max_bulk_create_size: Option<usize>,
    pub log_level: Option<String>,
    pub delimiter: Option<String>,
}

impl TomlConfig {
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::Config(format!("Invalid config file: {}", e)))
    }

    /// Load the platform config file, if there is a usable one
    ///
    /// A missing or malformed file is not fatal: the caller falls back to
    /// environment variables and compiled defaults.
    pub fn load() -> Option<Self> {
        let path = match config_file_path() {
            Ok(path) => path,
            Err(_) => return None,
        };
        Self::load_from(&path)
    }

    pub fn load_from(path: &Path) -> Option<Self> {
        let content = match std::fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Config file unreadable, using defaults");
                return None;
            }
        };
        match Self::from_toml_str(&content) {
            Ok(config) => Some(config),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Config file ignored");
                None
            }
        }
    }
}

/// Values given on the command line
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub database_path: Option<PathBuf>,
    pub hash_salt: Option<String>,
    pub max_bulk_create_size: Option<usize>,
    pub log_level: Option<String>,
    pub delimiter: Option<char>,
}

/// Fully resolved importer configuration
#[derive(Debug, Clone)]
pub struct ImporterConfig {
    pub database_path: PathBuf,
    /// Salt appended to every content hash input
    pub hash_salt: String,
    pub max_bulk_create_size: usize,
    pub log_level: String,
    /// Field delimiter of the input table file
    pub delimiter: u8,
}

impl ImporterConfig {
    /// Resolve from overrides, the environment and the platform config file
    pub fn load(overrides: ConfigOverrides) -> Result<Self> {
        Self::resolve(overrides, TomlConfig::load().unwrap_or_default())
    }

    /// Resolve from overrides, the environment and an already parsed TOML config
    pub fn resolve(overrides: ConfigOverrides, file: TomlConfig) -> Result<Self> {
        let database_path = overrides
            .database_path
            .or_else(|| env_value(ENV_DATABASE).map(PathBuf::from))
            .or(file.database_path)
            .unwrap_or_else(default_database_path);

        let hash_salt = overrides
            .hash_salt
            .or_else(|| env_value(ENV_SALT))
            .or(file.hash_salt)
            .unwrap_or_default();

        let max_bulk_create_size = match overrides.max_bulk_create_size {
            Some(size) => size,
            None => match env_value(ENV_BULK_SIZE) {
                Some(raw) => raw.trim().parse::<usize>().map_err(|_| {
                    Error::Config(format!("{} must be a positive integer, got '{}'", ENV_BULK_SIZE, raw))
                })?,
                None => file.max_bulk_create_size.unwrap_or(DEFAULT_BULK_CREATE_SIZE),
            },
        };
        if max_bulk_create_size == 0 {
            return Err(Error::Config("Bulk create size must be at least 1".to_string()));
        }
        if max_bulk_create_size > MAX_BULK_CREATE_SIZE {
            return Err(Error::Config(format!(
                "Bulk create size must be at most {}, got {}",
                MAX_BULK_CREATE_SIZE, max_bulk_create_size
            )));
        }

        let log_level = overrides
            .log_level
            .or_else(|| env_value(ENV_LOG_LEVEL))
            .or(file.log_level)
            .unwrap_or_else(|| "info".to_string());

        let delimiter = match overrides.delimiter {
            Some(c) => delimiter_byte(c)?,
            None => match file.delimiter.as_deref() {
                Some(raw) => parse_delimiter(raw)?,
                None => b',',
            },
        };

        Ok(Self {
            database_path,
            hash_salt,
            max_bulk_create_size,
            log_level,
            delimiter,
        })
    }
}

fn env_value(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

fn parse_delimiter(raw: &str) -> Result<u8> {
    if raw == "\\t" {
        return Ok(b'\t');
    }
    let mut chars = raw.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => delimiter_byte(c),
        _ => Err(Error::Config(format!("Delimiter must be a single character, got '{}'", raw))),
    }
}

fn delimiter_byte(c: char) -> Result<u8> {
    if c.is_ascii() {
        Ok(c as u8)
    } else {
        Err(Error::Config(format!("Delimiter must be ASCII, got '{}'", c)))
    }
}

/// Get configuration file path for the platform
fn config_file_path() -> Result<PathBuf> {
    if cfg!(target_os = "linux") {
        // Try ~/.config/roistot/config.toml first, then /etc/roistot/config.toml
        let user_config = dirs::config_dir().map(|d| d.join("roistot").join("config.toml"));
        if let Some(path) = user_config {
            if path.exists() {
                return Ok(path);
            }
        }
        let system_config = PathBuf::from("/etc/roistot/config.toml");
        if system_config.exists() {
            return Ok(system_config);
        }
        return Err(Error::Config("No config file found".to_string()));
    }

    let path = dirs::config_dir()
        .map(|d| d.join("roistot").join("config.toml"))
        .ok_or_else(|| Error::Config("Could not determine config directory".to_string()))?;
    if path.exists() {
        Ok(path)
    } else {
        Err(Error::Config(format!("Config file not found: {:?}", path)))
    }
}

/// OS-dependent default database location
pub fn default_database_path() -> PathBuf {
    dirs::data_local_dir()
        .map(|d| d.join("roistot"))
        .unwrap_or_else(|| PathBuf::from("./roistot_data"))
        .join("roistot.db")
}
