//! Server configuration read from the environment.
//!
//! | Variable          | Default                   |
//! |-------------------|---------------------------|
//! | `HOST`            | `0.0.0.0`                 |
//! | `PORT`            | `3000`                    |
//! | `TASKS_STORAGE`   | `file` (`memory`, `redis`)|
//! | `TASKS_DB_PATH`   | `db.json`                 |
//! | `REDIS_URL`       | `redis://127.0.0.1:6379`  |
//! | `TASKS_REDIS_KEY` | `taskflow:tasks`          |
//! | `STATIC_DIR`      | `frontend/dist`           |

use std::num::ParseIntError;
use std::path::PathBuf;
use std::str::FromStr;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid TASKS_STORAGE value '{0}' (expected file, memory or redis)")]
    UnknownStorage(String),

    #[error("invalid PORT value '{value}': {source}")]
    InvalidPort {
        value: String,
        #[source]
        source: ParseIntError,
    },
}

/// Which backing store holds the task document.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageMode {
    #[default]
    File,
    /// Lives only as long as the process. Meant for hosts without a
    /// writable disk; every restart starts from an empty list.
    Memory,
    Redis,
}

impl FromStr for StorageMode {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "file" => Ok(Self::File),
            "memory" | "in_memory" => Ok(Self::Memory),
            "redis" => Ok(Self::Redis),
            _ => Err(ConfigError::UnknownStorage(value.to_string())),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub storage: StorageMode,
    pub db_path: PathBuf,
    pub redis_url: String,
    pub redis_key: String,
    pub static_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            storage: StorageMode::default(),
            db_path: PathBuf::from("db.json"),
            redis_url: "redis://127.0.0.1:6379".to_string(),
            redis_key: "taskflow:tasks".to_string(),
            static_dir: PathBuf::from("frontend/dist"),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable source. Blank values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };
        let defaults = Self::default();

        let port = match get("PORT") {
            Some(value) => value
                .parse()
                .map_err(|source| ConfigError::InvalidPort { value, source })?,
            None => defaults.port,
        };

        let storage = match get("TASKS_STORAGE") {
            Some(value) => value.parse()?,
            None => defaults.storage,
        };

        Ok(Self {
            host: get("HOST").unwrap_or(defaults.host),
            port,
            storage,
            db_path: get("TASKS_DB_PATH").map_or(defaults.db_path, PathBuf::from),
            redis_url: get("REDIS_URL").unwrap_or(defaults.redis_url),
            redis_key: get("TASKS_REDIS_KEY").unwrap_or(defaults.redis_key),
            static_dir: get("STATIC_DIR").map_or(defaults.static_dir, PathBuf::from),
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
