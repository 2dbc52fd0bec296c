//! Configuration management with layered hierarchy

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::core::position::Floor;
use crate::core::store::DEFAULT_DB_FILE;

/// Default catalog file name
pub const DEFAULT_CATALOG_FILE: &str = "produtos.xlsx";

/// Local config file looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "camara.yaml";

#[derive(Debug, Error, Diagnostic)]
pub enum ConfigError {
    #[error("invalid catalog delimiter {0:?}")]
    #[diagnostic(
        code(camara::config::delimiter),
        help("the delimiter must be a single ASCII character such as ',' or ';'")
    )]
    InvalidDelimiter(String),

    #[error("invalid floor {0} in configuration")]
    #[diagnostic(code(camara::config::floor), help("floor must be 1 or 2"))]
    InvalidFloor(u8),
}

/// Camara configuration with layered hierarchy
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// SQLite database file
    pub database: Option<PathBuf>,

    /// Catalog spreadsheet (`.xlsx` workbook or delimited text)
    pub catalog: Option<PathBuf>,

    /// Catalog field delimiter
    pub delimiter: Option<String>,

    /// Floor shown first by the map and interactive mode
    pub floor: Option<u8>,
}

impl Config {
    /// Load configuration from all sources, merging in priority order
    pub fn load() -> Self {
        let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
        Self::load_from(&cwd)
    }

    /// Same as [`Config::load`] with `dir` as the working directory
    pub fn load_from(dir: &Path) -> Self {
        let mut config = Config::default();

        // 1. Built-in defaults (applied by the accessors)

        // 2. Global user config (~/.config/camara/config.yaml)
        if let Some(global_path) = Self::global_config_path() {
            if let Some(global) = Self::read_file(&global_path) {
                config.merge(global);
            }
        }

        // 3. Local config (./camara.yaml)
        if let Some(local) = Self::read_file(&dir.join(LOCAL_CONFIG_FILE)) {
            config.merge(local);
        }

        // 4. Environment variables and command-line flags are layered on
        //    top by the CLI (`GlobalOpts::config`)

        config
    }

    fn read_file(path: &Path) -> Option<Config> {
        if !path.exists() {
            return None;
        }
        let contents = std::fs::read_to_string(path).ok()?;
        match serde_yml::from_str::<Config>(&contents) {
            Ok(config) => Some(config),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "ignoring unreadable config file");
                None
            }
        }
    }

    /// Get the path to the global config file
    pub fn global_config_path() -> Option<PathBuf> {
        directories::ProjectDirs::from("", "", "camara")
            .map(|dirs| dirs.config_dir().join("config.yaml"))
    }

    /// Merge another config into this one (other takes precedence)
    pub fn merge(&mut self, other: Config) {
        if other.database.is_some() {
            self.database = other.database;
        }
        if other.catalog.is_some() {
            self.catalog = other.catalog;
        }
        if other.delimiter.is_some() {
            self.delimiter = other.delimiter;
        }
        if other.floor.is_some() {
            self.floor = other.floor;
        }
    }

    pub fn database_path(&self) -> PathBuf {
        self.database
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_FILE))
    }

    pub fn catalog_path(&self) -> PathBuf {
        self.catalog
            .clone()
            .unwrap_or_else(|| PathBuf::from(DEFAULT_CATALOG_FILE))
    }

    /// Catalog delimiter as a byte; `\t` and `tab` mean a tab
    pub fn delimiter(&self) -> Result<u8, ConfigError> {
        let Some(raw) = self.delimiter.as_deref() else {
            return Ok(b',');
        };
        match raw {
            "\\t" | "tab" | "\t" => Ok(b'\t'),
            s if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
            other => Err(ConfigError::InvalidDelimiter(other.to_string())),
        }
    }

    pub fn floor(&self) -> Result<Floor, ConfigError> {
        match self.floor {
            None => Ok(Floor::default()),
            Some(n) => Floor::from_number(n).ok_or(ConfigError::InvalidFloor(n)),
        }
    }
}
