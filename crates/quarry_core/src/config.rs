//! Search configuration loaded from JSON.
//!
//! # Invariants
//! - Missing fields fall back to [`QuarryConfig::default`].
//! - Unknown fields are rejected.
//! - `default_limit` is never zero after [`QuarryConfig::validate`].

use crate::guard::AllowList;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

/// Page size used when a search does not call `limit`.
pub const DEFAULT_LIMIT: u64 = 10;

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config json: {err}"),
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

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

/// Allow lists, paging defaults and logging settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QuarryConfig {
    /// Permitted tables; empty or `["*"]` means unrestricted.
    pub allowed_tables: Vec<String>,
    /// Permitted columns; empty or `["*"]` means unrestricted.
    pub allowed_columns: Vec<String>,
    pub default_limit: u64,
    pub log_level: Option<String>,
    /// Absolute directory for rolling log files.
    pub log_dir: Option<String>,
}

impl Default for QuarryConfig {
    fn default() -> Self {
        Self {
            allowed_tables: Vec::new(),
            allowed_columns: Vec::new(),
            default_limit: DEFAULT_LIMIT,
            log_level: None,
            log_dir: None,
        }
    }
}

impl QuarryConfig {
    /// Parses and validates a JSON document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.default_limit == 0 {
            return Err(ConfigError::Invalid(
                "default_limit must be greater than zero".to_string(),
            ));
        }
        if let Some(dir) = self.log_dir.as_deref() {
            if !Path::new(dir.trim()).is_absolute() {
                return Err(ConfigError::Invalid(format!(
                    "log_dir must be an absolute path, got `{dir}`"
                )));
            }
        }
        Ok(())
    }

    pub fn table_allow_list(&self) -> AllowList {
        AllowList::from_names(&self.allowed_tables)
    }

    pub fn column_allow_list(&self) -> AllowList {
        AllowList::from_names(&self.allowed_columns)
    }

    /// Replaces the logging settings that are given; `None` keeps the
    /// configured value.
    pub fn override_logging(&mut self, log_dir: Option<String>, log_level: Option<String>) {
        if log_dir.is_some() {
            self.log_dir = log_dir;
        }
        if log_level.is_some() {
            self.log_level = log_level;
        }
    }
}
