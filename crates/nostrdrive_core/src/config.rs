//! TOML configuration for stores, logging and member kind policy.
//!
//! # Invariants
//! - `DriveConfig::default()` passes `validate()`.
//! - Loaders validate before returning.

use crate::logging::{default_log_level, normalize_level};
use crate::model::coordinate::is_addressable_kind;
use crate::validation::kind::KindValidator;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(toml::de::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config: {err}"),
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

impl From<toml::de::Error> for ConfigError {
    fn from(value: toml::de::Error) -> Self {
        Self::Parse(value)
    }
}

/// Top-level configuration file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DriveConfig {
    pub store: StoreConfig,
    pub logging: LoggingConfig,
    pub kinds: KindsConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StoreConfig {
    /// SQLite database file. `None` selects an in-memory store.
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingConfig {
    pub level: String,
    /// Log directory. `None` leaves logging disabled.
    pub dir: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level().to_string(),
            dir: None,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct KindsConfig {
    /// Also admit folders as folder members.
    pub allow_folder_nesting: bool,
    /// Explicit allow-list, replacing the standard one.
    pub allowed: Option<Vec<u32>>,
}

impl DriveConfig {
    /// Parses and validates a TOML document.
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    /// Checks values serde cannot express.
    ///
    /// # Errors
    /// - Unknown log level.
    /// - Relative store or log path.
    /// - Empty allow-list, or an allowed kind outside 30000..=39999.
    pub fn validate(&self) -> Result<(), ConfigError> {
        normalize_level(&self.logging.level)
            .map_err(|err| ConfigError::Invalid(err.to_string()))?;
        ensure_absolute("store.path", self.store.path.as_deref())?;
        ensure_absolute("logging.dir", self.logging.dir.as_deref())?;

        if let Some(allowed) = &self.kinds.allowed {
            if allowed.is_empty() {
                return Err(ConfigError::Invalid(
                    "kinds.allowed must not be empty".to_string(),
                ));
            }
            if let Some(kind) = allowed.iter().find(|kind| !is_addressable_kind(**kind)) {
                return Err(ConfigError::Invalid(format!(
                    "kinds.allowed contains non-addressable kind {kind}"
                )));
            }
        }
        Ok(())
    }

    /// Member kind validator described by `[kinds]`.
    ///
    /// An explicit `allowed` list wins over `allow_folder_nesting`.
    pub fn kind_validator(&self) -> KindValidator {
        match &self.kinds.allowed {
            Some(allowed) => KindValidator::new(allowed.iter().copied()),
            None if self.kinds.allow_folder_nesting => KindValidator::with_folder_nesting(),
            None => KindValidator::standard(),
        }
    }
}

fn ensure_absolute(field: &str, path: Option<&Path>) -> Result<(), ConfigError> {
    match path {
        Some(path) if !path.is_absolute() => Err(ConfigError::Invalid(format!(
            "{field} must be an absolute path, got `{}`",
            path.display()
        ))),
        _ => Ok(()),
    }
}
