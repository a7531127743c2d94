//! Core configuration.
//!
//! # Responsibility
//! - Name the durable storage keys for the task list and display preference.
//! - Carry the category table loaded once at initialization.
//! - Carry optional logging settings for `init_logging_from_config`.
//!
//! # Invariants
//! - A loaded config always passes `CoreConfig::validate`.
//! - Every field has a default, so `{}` is a valid config document.

use crate::model::category::CategoryTable;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_TASKS_KEY: &str = "tasks";
pub const DEFAULT_PREFERENCE_KEY: &str = "darkMode";

#[derive(Debug)]
pub enum ConfigError {
    Io { path: PathBuf, source: std::io::Error },
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "failed to read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "invalid config document: {err}"),
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

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    pub tasks_key: String,
    pub preference_key: String,
    pub categories: CategoryTable,
    /// `trace|debug|info|warn|error`; build-mode default when unset.
    pub log_level: Option<String>,
    /// Absolute log directory; file logging stays off when unset.
    pub log_dir: Option<String>,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            tasks_key: DEFAULT_TASKS_KEY.to_string(),
            preference_key: DEFAULT_PREFERENCE_KEY.to_string(),
            categories: CategoryTable::builtin(),
            log_level: None,
            log_dir: None,
        }
    }
}

impl CoreConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    /// Checks cross-field rules the serde layer cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.tasks_key.trim().is_empty() || self.preference_key.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "storage keys must not be blank".to_string(),
            ));
        }
        if self.tasks_key == self.preference_key {
            return Err(ConfigError::Invalid(format!(
                "tasks_key and preference_key must differ, both are `{}`",
                self.tasks_key
            )));
        }
        self.categories
            .validate()
            .map_err(|err| ConfigError::Invalid(err.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig};

    #[test]
    fn empty_document_yields_defaults() {
        let config = CoreConfig::from_json_str("{}").unwrap();
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.tasks_key, "tasks");
        assert_eq!(config.preference_key, "darkMode");
    }

    #[test]
    fn rejects_colliding_keys() {
        let err = CoreConfig::from_json_str(r#"{"tasks_key":"k","preference_key":"k"}"#)
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref m) if m.contains("must differ")));
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = CoreConfig::from_json_str(r#"{"task_key":"typo"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
