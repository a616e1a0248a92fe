//! Core runtime configuration.
//!
//! # Responsibility
//! - Describe where the database lives and how logging is set up.
//! - Parse host-provided JSON configuration into validated values.
//!
//! # Invariants
//! - A parsed config always carries a supported log level.
//! - `log_dir`, when present, is an absolute path.

use crate::logging::default_log_level;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Busy timeout applied to new connections when no config overrides it.
pub const DEFAULT_BUSY_TIMEOUT_MS: u64 = 5_000;

/// Errors from configuration parsing/validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid config json: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("unsupported log level `{0}`; expected trace|debug|info|warn|error")]
    UnsupportedLogLevel(String),
    #[error("log_dir must be an absolute path, got `{0}`")]
    RelativeLogDir(String),
}

/// Runtime configuration for the kanban core.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CoreConfig {
    /// SQLite file path. `None` opens an in-memory database.
    pub db_path: Option<PathBuf>,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Directory for rolling log files. `None` leaves logging uninitialized.
    pub log_dir: Option<String>,
    /// How long a writer waits for a competing transaction before failing.
    pub busy_timeout_ms: u64,
}

impl Default for CoreConfig {
    fn default() -> Self {
        Self {
            db_path: None,
            log_level: default_log_level().to_string(),
            log_dir: None,
            busy_timeout_ms: DEFAULT_BUSY_TIMEOUT_MS,
        }
    }
}

impl CoreConfig {
    /// Parses and validates a JSON config document.
    ///
    /// Missing fields take their defaults.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Checks field values that serde cannot express.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let level = self.log_level.trim().to_ascii_lowercase();
        if !matches!(
            level.as_str(),
            "trace" | "debug" | "info" | "warn" | "warning" | "error"
        ) {
            return Err(ConfigError::UnsupportedLogLevel(self.log_level.clone()));
        }
        if let Some(dir) = self.log_dir.as_deref() {
            if !Path::new(dir.trim()).is_absolute() {
                return Err(ConfigError::RelativeLogDir(dir.to_string()));
            }
        }
        Ok(())
    }

    pub fn busy_timeout(&self) -> Duration {
        Duration::from_millis(self.busy_timeout_ms)
    }
}

#[cfg(test)]
mod tests {
    use super::{ConfigError, CoreConfig, DEFAULT_BUSY_TIMEOUT_MS};
    use std::path::PathBuf;

    #[test]
    fn empty_document_yields_defaults() {
        let config = CoreConfig::from_json_str("{}").expect("empty config should parse");
        assert_eq!(config, CoreConfig::default());
        assert_eq!(config.busy_timeout_ms, DEFAULT_BUSY_TIMEOUT_MS);
    }

    #[test]
    fn explicit_fields_are_kept() {
        let config = CoreConfig::from_json_str(
            r#"{"db_path": "/tmp/kanban.db", "log_level": "WARN", "busy_timeout_ms": 250}"#,
        )
        .expect("config should parse");
        assert_eq!(config.db_path, Some(PathBuf::from("/tmp/kanban.db")));
        assert_eq!(config.log_level, "WARN");
        assert_eq!(config.busy_timeout().as_millis(), 250);
    }

    #[test]
    fn rejects_unknown_level_and_relative_log_dir() {
        let err = CoreConfig::from_json_str(r#"{"log_level": "loud"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedLogLevel(level) if level == "loud"));

        let err = CoreConfig::from_json_str(r#"{"log_dir": "logs/dev"}"#).unwrap_err();
        assert!(matches!(err, ConfigError::RelativeLogDir(_)));
    }

    #[test]
    fn rejects_unknown_fields() {
        let err = CoreConfig::from_json_str(r#"{"cache_positions": true}"#).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }
}
