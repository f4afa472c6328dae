//! Client configuration.
//!
//! # Responsibility
//! - Hold host-provided settings for logging and link building.
//! - Load and validate them from JSON.
//!
//! # Invariants
//! - Every field has a default; an empty JSON object is a valid config.
//! - A config that passed `validate()` can initialize logging.

use crate::logging::{default_log_level, init_logging, normalize_level, normalize_log_dir};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::Path;

const DEFAULT_VIEW_URL_PREFIX: &str = "/n/";
const DEFAULT_TITLE_SLUG_MAX_CHARS: usize = 32;

/// Settings supplied by the hosting application.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute directory for rolling log files. `None` disables file logs.
    pub log_dir: Option<String>,
    /// Prefix of public note links.
    pub view_url_prefix: String,
    /// Max title characters used for the link slug.
    pub title_slug_max_chars: usize,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: None,
            view_url_prefix: DEFAULT_VIEW_URL_PREFIX.to_string(),
            title_slug_max_chars: DEFAULT_TITLE_SLUG_MAX_CHARS,
        }
    }
}

/// Configuration load/validation failure.
#[derive(Debug)]
pub enum ConfigError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "failed to read config: {err}"),
            Self::Parse(err) => write!(f, "failed to parse config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for ConfigError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl ClientConfig {
    /// Parses and validates a JSON config document.
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json_str(&raw)
    }

    /// Checks field values.
    ///
    /// # Errors
    /// - Unsupported `log_level`.
    /// - Relative or blank `log_dir`.
    /// - Empty `view_url_prefix` or zero `title_slug_max_chars`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        normalize_level(&self.log_level).map_err(ConfigError::Invalid)?;
        if let Some(dir) = &self.log_dir {
            normalize_log_dir(dir).map_err(ConfigError::Invalid)?;
        }
        if self.view_url_prefix.trim().is_empty() {
            return Err(ConfigError::Invalid(
                "view_url_prefix cannot be empty".to_string(),
            ));
        }
        if self.title_slug_max_chars == 0 {
            return Err(ConfigError::Invalid(
                "title_slug_max_chars must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }

    /// Starts file logging when `log_dir` is set.
    ///
    /// Returns `Ok(false)` when file logging is disabled.
    pub fn init_logging(&self) -> Result<bool, ConfigError> {
        let Some(dir) = &self.log_dir else {
            return Ok(false);
        };
        init_logging(&self.log_level, dir).map_err(ConfigError::Invalid)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::{ClientConfig, ConfigError};

    #[test]
    fn empty_object_yields_defaults() {
        let config = ClientConfig::from_json_str("{}").expect("empty config is valid");
        assert_eq!(config, ClientConfig::default());
        assert_eq!(config.view_url_prefix, "/n/");
        assert_eq!(config.title_slug_max_chars, 32);
    }

    #[test]
    fn rejects_unknown_log_level() {
        let err = ClientConfig::from_json_str(r#"{"log_level":"loud"}"#)
            .expect_err("unknown level must fail");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn rejects_relative_log_dir() {
        let err = ClientConfig::from_json_str(r#"{"log_dir":"logs"}"#)
            .expect_err("relative log dir must fail");
        assert!(err.to_string().contains("absolute"));
    }

    #[test]
    fn rejects_zero_slug_length() {
        let err = ClientConfig::from_json_str(r#"{"title_slug_max_chars":0}"#)
            .expect_err("zero slug length must fail");
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn init_logging_is_noop_without_log_dir() {
        let config = ClientConfig::default();
        assert!(!config.init_logging().expect("disabled logging is fine"));
    }

    #[test]
    fn loads_from_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("client.json");
        std::fs::write(&path, r#"{"view_url_prefix":"https://example.com/n/"}"#)
            .expect("write config");
        let config = ClientConfig::load(&path).expect("config loads");
        assert_eq!(config.view_url_prefix, "https://example.com/n/");
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let err = ClientConfig::load(dir.path().join("absent.json"))
            .expect_err("missing file must fail");
        assert!(matches!(err, ConfigError::Io(_)));
    }
}
