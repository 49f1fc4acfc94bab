//! Runtime configuration from the process environment.

use crate::logging::{default_log_level, parse_level, LoggingError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Environment variable overriding the log level.
pub const ENV_LOG_LEVEL: &str = "EXTPROXY_LOG_LEVEL";
/// Environment variable overriding the log directory.
pub const ENV_LOG_DIR: &str = "EXTPROXY_LOG_DIR";

const DEFAULT_LOG_SUBDIR: &str = "extproxy-logs";

/// Settings shared by the CLI and FFI entry points.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeConfig {
    pub log_level: String,
    pub log_dir: PathBuf,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level().to_string(),
            log_dir: std::env::temp_dir().join(DEFAULT_LOG_SUBDIR),
        }
    }
}

impl RuntimeConfig {
    /// Reads overrides from `EXTPROXY_LOG_LEVEL` / `EXTPROXY_LOG_DIR`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Same as [`RuntimeConfig::from_env`] with an injectable lookup.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Some(raw) = non_blank(lookup(ENV_LOG_LEVEL)) {
            config.log_level = parse_level(&raw)
                .map_err(ConfigError::InvalidLogLevel)?
                .to_string();
        }
        if let Some(raw) = non_blank(lookup(ENV_LOG_DIR)) {
            let path = PathBuf::from(raw.as_str());
            if !path.is_absolute() {
                return Err(ConfigError::RelativeLogDir(raw));
            }
            config.log_dir = path;
        }
        Ok(config)
    }

    /// `log_dir` as UTF-8, as expected by `init_logging`.
    pub fn log_dir_str(&self) -> Result<&str, ConfigError> {
        self.log_dir
            .to_str()
            .ok_or_else(|| ConfigError::NonUtf8LogDir(self.log_dir.clone()))
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    InvalidLogLevel(LoggingError),
    RelativeLogDir(String),
    NonUtf8LogDir(PathBuf),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidLogLevel(err) => write!(f, "{ENV_LOG_LEVEL}: {err}"),
            Self::RelativeLogDir(value) => {
                write!(f, "{ENV_LOG_DIR} must be an absolute path, got `{value}`")
            }
            Self::NonUtf8LogDir(path) => {
                write!(f, "log directory is not valid UTF-8: {}", path.display())
            }
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidLogLevel(err) => Some(err),
            Self::RelativeLogDir(_) | Self::NonUtf8LogDir(_) => None,
        }
    }
}
