//! Configuration schema definitions.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::paths;

/// Main Driveward configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Password store settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Consent gate settings.
    #[serde(default)]
    pub consent: ConsentConfig,

    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Password store configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Directory holding the store file. Defaults to the application directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dir: Option<PathBuf>,

    /// Store file name.
    #[serde(default = "default_file_name")]
    pub file_name: String,

    /// What to do when the store file exists but cannot be parsed.
    #[serde(default)]
    pub on_corrupt: CorruptStorePolicy,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            dir: None,
            file_name: default_file_name(),
            on_corrupt: CorruptStorePolicy::default(),
        }
    }
}

fn default_file_name() -> String {
    paths::STORE_FILE_NAME.to_string()
}

/// Handling of an unparseable store file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CorruptStorePolicy {
    /// Report the file as corrupt and refuse to overwrite it.
    #[default]
    Fail,
    /// Treat the file as an empty store. The next save replaces it.
    Empty,
}

/// Consent gate configuration section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ConsentConfig {
    /// Behaviour when the platform verifier is unavailable or errors.
    #[serde(default)]
    pub fallback: FallbackPolicy,

    /// External verifier program and its leading arguments. The reason
    /// string is appended as the final argument.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verifier_command: Option<Vec<String>>,
}

/// Fallback behaviour when verification cannot run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FallbackPolicy {
    /// Ask the user for an explicit yes/no confirmation.
    #[default]
    Confirm,
    /// Refuse the operation.
    Deny,
}

/// Logging configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level.
    #[serde(default)]
    pub level: LogLevel,

    /// Emit JSON lines instead of human-readable output.
    #[serde(default)]
    pub json: bool,
}

/// Log level.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    /// Level name as understood by `tracing` filters.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}
