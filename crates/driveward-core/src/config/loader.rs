//! Configuration loading and persistence.

use super::Config;
use crate::error::ConfigError;
use crate::paths;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

impl Config {
    /// Load configuration from `path`, or defaults when the file is absent.
    pub fn load_or_default(path: &Path) -> Result<Self, ConfigError> {
        match Self::load(path) {
            Err(ConfigError::NotFound(_)) => {
                debug!(path = %path.display(), "no config file, using defaults");
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// Load configuration from a file path.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::parse(&content)
    }

    /// Parse configuration from a string.
    pub fn parse(content: &str) -> Result<Self, ConfigError> {
        json5::from_str(content).map_err(|e| ConfigError::Json5(e.to_string()))
    }

    /// Save configuration to a file path.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let content = self.to_json5()?;

        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        // Write atomically
        let temp_path = path.with_extension("tmp");
        fs::write(&temp_path, &content)?;
        fs::rename(&temp_path, path)?;

        Ok(())
    }

    /// Serialize to JSON5 string.
    pub fn to_json5(&self) -> Result<String, ConfigError> {
        // json5 doesn't have a serializer, so we use serde_json with pretty print
        serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))
    }

    /// Validate the configuration, collecting all errors before returning.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut errors = Vec::new();

        let name = self.storage.file_name.trim();
        if name.is_empty() {
            errors.push("Storage file_name must not be empty".to_string());
        } else if name.contains('/') || name.contains('\\') || name == "." || name == ".." {
            errors.push(format!(
                "Storage file_name '{}' must be a plain file name",
                self.storage.file_name
            ));
        }

        if let Some(command) = &self.consent.verifier_command {
            match command.first() {
                None => errors.push("Consent verifier_command must not be empty".to_string()),
                Some(program) if program.trim().is_empty() => {
                    errors.push("Consent verifier_command program must not be blank".to_string())
                }
                Some(_) => {}
            }
        }

        if errors.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Validation(errors.join("; ")))
        }
    }

    /// Directory holding the store file. A leading `~/` in `storage.dir`
    /// is expanded to the home directory.
    pub fn storage_dir(&self) -> Result<PathBuf, ConfigError> {
        match &self.storage.dir {
            Some(dir) => Ok(match dir.to_str() {
                Some(text) => paths::expand_tilde(text),
                None => dir.clone(),
            }),
            None => paths::base_dir(),
        }
    }

    /// Full path of the store file.
    pub fn store_path(&self) -> Result<PathBuf, ConfigError> {
        Ok(self.storage_dir()?.join(&self.storage.file_name))
    }
}
