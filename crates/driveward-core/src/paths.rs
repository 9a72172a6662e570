//! Path resolution utilities.
//!
//! Everything lives under one per-user application directory:
//! `<local-app-data>/BitLockerManager` unless `DRIVEWARD_HOME` overrides it.

use crate::env::{self, vars};
use crate::error::ConfigError;
use std::path::{Path, PathBuf};

/// Name of the application folder under the local app-data directory.
pub const APP_DIR_NAME: &str = "BitLockerManager";

/// Default file name of the password store.
pub const STORE_FILE_NAME: &str = "BitLockerPasswords.dat";

/// File name of the configuration file.
pub const CONFIG_FILE_NAME: &str = "driveward.json5";

/// File name of the portable protector's master key.
pub const MASTER_KEY_FILE_NAME: &str = "master.key";

/// Get the Driveward application directory.
pub fn base_dir() -> Result<PathBuf, ConfigError> {
    if let Some(home) = env::get_var(vars::DRIVEWARD_HOME) {
        return Ok(expand_tilde(&home));
    }

    let local = dirs::data_local_dir().ok_or_else(|| {
        ConfigError::Validation("Could not determine local application data directory".to_string())
    })?;
    Ok(local.join(APP_DIR_NAME))
}

/// Get the main config file path, honouring `DRIVEWARD_CONFIG`.
pub fn config_file() -> Result<PathBuf, ConfigError> {
    if let Some(path) = env::get_var(vars::DRIVEWARD_CONFIG) {
        return Ok(expand_tilde(&path));
    }
    Ok(base_dir()?.join(CONFIG_FILE_NAME))
}

/// Get the master key file path inside `dir`.
pub fn master_key_file(dir: &Path) -> PathBuf {
    dir.join(MASTER_KEY_FILE_NAME)
}

/// Create `dir` (and parents) with owner-only permissions on Unix.
pub fn ensure_private_dir(dir: &Path) -> Result<(), std::io::Error> {
    std::fs::create_dir_all(dir)?;

    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        std::fs::set_permissions(dir, std::fs::Permissions::from_mode(0o700))?;
    }

    Ok(())
}

/// Expand tilde (~) in a path.
pub fn expand_tilde(path: &str) -> PathBuf {
    if let Some(rest) = path.strip_prefix("~/") {
        if let Some(home) = dirs::home_dir() {
            return home.join(rest);
        }
    }
    PathBuf::from(path)
}
