//! Master key resolution for the portable protector.
//!
//! The master key is resolved in priority order:
//! 1. `DRIVEWARD_MASTER_KEY` environment variable (hex-encoded)
//! 2. OS keychain (macOS Keychain via Security.framework)
//! 3. `master.key` file in the application directory (mode 0600)
//! 4. Generate a new key and persist it (keychain on macOS, key file elsewhere)
//!
//! The key never leaves the machine, which is what binds sealed blobs to it.

use std::path::Path;

use driveward_core::env::{self, vars};
use driveward_core::paths;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::crypto::{self, KEY_SIZE};
use crate::error::{Result, VaultError};

#[cfg(target_os = "macos")]
const SERVICE_NAME: &str = "driveward";
#[cfg(target_os = "macos")]
const ACCOUNT_NAME: &str = "master_key";

/// Retrieve the master key, creating one if it does not exist yet.
pub fn get_or_create_master_key(key_dir: &Path) -> Result<Zeroizing<Vec<u8>>> {
    if let Some(hex_key) = env::get_var(vars::DRIVEWARD_MASTER_KEY) {
        debug!("using master key from environment variable");
        return decode_key(&hex_key, vars::DRIVEWARD_MASTER_KEY);
    }

    if let Some(key) = get_from_keychain()? {
        debug!("using master key from OS keychain");
        return Ok(key);
    }

    let key_file = paths::master_key_file(key_dir);
    if key_file.exists() {
        debug!(path = %key_file.display(), "using master key from key file");
        let hex_key = Zeroizing::new(std::fs::read_to_string(&key_file)?);
        return decode_key(&hex_key, "key file");
    }

    info!("generating new master key");
    let key = crypto::generate_master_key();
    if !store_in_keychain(&key)? {
        write_key_file(key_dir, &key)?;
    }
    Ok(key)
}

fn decode_key(hex_key: &str, source: &str) -> Result<Zeroizing<Vec<u8>>> {
    let key = Zeroizing::new(
        hex::decode(hex_key.trim())
            .map_err(|e| VaultError::Keychain(format!("invalid hex in {source}: {e}")))?,
    );
    if key.len() != KEY_SIZE {
        return Err(VaultError::Keychain(format!(
            "{source} must decode to exactly {KEY_SIZE} bytes, got {}",
            key.len()
        )));
    }
    Ok(key)
}

fn write_key_file(key_dir: &Path, key: &[u8]) -> Result<()> {
    paths::ensure_private_dir(key_dir)?;
    let path = paths::master_key_file(key_dir);
    let hex_key = Zeroizing::new(hex::encode(key));

    #[cfg(unix)]
    {
        use std::io::Write;
        use std::os::unix::fs::OpenOptionsExt;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .mode(0o600)
            .open(&path)?;
        file.write_all(hex_key.as_bytes())?;
        file.sync_all()?;
    }

    #[cfg(not(unix))]
    {
        std::fs::write(&path, hex_key.as_bytes())?;
    }

    debug!(path = %path.display(), "wrote master key file");
    Ok(())
}

// ---------------------------------------------------------------------------
// macOS keychain implementation
// ---------------------------------------------------------------------------

#[cfg(target_os = "macos")]
fn get_from_keychain() -> Result<Option<Zeroizing<Vec<u8>>>> {
    use security_framework::passwords::get_generic_password;

    match get_generic_password(SERVICE_NAME, ACCOUNT_NAME) {
        Ok(data) => {
            let data = Zeroizing::new(data);
            let hex_str = std::str::from_utf8(&data).map_err(|e| {
                VaultError::Keychain(format!("keychain data is not valid UTF-8: {e}"))
            })?;
            decode_key(hex_str, "keychain entry").map(Some)
        }
        Err(e) => {
            // errSecItemNotFound is the expected "not stored yet" case.
            let msg = e.to_string();
            if msg.contains("not found") || msg.contains("-25300") {
                Ok(None)
            } else {
                Err(VaultError::Keychain(format!("keychain read failed: {e}")))
            }
        }
    }
}

#[cfg(target_os = "macos")]
fn store_in_keychain(key: &[u8]) -> Result<bool> {
    use security_framework::passwords::set_generic_password;

    let hex_key = Zeroizing::new(hex::encode(key));
    set_generic_password(SERVICE_NAME, ACCOUNT_NAME, hex_key.as_bytes())
        .map_err(|e| VaultError::Keychain(format!("keychain write failed: {e}")))?;
    Ok(true)
}

// ---------------------------------------------------------------------------
// Other platforms: key file only
// ---------------------------------------------------------------------------

#[cfg(not(target_os = "macos"))]
fn get_from_keychain() -> Result<Option<Zeroizing<Vec<u8>>>> {
    Ok(None)
}

#[cfg(not(target_os = "macos"))]
fn store_in_keychain(_key: &[u8]) -> Result<bool> {
    Ok(false)
}
