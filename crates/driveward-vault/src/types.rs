//! Core types for the password vault.

use std::path::PathBuf;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;

use crate::consent::AvailabilityState;
use crate::error::{Result, VaultError};

/// Maximum allowed length for a drive identifier, in characters.
pub const MAX_DRIVE_ID_LEN: usize = 260;

/// Validate a drive identifier such as `D:` or a volume mount path.
///
/// Must contain at least one non-whitespace character, be at most
/// [`MAX_DRIVE_ID_LEN`] characters, and be free of control characters.
/// A whitespace-only id is rejected as empty because it cannot name a drive.
pub fn validate_drive_id(drive_id: &str) -> Result<()> {
    if drive_id.trim().is_empty() {
        return Err(VaultError::InvalidDriveId(
            "drive id must not be empty".to_string(),
        ));
    }
    if drive_id.chars().count() > MAX_DRIVE_ID_LEN {
        return Err(VaultError::InvalidDriveId(format!(
            "drive id exceeds maximum length of {MAX_DRIVE_ID_LEN} characters"
        )));
    }
    if drive_id.chars().any(char::is_control) {
        return Err(VaultError::InvalidDriveId(
            "drive id contains control characters".to_string(),
        ));
    }
    Ok(())
}

/// One encrypted password as it sits in the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecretEntry {
    pub drive_id: String,
    pub ciphertext: Vec<u8>,
}

impl SecretEntry {
    /// Decode a store entry's base64 text.
    pub fn from_encoded(drive_id: impl Into<String>, encoded: &str) -> Result<Self> {
        let ciphertext = STANDARD
            .decode(encoded.trim())
            .map_err(|e| VaultError::Decryption(format!("base64 decode failed: {e}")))?;
        Ok(Self {
            drive_id: drive_id.into(),
            ciphertext,
        })
    }

    /// Base64 text for the store file.
    pub fn encoded(&self) -> String {
        STANDARD.encode(&self.ciphertext)
    }
}

/// Snapshot of the vault for status displays. Contains no secrets.
#[derive(Debug, Clone)]
pub struct VaultStatus {
    pub availability: AvailabilityState,
    pub store_path: PathBuf,
    /// Number of saved passwords, or `None` when the store is unreadable.
    pub saved_drives: Option<usize>,
}
