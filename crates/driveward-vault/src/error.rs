//! Error types for the password vault.

use std::path::PathBuf;
use thiserror::Error;

use crate::diagnostics::FailureKind;

/// Errors that can occur below the vault facade.
///
/// None of these cross the facade: [`crate::PasswordVault`] turns each one
/// into its documented `false`/`None` result after reporting it.
#[derive(Debug, Error)]
pub enum VaultError {
    #[error("Consent denied: {0}")]
    GateDenied(String),

    #[error("Decryption failed: {0}")]
    Decryption(String),

    #[error("Encryption failed: {0}")]
    Encryption(String),

    #[error("Storage error: {0}")]
    Persistence(String),

    #[error("Store file is corrupt: {path}: {reason}")]
    CorruptStore { path: PathBuf, reason: String },

    #[error("Invalid drive identifier: {0}")]
    InvalidDriveId(String),

    #[error("Keychain error: {0}")]
    Keychain(String),

    #[error("Verifier error: {0}")]
    Verifier(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl VaultError {
    /// Classify the error for diagnostics.
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::GateDenied(_) => FailureKind::GateDenied,
            Self::Decryption(_) => FailureKind::Decryption,
            Self::Persistence(_) | Self::CorruptStore { .. } | Self::Io(_) | Self::Json(_) => {
                FailureKind::Persistence
            }
            Self::InvalidDriveId(_) => FailureKind::InvalidInput,
            Self::Encryption(_) | Self::Keychain(_) | Self::Verifier(_) => {
                FailureKind::Unexpected
            }
        }
    }
}

/// Convenience result alias for vault operations.
pub type Result<T> = std::result::Result<T, VaultError>;
