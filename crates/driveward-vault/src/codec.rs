//! Encrypted secret codec.
//!
//! Turns a plaintext password into an opaque blob bound to a user scope tag
//! and back. The codec holds no state besides its protector and performs no
//! I/O.

use std::sync::Arc;

use driveward_core::SecretString;

use crate::error::{Result, VaultError};
use crate::protector::DataProtector;

/// Password codec over an injected [`DataProtector`].
#[derive(Clone)]
pub struct SecretCodec {
    protector: Arc<dyn DataProtector>,
}

impl SecretCodec {
    pub fn new(protector: Arc<dyn DataProtector>) -> Self {
        Self { protector }
    }

    /// Encrypt `plaintext` for `scope`.
    pub fn encrypt(&self, plaintext: &str, scope: &str) -> Result<Vec<u8>> {
        self.protector.protect(plaintext.as_bytes(), scope)
    }

    /// Decrypt a blob produced by [`SecretCodec::encrypt`] under the same scope.
    ///
    /// Returns the whole plaintext or [`VaultError::Decryption`].
    pub fn decrypt(&self, ciphertext: &[u8], scope: &str) -> Result<SecretString> {
        let mut plaintext = self
            .protector
            .unprotect(ciphertext, scope)
            .map_err(|e| match e {
                VaultError::Decryption(_) => e,
                other => VaultError::Decryption(other.to_string()),
            })?;

        SecretString::from_utf8(std::mem::take(&mut *plaintext))
            .ok_or_else(|| VaultError::Decryption("plaintext is not valid UTF-8".to_string()))
    }
}
