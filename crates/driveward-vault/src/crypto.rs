//! AES-256-GCM encryption with HKDF-SHA256 key derivation.
//!
//! Each blob gets a unique random salt and nonce; the master key is never
//! used directly as a cipher key. The derivation context includes the
//! per-user scope tag, so a blob sealed for one account fails
//! authentication under another.
//!
//! Blob layout: `salt (32) || nonce (12) || ciphertext || tag (16)`.

use aes_gcm::aead::Aead;
use aes_gcm::{Aes256Gcm, KeyInit, Nonce};
use hkdf::Hkdf;
use rand::RngCore;
use sha2::Sha256;
use zeroize::Zeroizing;

use crate::error::{Result, VaultError};

const NONCE_SIZE: usize = 12;
const SALT_SIZE: usize = 32;
const TAG_SIZE: usize = 16;

/// Size in bytes of a master key.
pub const KEY_SIZE: usize = 32;

/// Domain separator prefixed to the scope tag in the HKDF info.
const HKDF_DOMAIN: &[u8] = b"driveward-drive-password-v1:";

/// Derive a 256-bit key from `master_key`, `salt`, and `scope`.
fn derive_key(master_key: &[u8], salt: &[u8], scope: &str) -> Zeroizing<[u8; KEY_SIZE]> {
    let hk = Hkdf::<Sha256>::new(Some(salt), master_key);
    let mut info = Vec::with_capacity(HKDF_DOMAIN.len() + scope.len());
    info.extend_from_slice(HKDF_DOMAIN);
    info.extend_from_slice(scope.as_bytes());

    let mut okm = Zeroizing::new([0u8; KEY_SIZE]);
    // expand cannot fail when output length <= 255 * hash-length
    hk.expand(&info, &mut okm[..])
        .expect("HKDF expand should not fail for 32-byte output");
    okm
}

/// Seal `plaintext` for `scope` under `master_key`.
pub fn seal(master_key: &[u8], scope: &str, plaintext: &[u8]) -> Result<Vec<u8>> {
    let mut salt = [0u8; SALT_SIZE];
    rand::thread_rng().fill_bytes(&mut salt);

    let mut nonce_bytes = [0u8; NONCE_SIZE];
    rand::thread_rng().fill_bytes(&mut nonce_bytes);

    let key = derive_key(master_key, &salt, scope);
    let cipher = Aes256Gcm::new_from_slice(&key[..])
        .map_err(|e| VaultError::Encryption(e.to_string()))?;

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce_bytes), plaintext)
        .map_err(|e| VaultError::Encryption(e.to_string()))?;

    let mut blob = Vec::with_capacity(SALT_SIZE + NONCE_SIZE + ciphertext.len());
    blob.extend_from_slice(&salt);
    blob.extend_from_slice(&nonce_bytes);
    blob.extend_from_slice(&ciphertext);
    Ok(blob)
}

/// Open a blob produced by [`seal`].
///
/// Fails on truncation, tampering, a different master key, or a different
/// scope. Never returns partial plaintext.
pub fn open(master_key: &[u8], scope: &str, blob: &[u8]) -> Result<Zeroizing<Vec<u8>>> {
    if blob.len() < SALT_SIZE + NONCE_SIZE + TAG_SIZE {
        return Err(VaultError::Decryption("ciphertext too short".to_string()));
    }

    let (salt, rest) = blob.split_at(SALT_SIZE);
    let (nonce_bytes, ciphertext) = rest.split_at(NONCE_SIZE);

    let key = derive_key(master_key, salt, scope);
    let cipher = Aes256Gcm::new_from_slice(&key[..])
        .map_err(|e| VaultError::Decryption(e.to_string()))?;

    cipher
        .decrypt(Nonce::from_slice(nonce_bytes), ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| VaultError::Decryption("authentication failed".to_string()))
}

/// Generate a new random 256-bit master key.
pub fn generate_master_key() -> Zeroizing<Vec<u8>> {
    let mut key = Zeroizing::new(vec![0u8; KEY_SIZE]);
    rand::thread_rng().fill_bytes(&mut key[..]);
    key
}
