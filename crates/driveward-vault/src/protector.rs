//! Per-user data protection primitives.
//!
//! A [`DataProtector`] seals bytes so that only the same user on the same
//! machine can open them again. On Windows this is DPAPI in current-user
//! scope with the scope tag as optional entropy. Elsewhere it is
//! [`KeyedProtector`], AES-256-GCM under a machine-local master key with the
//! scope tag mixed into key derivation.

use std::path::Path;
use std::sync::Arc;

use zeroize::Zeroizing;

use crate::crypto;
use crate::error::Result;
use crate::keychain;

/// OS-scoped symmetric protection bound to a user scope tag.
pub trait DataProtector: Send + Sync {
    /// Seal `plaintext` for `scope`.
    fn protect(&self, plaintext: &[u8], scope: &str) -> Result<Vec<u8>>;

    /// Open a blob sealed by [`DataProtector::protect`].
    ///
    /// Must fail when `scope`, user, or machine differ from sealing time.
    fn unprotect(&self, blob: &[u8], scope: &str) -> Result<Zeroizing<Vec<u8>>>;
}

/// AES-256-GCM protector keyed by a machine-local master key.
pub struct KeyedProtector {
    master_key: Zeroizing<Vec<u8>>,
}

impl KeyedProtector {
    pub fn new(master_key: Zeroizing<Vec<u8>>) -> Self {
        Self { master_key }
    }

    /// Resolve the master key via [`keychain::get_or_create_master_key`].
    pub fn from_key_dir(key_dir: &Path) -> Result<Self> {
        Ok(Self::new(keychain::get_or_create_master_key(key_dir)?))
    }
}

impl DataProtector for KeyedProtector {
    fn protect(&self, plaintext: &[u8], scope: &str) -> Result<Vec<u8>> {
        crypto::seal(&self.master_key, scope, plaintext)
    }

    fn unprotect(&self, blob: &[u8], scope: &str) -> Result<Zeroizing<Vec<u8>>> {
        crypto::open(&self.master_key, scope, blob)
    }
}

/// The platform's default protector.
///
/// `key_dir` is only consulted by the portable protector.
#[cfg(windows)]
pub fn platform_protector(_key_dir: &Path) -> Result<Arc<dyn DataProtector>> {
    Ok(Arc::new(dpapi::DpapiProtector))
}

/// The platform's default protector.
///
/// `key_dir` is where the master key file lives when no keychain holds it.
#[cfg(not(windows))]
pub fn platform_protector(key_dir: &Path) -> Result<Arc<dyn DataProtector>> {
    Ok(Arc::new(KeyedProtector::from_key_dir(key_dir)?))
}

#[cfg(windows)]
pub use dpapi::DpapiProtector;

#[cfg(windows)]
mod dpapi {
    use std::ptr;

    use windows_sys::Win32::Foundation::LocalFree;
    use windows_sys::Win32::Security::Cryptography::{
        CryptProtectData, CryptUnprotectData, CRYPTPROTECT_UI_FORBIDDEN, CRYPT_INTEGER_BLOB,
    };
    use zeroize::{Zeroize, Zeroizing};

    use super::DataProtector;
    use crate::error::{Result, VaultError};

    /// DPAPI in current-user scope.
    pub struct DpapiProtector;

    fn blob_of(data: &[u8]) -> CRYPT_INTEGER_BLOB {
        CRYPT_INTEGER_BLOB {
            cbData: data.len() as u32,
            pbData: data.as_ptr() as *mut u8,
        }
    }

    /// Copy a DPAPI-allocated output blob and release it.
    unsafe fn take_output(out: CRYPT_INTEGER_BLOB) -> Vec<u8> {
        let data = std::slice::from_raw_parts(out.pbData, out.cbData as usize).to_vec();
        // Wipe the OS buffer before handing it back.
        std::slice::from_raw_parts_mut(out.pbData, out.cbData as usize).zeroize();
        LocalFree(out.pbData as _);
        data
    }

    impl DataProtector for DpapiProtector {
        fn protect(&self, plaintext: &[u8], scope: &str) -> Result<Vec<u8>> {
            let input = blob_of(plaintext);
            let entropy = blob_of(scope.as_bytes());
            let mut output = CRYPT_INTEGER_BLOB {
                cbData: 0,
                pbData: ptr::null_mut(),
            };

            let ok = unsafe {
                CryptProtectData(
                    &input,
                    ptr::null(),
                    &entropy,
                    ptr::null(),
                    ptr::null(),
                    CRYPTPROTECT_UI_FORBIDDEN,
                    &mut output,
                )
            };
            if ok == 0 {
                return Err(VaultError::Encryption(format!(
                    "CryptProtectData failed: {}",
                    std::io::Error::last_os_error()
                )));
            }

            Ok(unsafe { take_output(output) })
        }

        fn unprotect(&self, blob: &[u8], scope: &str) -> Result<Zeroizing<Vec<u8>>> {
            let input = blob_of(blob);
            let entropy = blob_of(scope.as_bytes());
            let mut output = CRYPT_INTEGER_BLOB {
                cbData: 0,
                pbData: ptr::null_mut(),
            };

            let ok = unsafe {
                CryptUnprotectData(
                    &input,
                    ptr::null_mut(),
                    &entropy,
                    ptr::null(),
                    ptr::null(),
                    CRYPTPROTECT_UI_FORBIDDEN,
                    &mut output,
                )
            };
            if ok == 0 {
                return Err(VaultError::Decryption(format!(
                    "CryptUnprotectData failed: {}",
                    std::io::Error::last_os_error()
                )));
            }

            Ok(Zeroizing::new(unsafe { take_output(output) }))
        }
    }
}
