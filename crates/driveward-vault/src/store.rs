//! Password store persistence.
//!
//! The whole store is one UTF-8 JSON object mapping drive identifier to the
//! base64 text of that drive's encrypted password:
//!
//! ```text
//! {
//!   "D:": "QmFzZTY0Q2lwaGVydGV4dA==",
//!   "E:": "QW5vdGhlckNpcGhlcnRleHQ="
//! }
//! ```
//!
//! Every read loads the full map and every write replaces the full file.
//! Writes go to a temporary sibling first and are renamed into place.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use driveward_core::config::CorruptStorePolicy;
use driveward_core::paths;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{Result, VaultError};

/// In-memory copy of the store file.
///
/// Keys are unique; inserting an existing drive replaces its entry.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StoredPasswords {
    entries: BTreeMap<String, String>,
}

impl StoredPasswords {
    pub fn new() -> Self {
        Self::default()
    }

    /// Encoded entry for `drive_id`, if any.
    pub fn get(&self, drive_id: &str) -> Option<&str> {
        self.entries.get(drive_id).map(String::as_str)
    }

    /// Set the entry for `drive_id`, returning the one it replaced.
    pub fn insert(&mut self, drive_id: impl Into<String>, encoded: impl Into<String>) -> Option<String> {
        self.entries.insert(drive_id.into(), encoded.into())
    }

    /// Remove the entry for `drive_id`. Returns whether one existed.
    pub fn remove(&mut self, drive_id: &str) -> bool {
        self.entries.remove(drive_id).is_some()
    }

    pub fn contains(&self, drive_id: &str) -> bool {
        self.entries.contains_key(drive_id)
    }

    /// All drive identifiers, sorted.
    pub fn drive_ids(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The store file on disk.
#[derive(Debug, Clone)]
pub struct PasswordFile {
    path: PathBuf,
    on_corrupt: CorruptStorePolicy,
}

impl PasswordFile {
    /// Bind to `path`, creating its parent directory if missing.
    pub fn new(path: PathBuf, on_corrupt: CorruptStorePolicy) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            paths::ensure_private_dir(parent)?;
        }
        Ok(Self { path, on_corrupt })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load the full store.
    ///
    /// A missing file, a blank file, or a JSON `null` is an empty store. A
    /// leading UTF-8 byte-order mark is ignored. A file that is not UTF-8 or
    /// not a JSON object of strings is [`VaultError::CorruptStore`] under
    /// [`CorruptStorePolicy::Fail`] and an empty store under
    /// [`CorruptStorePolicy::Empty`].
    pub async fn load(&self) -> Result<StoredPasswords> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "store file absent, starting empty");
                return Ok(StoredPasswords::new());
            }
            Err(e) => return Err(VaultError::Persistence(format!("read {}: {e}", self.path.display()))),
        };

        match parse_store(&bytes) {
            Ok(stored) => {
                debug!(path = %self.path.display(), entries = stored.len(), "loaded store");
                Ok(stored)
            }
            Err(reason) => match self.on_corrupt {
                CorruptStorePolicy::Fail => Err(VaultError::CorruptStore {
                    path: self.path.clone(),
                    reason,
                }),
                CorruptStorePolicy::Empty => {
                    warn!(path = %self.path.display(), "discarding unparseable store file: {reason}");
                    Ok(StoredPasswords::new())
                }
            },
        }
    }

    /// Replace the file with `stored`.
    pub async fn store_all(&self, stored: &StoredPasswords) -> Result<()> {
        let json = serde_json::to_string_pretty(stored)?;
        let temp = self.temp_path();

        if let Err(e) = write_private_file(&temp, json.as_bytes()).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(VaultError::Persistence(format!("write {}: {e}", temp.display())));
        }

        if let Err(e) = tokio::fs::rename(&temp, &self.path).await {
            let _ = tokio::fs::remove_file(&temp).await;
            return Err(VaultError::Persistence(format!(
                "replace {}: {e}",
                self.path.display()
            )));
        }

        debug!(path = %self.path.display(), entries = stored.len(), "wrote store");
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| paths::STORE_FILE_NAME.to_string());
        self.path
            .with_file_name(format!(".{name}.{:016x}.tmp", rand::random::<u64>()))
    }
}

/// Decode raw store file contents. `Err` carries the parse failure.
fn parse_store(bytes: &[u8]) -> std::result::Result<StoredPasswords, String> {
    let text = std::str::from_utf8(bytes).map_err(|e| format!("not valid UTF-8: {e}"))?;
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    if text.trim().is_empty() {
        return Ok(StoredPasswords::new());
    }

    serde_json::from_str::<Option<StoredPasswords>>(text)
        .map(Option::unwrap_or_default)
        .map_err(|e| e.to_string())
}

/// Write `data` to `path` with mode 0600 on Unix and flush it to disk.
async fn write_private_file(path: &Path, data: &[u8]) -> std::io::Result<()> {
    use tokio::io::AsyncWriteExt;

    let mut options = tokio::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    options.mode(0o600);

    let mut file = options.open(path).await?;
    file.write_all(data).await?;
    file.sync_all().await?;
    Ok(())
}
