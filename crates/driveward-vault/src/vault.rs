//! Password vault facade.
//!
//! [`PasswordVault`] is the only way callers touch saved drive passwords.
//! It combines the consent gate, the store file, and the codec:
//!
//! | Operation | Consent reason | Result |
//! |---|---|---|
//! | [`save`](PasswordVault::save) | `Save password for drive {id}` | `true` on success |
//! | [`get`](PasswordVault::get) | `Access saved password for drive {id}` | the password, or `None` |
//! | [`remove`](PasswordVault::remove) | `Remove saved password for drive {id}` | `true` if an entry was removed |
//! | [`has_saved`](PasswordVault::has_saved) | none | presence only |
//! | [`list_drives`](PasswordVault::list_drives) | none | drive ids only |
//!
//! Presence and listing skip consent because they reveal which drives have
//! passwords, never the passwords. Drive ids are not treated as sensitive.
//!
//! No error escapes the facade. Each failure becomes the operation's
//! failure value and is reported to the [`DiagnosticSink`].
//!
//! Every load-mutate-store sequence runs under one lock, so concurrent
//! callers cannot lose each other's updates. Consent is obtained before the
//! lock is taken.

use std::sync::Arc;

use driveward_core::config::Config;
use driveward_core::scope;
use driveward_core::SecretString;
use tokio::sync::Mutex;
use tracing::{debug, info};

use crate::codec::SecretCodec;
use crate::consent::{
    CommandVerifier, ConsentGate, ConsentOutcome, ConsentVerifier, FallbackConfirmer, NoVerifier,
};
use crate::diagnostics::{DiagnosticSink, Operation, TracingSink, VaultFailure};
use crate::error::{Result, VaultError};
use crate::protector;
use crate::store::PasswordFile;
use crate::types::{validate_drive_id, SecretEntry, VaultStatus};

/// Consent-gated store of drive passwords.
pub struct PasswordVault {
    file: PasswordFile,
    codec: SecretCodec,
    gate: ConsentGate,
    scope: String,
    diagnostics: Arc<dyn DiagnosticSink>,
    lock: Mutex<()>,
}

impl PasswordVault {
    /// Assemble a vault from its parts, scoped to `scope`.
    pub fn new(file: PasswordFile, codec: SecretCodec, gate: ConsentGate, scope: impl Into<String>) -> Self {
        Self {
            file,
            codec,
            gate,
            scope: scope.into(),
            diagnostics: Arc::new(TracingSink),
            lock: Mutex::new(()),
        }
    }

    /// Replace the default tracing sink.
    pub fn with_diagnostics(mut self, sink: Arc<dyn DiagnosticSink>) -> Self {
        self.diagnostics = sink;
        self
    }

    /// Build the production vault described by `config`.
    ///
    /// Uses the platform protector, the configured verifier program (or
    /// none), and the current OS user as scope. `confirmer` handles the
    /// fallback prompt.
    pub fn from_config(config: &Config, confirmer: Arc<dyn FallbackConfirmer>) -> Result<Self> {
        let dir = config
            .storage_dir()
            .map_err(|e| VaultError::Persistence(e.to_string()))?;
        let file = PasswordFile::new(dir.join(&config.storage.file_name), config.storage.on_corrupt)?;
        let codec = SecretCodec::new(protector::platform_protector(&dir)?);

        let verifier: Arc<dyn ConsentVerifier> = match config
            .consent
            .verifier_command
            .as_deref()
            .and_then(CommandVerifier::from_argv)
        {
            Some(command) => Arc::new(command),
            None => Arc::new(NoVerifier),
        };
        let gate = ConsentGate::new(verifier, confirmer, config.consent.fallback);

        Ok(Self::new(file, codec, gate, scope::current_user_scope()))
    }

    pub fn store_file(&self) -> &PasswordFile {
        &self.file
    }

    pub fn scope(&self) -> &str {
        &self.scope
    }

    /// Encrypt and save `password` for `drive_id`, replacing any previous one.
    pub async fn save(&self, drive_id: &str, password: &str) -> bool {
        match self.try_save(drive_id, password).await {
            Ok(()) => true,
            Err(e) => {
                self.report(Operation::Save, Some(drive_id), &e);
                false
            }
        }
    }

    /// Decrypt the saved password for `drive_id`.
    ///
    /// `None` when consent is refused, nothing is saved, or decryption fails.
    pub async fn get(&self, drive_id: &str) -> Option<SecretString> {
        match self.try_get(drive_id).await {
            Ok(secret) => secret,
            Err(e) => {
                self.report(Operation::Get, Some(drive_id), &e);
                None
            }
        }
    }

    /// Remove the saved password for `drive_id`.
    ///
    /// `false` when nothing was saved; the file is not rewritten then.
    pub async fn remove(&self, drive_id: &str) -> bool {
        match self.try_remove(drive_id).await {
            Ok(removed) => removed,
            Err(e) => {
                self.report(Operation::Remove, Some(drive_id), &e);
                false
            }
        }
    }

    /// Whether a password is saved for `drive_id`. Does not ask for consent.
    pub async fn has_saved(&self, drive_id: &str) -> bool {
        match self.try_has_saved(drive_id).await {
            Ok(present) => present,
            Err(e) => {
                self.report(Operation::HasSaved, Some(drive_id), &e);
                false
            }
        }
    }

    /// Drives with saved passwords. Does not ask for consent.
    pub async fn list_drives(&self) -> Vec<String> {
        match self.load_locked().await {
            Ok(stored) => stored.drive_ids(),
            Err(e) => {
                self.report(Operation::ListDrives, None, &e);
                Vec::new()
            }
        }
    }

    /// Whether the platform verifier can run right now.
    pub async fn is_verifier_available(&self) -> bool {
        self.gate.check_availability().await.is_available()
    }

    /// Verifier state, store location, and entry count.
    pub async fn status(&self) -> VaultStatus {
        let availability = self.gate.check_availability().await;
        let saved_drives = match self.load_locked().await {
            Ok(stored) => Some(stored.len()),
            Err(e) => {
                self.report(Operation::Status, None, &e);
                None
            }
        };
        VaultStatus {
            availability,
            store_path: self.file.path().to_path_buf(),
            saved_drives,
        }
    }

    async fn try_save(&self, drive_id: &str, password: &str) -> Result<()> {
        validate_drive_id(drive_id)?;
        self.require_consent(&format!("Save password for drive {drive_id}"))
            .await?;

        let entry = SecretEntry {
            drive_id: drive_id.to_string(),
            ciphertext: self.codec.encrypt(password, &self.scope)?,
        };

        let _guard = self.lock.lock().await;
        let mut stored = self.file.load().await?;
        stored.insert(entry.drive_id.clone(), entry.encoded());
        self.file.store_all(&stored).await?;

        info!(drive = drive_id, "saved drive password");
        Ok(())
    }

    async fn try_get(&self, drive_id: &str) -> Result<Option<SecretString>> {
        validate_drive_id(drive_id)?;
        self.require_consent(&format!("Access saved password for drive {drive_id}"))
            .await?;

        let stored = self.load_locked().await?;
        let Some(encoded) = stored.get(drive_id) else {
            debug!(drive = drive_id, "no saved password");
            return Ok(None);
        };

        let entry = SecretEntry::from_encoded(drive_id, encoded)?;
        let secret = self.codec.decrypt(&entry.ciphertext, &self.scope)?;
        debug!(drive = drive_id, "decrypted saved password");
        Ok(Some(secret))
    }

    async fn try_remove(&self, drive_id: &str) -> Result<bool> {
        validate_drive_id(drive_id)?;
        self.require_consent(&format!("Remove saved password for drive {drive_id}"))
            .await?;

        let _guard = self.lock.lock().await;
        let mut stored = self.file.load().await?;
        if !stored.remove(drive_id) {
            debug!(drive = drive_id, "nothing to remove");
            return Ok(false);
        }
        self.file.store_all(&stored).await?;

        info!(drive = drive_id, "removed saved drive password");
        Ok(true)
    }

    async fn try_has_saved(&self, drive_id: &str) -> Result<bool> {
        validate_drive_id(drive_id)?;
        Ok(self.load_locked().await?.contains(drive_id))
    }

    async fn load_locked(&self) -> Result<crate::store::StoredPasswords> {
        let _guard = self.lock.lock().await;
        self.file.load().await
    }

    async fn require_consent(&self, reason: &str) -> Result<()> {
        match self.gate.authorize(reason).await {
            ConsentOutcome::Denied(denial) => Err(VaultError::GateDenied(denial.to_string())),
            ConsentOutcome::Verified | ConsentOutcome::FallbackConfirmed(_) => Ok(()),
        }
    }

    fn report(&self, operation: Operation, drive_id: Option<&str>, error: &VaultError) {
        self.diagnostics.record(&VaultFailure {
            operation,
            drive_id: drive_id.map(str::to_string),
            kind: error.kind(),
            detail: error.to_string(),
        });
    }
}
