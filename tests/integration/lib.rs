//! Shared fakes for the integration tests.
//!
//! The vault's capabilities (protector, verifier, confirmer) are injected,
//! so the tests swap in deterministic stand-ins and build a vault over a
//! temporary directory.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use driveward_core::config::{CorruptStorePolicy, FallbackPolicy};
use driveward_vault::{
    AvailabilityState, ConsentGate, ConsentVerifier, DataProtector, FallbackConfirmer,
    FallbackPrompt, PasswordFile, PasswordVault, SecretCodec, VaultError, VerificationResult,
};
use zeroize::Zeroizing;

/// Reversible protector: `scope ‖ 0x00 ‖ reversed plaintext`.
///
/// Opening under a different scope fails, like the real protectors.
pub struct ReversingProtector;

impl DataProtector for ReversingProtector {
    fn protect(&self, plaintext: &[u8], scope: &str) -> driveward_vault::Result<Vec<u8>> {
        let mut blob = scope.as_bytes().to_vec();
        blob.push(0);
        blob.extend(plaintext.iter().rev());
        Ok(blob)
    }

    fn unprotect(&self, blob: &[u8], scope: &str) -> driveward_vault::Result<Zeroizing<Vec<u8>>> {
        let prefix_len = scope.len() + 1;
        if blob.len() < prefix_len
            || &blob[..scope.len()] != scope.as_bytes()
            || blob[scope.len()] != 0
        {
            return Err(VaultError::Decryption("scope mismatch".to_string()));
        }
        Ok(Zeroizing::new(blob[prefix_len..].iter().rev().copied().collect()))
    }
}

/// How the fake verifier behaves.
#[derive(Debug, Clone)]
pub enum VerifierMode {
    Grant,
    Cancel,
    Unavailable(AvailabilityState),
    Error,
}

/// Verifier with a switchable mode and a prompt counter.
pub struct FakeVerifier {
    mode: Mutex<VerifierMode>,
    prompts: AtomicUsize,
}

impl FakeVerifier {
    pub fn new(mode: VerifierMode) -> Arc<Self> {
        Arc::new(Self {
            mode: Mutex::new(mode),
            prompts: AtomicUsize::new(0),
        })
    }

    pub fn set_mode(&self, mode: VerifierMode) {
        *self.mode.lock().unwrap() = mode;
    }

    pub fn prompts(&self) -> usize {
        self.prompts.load(Ordering::SeqCst)
    }

    fn mode(&self) -> VerifierMode {
        self.mode.lock().unwrap().clone()
    }
}

#[async_trait]
impl ConsentVerifier for FakeVerifier {
    async fn check_availability(&self) -> driveward_vault::Result<AvailabilityState> {
        Ok(match self.mode() {
            VerifierMode::Unavailable(state) => state,
            _ => AvailabilityState::Available,
        })
    }

    async fn request_verification(&self, _reason: &str) -> driveward_vault::Result<VerificationResult> {
        self.prompts.fetch_add(1, Ordering::SeqCst);
        match self.mode() {
            VerifierMode::Grant => Ok(VerificationResult::Verified),
            VerifierMode::Cancel => Ok(VerificationResult::Canceled),
            VerifierMode::Unavailable(_) => Ok(VerificationResult::NotVerified),
            VerifierMode::Error => Err(VaultError::Verifier("sensor failure".to_string())),
        }
    }
}

/// Confirmer that replays scripted answers (then declines) and records the
/// prompts it was shown.
#[derive(Default)]
pub struct ScriptedConfirmer {
    answers: Mutex<VecDeque<bool>>,
    seen: Mutex<Vec<FallbackPrompt>>,
}

impl ScriptedConfirmer {
    pub fn new(answers: impl IntoIterator<Item = bool>) -> Arc<Self> {
        Arc::new(Self {
            answers: Mutex::new(answers.into_iter().collect()),
            seen: Mutex::new(Vec::new()),
        })
    }

    pub fn seen(&self) -> Vec<FallbackPrompt> {
        self.seen.lock().unwrap().clone()
    }
}

#[async_trait]
impl FallbackConfirmer for ScriptedConfirmer {
    async fn confirm(&self, prompt: &FallbackPrompt) -> bool {
        self.seen.lock().unwrap().push(prompt.clone());
        self.answers.lock().unwrap().pop_front().unwrap_or(false)
    }
}

/// Vault over `dir/BitLockerPasswords.dat` with the given fakes.
pub fn build_vault(
    dir: &Path,
    scope: &str,
    verifier: Arc<FakeVerifier>,
    confirmer: Arc<ScriptedConfirmer>,
    fallback: FallbackPolicy,
    on_corrupt: CorruptStorePolicy,
) -> PasswordVault {
    let file = PasswordFile::new(dir.join("BitLockerPasswords.dat"), on_corrupt).unwrap();
    let codec = SecretCodec::new(Arc::new(ReversingProtector));
    let gate = ConsentGate::new(verifier, confirmer, fallback);
    PasswordVault::new(file, codec, gate, scope)
}
