//! Consent-gated password storage for Driveward.
//!
//! Drive passwords are encrypted with a user-scoped [`DataProtector`] and
//! kept in a single JSON file. Every read, write, or removal first passes
//! through a [`ConsentGate`]. Callers use [`PasswordVault`]; the other
//! modules are its parts, exposed for embedding and testing.

pub mod codec;
pub mod consent;
pub mod crypto;
pub mod diagnostics;
pub mod error;
pub mod keychain;
pub mod protector;
pub mod store;
pub mod types;
pub mod vault;

pub use codec::SecretCodec;
pub use consent::{
    AvailabilityState, CommandVerifier, ConsentGate, ConsentOutcome, ConsentVerifier,
    DeclineConfirmer, Denial, FallbackCause, FallbackConfirmer, FallbackPrompt, NoVerifier,
    VerificationResult,
};
pub use diagnostics::{DiagnosticSink, FailureKind, Operation, TracingSink, VaultFailure};
pub use error::{Result, VaultError};
pub use protector::{DataProtector, KeyedProtector};
pub use store::{PasswordFile, StoredPasswords};
pub use types::{validate_drive_id, SecretEntry, VaultStatus};
pub use vault::PasswordVault;
