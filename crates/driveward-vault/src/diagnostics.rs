//! Failure reporting for swallowed vault errors.
//!
//! The facade never returns an error to its caller, so every failure it
//! absorbs is routed through a [`DiagnosticSink`] instead. The default sink
//! writes a structured `tracing` event carrying the failure kind.

use std::fmt;

use tracing::{debug, error, warn};

/// Broad classification of an absorbed failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureKind {
    /// The user declined, cancelled, or failed verification.
    GateDenied,
    /// A stored blob could not be decrypted under the current scope.
    Decryption,
    /// The store file could not be read, parsed, or written.
    Persistence,
    /// The caller passed an unusable drive identifier.
    InvalidInput,
    /// Anything else.
    Unexpected,
}

impl FailureKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::GateDenied => "gate_denied",
            Self::Decryption => "decryption",
            Self::Persistence => "persistence",
            Self::InvalidInput => "invalid_input",
            Self::Unexpected => "unexpected",
        }
    }
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Vault operation names used in diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Save,
    Get,
    Remove,
    HasSaved,
    ListDrives,
    Status,
}

impl Operation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Save => "save",
            Self::Get => "get",
            Self::Remove => "remove",
            Self::HasSaved => "has_saved",
            Self::ListDrives => "list_drives",
            Self::Status => "status",
        }
    }
}

/// One absorbed failure.
#[derive(Debug, Clone)]
pub struct VaultFailure {
    pub operation: Operation,
    pub drive_id: Option<String>,
    pub kind: FailureKind,
    /// Human-readable cause. Never contains secret material.
    pub detail: String,
}

/// Receiver of absorbed failures.
pub trait DiagnosticSink: Send + Sync {
    fn record(&self, failure: &VaultFailure);
}

/// Default sink: one `tracing` event per failure.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

impl DiagnosticSink for TracingSink {
    fn record(&self, failure: &VaultFailure) {
        let drive = failure.drive_id.as_deref().unwrap_or("-");
        let op = failure.operation.as_str();
        let kind = failure.kind.as_str();

        match failure.kind {
            // Declining a prompt is ordinary user behaviour.
            FailureKind::GateDenied => {
                debug!(op, drive, kind, detail = %failure.detail, "vault operation refused")
            }
            FailureKind::Persistence => {
                error!(op, drive, kind, detail = %failure.detail, "vault operation failed")
            }
            FailureKind::Decryption | FailureKind::InvalidInput | FailureKind::Unexpected => {
                warn!(op, drive, kind, detail = %failure.detail, "vault operation failed")
            }
        }
    }
}
