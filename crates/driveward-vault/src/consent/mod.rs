//! Consent gate.
//!
//! Every password read, write, or removal needs a fresh confirmation that
//! the user is present. The gate asks the platform [`ConsentVerifier`]
//! first. When the verifier is unavailable or errors, it falls back to an
//! explicit yes/no from a [`FallbackConfirmer`], or refuses outright under
//! [`FallbackPolicy::Deny`]. A fallback grant is weaker than a verified one
//! and is logged separately.
//!
//! Nothing is cached: each call to [`ConsentGate::authorize`] prompts again.

mod command;

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use driveward_core::config::FallbackPolicy;
use tracing::{debug, info, warn};

use crate::error::{Result, VaultError};

pub use command::CommandVerifier;

/// Whether the platform verifier can run right now.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AvailabilityState {
    Available,
    NoDevice,
    NotConfigured,
    DisabledByPolicy,
    DeviceBusy,
    Unknown,
}

impl AvailabilityState {
    pub fn is_available(&self) -> bool {
        matches!(self, Self::Available)
    }

    /// One-line explanation shown in the fallback prompt.
    pub fn message(&self) -> &'static str {
        match self {
            Self::Available => "Biometric verification is available.",
            Self::NoDevice => "No biometric device found.",
            Self::NotConfigured => "Biometric verification is not set up for this user.",
            Self::DisabledByPolicy => "Biometric verification is disabled by policy.",
            Self::DeviceBusy => "Biometric device is busy.",
            Self::Unknown => "Biometric verification is not available.",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "available",
            Self::NoDevice => "no_device",
            Self::NotConfigured => "not_configured",
            Self::DisabledByPolicy => "disabled_by_policy",
            Self::DeviceBusy => "device_busy",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for AvailabilityState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of one verification prompt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerificationResult {
    Verified,
    Canceled,
    NotVerified,
}

/// Platform user-verification service.
#[async_trait]
pub trait ConsentVerifier: Send + Sync {
    async fn check_availability(&self) -> Result<AvailabilityState>;

    /// Show the platform prompt with `reason`. Blocks until the user acts
    /// or the platform times out.
    async fn request_verification(&self, reason: &str) -> Result<VerificationResult>;
}

/// Why the gate fell back to a plain confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackCause {
    Unavailable(AvailabilityState),
    VerifierError(String),
}

/// What the fallback confirmer shows the user.
#[derive(Debug, Clone)]
pub struct FallbackPrompt {
    pub reason: String,
    pub cause: FallbackCause,
}

impl FallbackPrompt {
    pub fn title(&self) -> &'static str {
        match self.cause {
            FallbackCause::Unavailable(_) => "Biometric Verification Not Available",
            FallbackCause::VerifierError(_) => "Authentication Error",
        }
    }

    pub fn message(&self) -> String {
        let headline = match &self.cause {
            FallbackCause::Unavailable(state) => state.message().to_string(),
            FallbackCause::VerifierError(err) => format!("Biometric verification failed: {err}"),
        };
        format!(
            "{headline}\n\n{}\n\nContinue with basic authentication?",
            self.reason
        )
    }
}

/// Asks the user for an explicit yes/no when verification cannot run.
#[async_trait]
pub trait FallbackConfirmer: Send + Sync {
    async fn confirm(&self, prompt: &FallbackPrompt) -> bool;
}

/// Verifier for hosts with no user-verification service.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoVerifier;

#[async_trait]
impl ConsentVerifier for NoVerifier {
    async fn check_availability(&self) -> Result<AvailabilityState> {
        Ok(AvailabilityState::NoDevice)
    }

    async fn request_verification(&self, _reason: &str) -> Result<VerificationResult> {
        Err(VaultError::Verifier("no user-verification service on this host".to_string()))
    }
}

/// Confirmer that always declines.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeclineConfirmer;

#[async_trait]
impl FallbackConfirmer for DeclineConfirmer {
    async fn confirm(&self, _prompt: &FallbackPrompt) -> bool {
        false
    }
}

/// Outcome of one pass through the gate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConsentOutcome {
    /// The platform verifier confirmed the user.
    Verified,
    /// The user said yes to the fallback confirmation.
    FallbackConfirmed(FallbackCause),
    Denied(Denial),
}

/// Why consent was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// The verifier ran and did not verify the user.
    NotVerified(VerificationResult),
    /// The user declined the fallback confirmation.
    FallbackDeclined(FallbackCause),
    /// Fallback is disabled by configuration.
    FallbackDisabled(FallbackCause),
}

impl ConsentOutcome {
    pub fn is_granted(&self) -> bool {
        !matches!(self, Self::Denied(_))
    }
}

impl fmt::Display for Denial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotVerified(result) => write!(f, "verification result {result:?}"),
            Self::FallbackDeclined(cause) => write!(f, "fallback declined ({})", cause_label(cause)),
            Self::FallbackDisabled(cause) => write!(f, "fallback disabled ({})", cause_label(cause)),
        }
    }
}

fn cause_label(cause: &FallbackCause) -> String {
    match cause {
        FallbackCause::Unavailable(state) => state.to_string(),
        FallbackCause::VerifierError(err) => format!("verifier error: {err}"),
    }
}

/// Verifier plus fallback, applied before every secret access.
#[derive(Clone)]
pub struct ConsentGate {
    verifier: Arc<dyn ConsentVerifier>,
    confirmer: Arc<dyn FallbackConfirmer>,
    fallback: FallbackPolicy,
}

impl ConsentGate {
    pub fn new(
        verifier: Arc<dyn ConsentVerifier>,
        confirmer: Arc<dyn FallbackConfirmer>,
        fallback: FallbackPolicy,
    ) -> Self {
        Self {
            verifier,
            confirmer,
            fallback,
        }
    }

    /// Query the verifier. Errors read as [`AvailabilityState::Unknown`].
    pub async fn check_availability(&self) -> AvailabilityState {
        match self.verifier.check_availability().await {
            Ok(state) => state,
            Err(e) => {
                warn!("verifier availability check failed: {e}");
                AvailabilityState::Unknown
            }
        }
    }

    /// `true` only when the user was verified or confirmed the fallback.
    pub async fn request_verification(&self, reason: &str) -> bool {
        self.authorize(reason).await.is_granted()
    }

    /// Run the gate once for `reason`.
    pub async fn authorize(&self, reason: &str) -> ConsentOutcome {
        let availability = match self.verifier.check_availability().await {
            Ok(state) => state,
            Err(e) => return self.fall_back(reason, FallbackCause::VerifierError(e.to_string())).await,
        };

        if !availability.is_available() {
            return self
                .fall_back(reason, FallbackCause::Unavailable(availability))
                .await;
        }

        match self.verifier.request_verification(reason).await {
            Ok(VerificationResult::Verified) => {
                info!(consent = "verified", reason, "user verified");
                ConsentOutcome::Verified
            }
            Ok(result) => {
                debug!(consent = "denied", reason, ?result, "user not verified");
                ConsentOutcome::Denied(Denial::NotVerified(result))
            }
            Err(e) => {
                self.fall_back(reason, FallbackCause::VerifierError(e.to_string()))
                    .await
            }
        }
    }

    async fn fall_back(&self, reason: &str, cause: FallbackCause) -> ConsentOutcome {
        if self.fallback == FallbackPolicy::Deny {
            debug!(consent = "denied", reason, cause = %cause_label(&cause), "fallback disabled");
            return ConsentOutcome::Denied(Denial::FallbackDisabled(cause));
        }

        let prompt = FallbackPrompt {
            reason: reason.to_string(),
            cause,
        };
        if self.confirmer.confirm(&prompt).await {
            warn!(
                consent = "fallback",
                reason,
                cause = %cause_label(&prompt.cause),
                "access granted by fallback confirmation, not by verification"
            );
            ConsentOutcome::FallbackConfirmed(prompt.cause)
        } else {
            debug!(consent = "denied", reason, "fallback confirmation declined");
            ConsentOutcome::Denied(Denial::FallbackDeclined(prompt.cause))
        }
    }
}
