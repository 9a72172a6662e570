//! External verifier program.
//!
//! Runs a configured program with the prompt reason as its last argument.
//! Exit status 0 means the user was verified; any other status means not
//! verified. A program that cannot be spawned is a verifier error, which the
//! gate treats like an unavailable verifier.

use std::path::{Path, PathBuf};
use std::process::Stdio;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::debug;

use super::{AvailabilityState, ConsentVerifier, VerificationResult};
use crate::error::{Result, VaultError};

/// Verifier backed by an external program.
#[derive(Debug, Clone)]
pub struct CommandVerifier {
    program: String,
    args: Vec<String>,
}

impl CommandVerifier {
    pub fn new(program: impl Into<String>, args: Vec<String>) -> Self {
        Self {
            program: program.into(),
            args,
        }
    }

    /// Build from a configured argv. `None` for an empty argv.
    pub fn from_argv(argv: &[String]) -> Option<Self> {
        let (program, args) = argv.split_first()?;
        Some(Self::new(program.clone(), args.to_vec()))
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    fn resolve(&self) -> Option<PathBuf> {
        find_program(&self.program)
    }
}

/// Locate `program` directly or on `PATH`.
fn find_program(program: &str) -> Option<PathBuf> {
    let direct = Path::new(program);
    if direct.components().count() > 1 || direct.is_absolute() {
        return direct.is_file().then(|| direct.to_path_buf());
    }

    let path_var = std::env::var_os("PATH")?;
    std::env::split_paths(&path_var).find_map(|dir| {
        let candidate = dir.join(program);
        if candidate.is_file() {
            return Some(candidate);
        }
        if cfg!(windows) {
            let exe = dir.join(format!("{program}.exe"));
            if exe.is_file() {
                return Some(exe);
            }
        }
        None
    })
}

#[async_trait]
impl ConsentVerifier for CommandVerifier {
    async fn check_availability(&self) -> Result<AvailabilityState> {
        Ok(match self.resolve() {
            Some(_) => AvailabilityState::Available,
            None => AvailabilityState::NotConfigured,
        })
    }

    async fn request_verification(&self, reason: &str) -> Result<VerificationResult> {
        let program = self
            .resolve()
            .ok_or_else(|| VaultError::Verifier(format!("verifier program not found: {}", self.program)))?;

        debug!(program = %program.display(), "running verifier program");
        let output = Command::new(&program)
            .args(&self.args)
            .arg(reason)
            .stdin(Stdio::inherit())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| VaultError::Verifier(format!("failed to run {}: {e}", program.display())))?;

        if output.status.success() {
            Ok(VerificationResult::Verified)
        } else {
            debug!(
                status = ?output.status.code(),
                stderr = %String::from_utf8_lossy(&output.stderr).trim(),
                "verifier program did not verify"
            );
            Ok(VerificationResult::NotVerified)
        }
    }
}
