//! Per-user scope tag.
//!
//! The scope tag names the OS account the process runs as. Ciphertexts are
//! bound to it, so a blob produced under one account does not open under
//! another.

use crate::env::{self, vars};

/// Scope tag used when no account name can be determined.
pub const UNKNOWN_USER: &str = "unknown-user";

/// Resolve the scope tag for the current OS user.
///
/// Checks `USERNAME`, `USER`, then `LOGNAME`.
pub fn current_user_scope() -> String {
    env::first_var(&[vars::USERNAME, vars::USER, vars::LOGNAME])
        .map(|name| name.trim().to_string())
        .unwrap_or_else(|| UNKNOWN_USER.to_string())
}
