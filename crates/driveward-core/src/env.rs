//! Environment variable handling.

use std::env;

/// Get an environment variable, returning None if not set or empty.
pub fn get_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

/// Return the first of `names` that is set and non-empty.
pub fn first_var(names: &[&str]) -> Option<String> {
    names.iter().find_map(|name| get_var(name))
}

/// Common environment variable names.
pub mod vars {
    /// Application directory override.
    pub const DRIVEWARD_HOME: &str = "DRIVEWARD_HOME";

    /// Config file override.
    pub const DRIVEWARD_CONFIG: &str = "DRIVEWARD_CONFIG";

    /// Log filter (takes precedence over `RUST_LOG`).
    pub const DRIVEWARD_LOG: &str = "DRIVEWARD_LOG";

    /// Hex-encoded master key for the portable protector.
    pub const DRIVEWARD_MASTER_KEY: &str = "DRIVEWARD_MASTER_KEY";

    /// Account name on Windows.
    pub const USERNAME: &str = "USERNAME";

    /// Account name on Unix-likes.
    pub const USER: &str = "USER";

    /// Login name fallback.
    pub const LOGNAME: &str = "LOGNAME";
}
