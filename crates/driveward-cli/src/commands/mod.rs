//! CLI command implementations.

pub mod config;
pub mod passwords;
pub mod status;
