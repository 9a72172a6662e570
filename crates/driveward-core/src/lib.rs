//! # driveward-core
//!
//! Core types, configuration, and utilities for Driveward.
//!
//! This crate provides shared functionality used across all Driveward crates:
//!
//! - **Configuration**: Loading, validation, and persistence of `driveward.json5`
//! - **Paths**: Resolution of the per-user application directory and store file
//! - **Utilities**: Environment handling, the current-user scope tag, and
//!   zeroizing secret strings

pub mod config;
pub mod env;
pub mod error;
pub mod paths;
pub mod scope;
pub mod secret;

// Re-exports for convenience
pub use config::Config;
pub use error::ConfigError;
pub use secret::SecretString;
