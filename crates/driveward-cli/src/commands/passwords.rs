//! Drive password commands.
//!
//! Each command builds a [`PasswordVault`] from the loaded config and makes
//! one facade call. The facade reports only success or failure; the detailed
//! cause is in the log.

use std::sync::Arc;

use driveward_core::config::Config;
use driveward_core::SecretString;
use driveward_vault::PasswordVault;

use crate::prompt::{self, ConsoleConfirmer};

fn open_vault(config: &Config) -> anyhow::Result<PasswordVault> {
    PasswordVault::from_config(config, Arc::new(ConsoleConfirmer))
        .map_err(|e| anyhow::anyhow!("Failed to open password store: {}", e))
}

/// `driveward save <drive> [--password]`
pub async fn save(config: &Config, drive: &str, password: Option<String>) -> anyhow::Result<()> {
    let password = match password {
        Some(p) => SecretString::from(p),
        None => prompt::prompt_password(drive)?,
    };
    if password.is_empty() {
        anyhow::bail!("Password must not be empty");
    }

    let vault = open_vault(config)?;
    if !vault.save(drive, password.expose_secret()).await {
        anyhow::bail!("Could not save password for drive {drive} (authentication cancelled or failed, or the store is unavailable; run with -v for details)");
    }

    println!("Password for drive {drive} saved.");
    Ok(())
}

/// `driveward get <drive>`
pub async fn get(config: &Config, drive: &str) -> anyhow::Result<()> {
    let vault = open_vault(config)?;
    match vault.get(drive).await {
        Some(secret) => {
            println!("{}", secret.expose_secret());
            Ok(())
        }
        None => anyhow::bail!("No password available for drive {drive} (not saved, authentication cancelled, or decryption failed)"),
    }
}

/// `driveward remove <drive>`
pub async fn remove(config: &Config, drive: &str) -> anyhow::Result<()> {
    let vault = open_vault(config)?;
    if !vault.remove(drive).await {
        anyhow::bail!("Nothing removed for drive {drive} (not saved, or authentication cancelled)");
    }

    println!("Password for drive {drive} removed.");
    Ok(())
}

/// `driveward has <drive>`
pub async fn has(config: &Config, drive: &str) -> anyhow::Result<()> {
    let vault = open_vault(config)?;
    if vault.has_saved(drive).await {
        println!("yes");
    } else {
        println!("no");
    }
    Ok(())
}

/// `driveward list`
pub async fn list(config: &Config) -> anyhow::Result<()> {
    let vault = open_vault(config)?;
    let drives = vault.list_drives().await;

    if drives.is_empty() {
        println!("No saved drive passwords.");
    } else {
        for drive in &drives {
            println!("{drive}");
        }
    }
    Ok(())
}
