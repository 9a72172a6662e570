//! Status command.

use std::sync::Arc;

use console::style;
use driveward_core::config::Config;
use driveward_vault::{PasswordVault, VaultStatus};

use crate::prompt::ConsoleConfirmer;

/// `driveward status`
pub async fn run(config: &Config) -> anyhow::Result<()> {
    let vault = PasswordVault::from_config(config, Arc::new(ConsoleConfirmer))
        .map_err(|e| anyhow::anyhow!("Failed to open password store: {}", e))?;
    let status = vault.status().await;

    for (label, value) in render(&status, vault.scope()) {
        println!("{:<12} {}", style(label).bold(), value);
    }
    Ok(())
}

fn render(status: &VaultStatus, scope: &str) -> Vec<(&'static str, String)> {
    let verifier = if status.availability.is_available() {
        "available".to_string()
    } else {
        format!("{} ({})", status.availability, status.availability.message())
    };
    let entries = match status.saved_drives {
        Some(n) => n.to_string(),
        None => "unreadable".to_string(),
    };

    vec![
        ("Verifier", verifier),
        ("User scope", scope.to_string()),
        ("Store", status.store_path.display().to_string()),
        ("Saved", entries),
    ]
}
