//! Terminal prompts.

use std::io::{self, BufRead, Write};

use async_trait::async_trait;
use console::style;
use driveward_core::SecretString;
use driveward_vault::{FallbackConfirmer, FallbackPrompt};
use tracing::warn;

/// Fallback confirmer that asks on the terminal. Anything but `y`/`yes`
/// declines.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleConfirmer;

#[async_trait]
impl FallbackConfirmer for ConsoleConfirmer {
    async fn confirm(&self, prompt: &FallbackPrompt) -> bool {
        let title = prompt.title();
        let message = prompt.message();

        match tokio::task::spawn_blocking(move || ask(title, &message)).await {
            Ok(Ok(answer)) => answer,
            Ok(Err(e)) => {
                warn!("fallback confirmation failed: {e}");
                false
            }
            Err(e) => {
                warn!("fallback confirmation task failed: {e}");
                false
            }
        }
    }
}

fn ask(title: &str, message: &str) -> io::Result<bool> {
    let mut stderr = io::stderr();
    writeln!(stderr)?;
    writeln!(stderr, "  {}", style(title).yellow().bold())?;
    for line in message.lines() {
        writeln!(stderr, "  {line}")?;
    }
    write!(stderr, "  [y/N]: ")?;
    stderr.flush()?;

    let mut input = String::new();
    io::stdin().lock().read_line(&mut input)?;
    Ok(is_yes(&input))
}

/// Whether a typed answer means yes. Blank means no.
pub fn is_yes(answer: &str) -> bool {
    matches!(answer.trim().to_lowercase().as_str(), "y" | "yes")
}

/// Read a password without echo.
pub fn prompt_password(drive: &str) -> anyhow::Result<SecretString> {
    let password = rpassword::prompt_password(format!("Password for drive {drive}: "))
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))?;
    Ok(SecretString::from(password))
}
