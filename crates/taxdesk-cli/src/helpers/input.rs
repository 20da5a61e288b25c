//! Interactive input helpers.

use std::io::IsTerminal;

use dialoguer::{Confirm, Input, Password};

use crate::constants::env_vars;
use crate::errors::CliError;

/// Whether prompts may be shown.
pub fn can_prompt(no_input: bool) -> bool {
    !no_input && std::io::stdin().is_terminal()
}

/// Use `value`, or prompt for it when interactive.
pub fn text_or_prompt(
    value: Option<&str>,
    prompt: &str,
    interactive: bool,
) -> anyhow::Result<String> {
    if let Some(v) = value.filter(|v| !v.trim().is_empty()) {
        return Ok(v.to_string());
    }
    if !interactive {
        return Err(CliError::invalid_input(format!(
            "{} is required (pass it as a flag when not on a TTY)",
            prompt
        ))
        .into());
    }
    Input::<String>::new()
        .with_prompt(prompt)
        .interact_text()
        .map_err(|e| anyhow::anyhow!("Failed to read {}: {}", prompt.to_lowercase(), e))
}

/// Password from the flag, TAXDESK_PASSWORD, or a hidden prompt.
pub fn password_or_prompt(value: Option<&str>, interactive: bool) -> anyhow::Result<String> {
    if let Some(v) = value.filter(|v| !v.is_empty()) {
        return Ok(v.to_string());
    }
    if let Ok(v) = std::env::var(env_vars::PASSWORD) {
        if !v.is_empty() {
            return Ok(v);
        }
    }
    if !interactive {
        return Err(CliError::invalid_input(format!(
            "No password provided and no TTY available. Set {}.",
            env_vars::PASSWORD
        ))
        .into());
    }
    Password::new()
        .with_prompt("Password")
        .interact()
        .map_err(|e| anyhow::anyhow!("Failed to read password: {}", e))
}

/// Ask before a destructive action. Non-interactive sessions skip the prompt.
pub fn confirm(prompt: &str, skip: bool, quiet: bool) -> anyhow::Result<bool> {
    if skip || quiet || !std::io::stdin().is_terminal() {
        return Ok(true);
    }
    Ok(Confirm::new().with_prompt(prompt).default(false).interact()?)
}
