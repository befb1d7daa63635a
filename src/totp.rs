//! Sourcing of the MFA code for the `get` command.

use std::{io::Write, process::Command};

use anyhow::Result;
use log::{info, warn};

/// 1Password item holding the TOTP seed of the MFA device.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OnePassword {
    pub account: String,
    pub item: String,
}

impl OnePassword {
    /// Both parts are needed; either one missing disables the lookup.
    pub fn from_parts(account: Option<String>, item: Option<String>) -> Option<Self> {
        match (account, item) {
            (Some(account), Some(item)) => Some(Self { account, item }),
            _ => None,
        }
    }
}

/// A TOTP code is exactly six ASCII digits.
pub fn is_valid_totp(code: &str) -> bool {
    code.len() == 6 && code.chars().all(|c| c.is_ascii_digit())
}

/// Picks the MFA code: an explicit code first, then 1Password, then a prompt.
///
/// 1Password failures (missing CLI, locked vault, malformed output) fall back
/// to the prompt with a warning instead of failing.
pub fn resolve(code: Option<String>, one_password: Option<OnePassword>) -> Result<String> {
    if let Some(code) = code.map(|c| c.trim().to_string()).filter(|c| !c.is_empty()) {
        return Ok(code);
    }

    if let Some(op) = one_password {
        if let Some(code) = from_one_password(&op) {
            info!("Retrieved MFA token from 1Password");
            return Ok(code);
        }
        warn!("Failed to get token from 1Password, falling back to manual input");
    }

    prompt()
}

fn from_one_password(op: &OnePassword) -> Option<String> {
    let output = Command::new("op")
        .args(["item", "get", "--account", &op.account, &op.item, "--otp"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let otp = String::from_utf8_lossy(&output.stdout).trim().to_string();
    is_valid_totp(&otp).then_some(otp)
}

fn prompt() -> Result<String> {
    print!("Enter AWS MFA code for device: ");
    std::io::stdout().flush()?;

    let mut input = String::new();
    std::io::stdin().read_line(&mut input)?;
    Ok(input.trim().to_string())
}
