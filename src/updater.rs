//! STS Credentials Updater
//!
//! This module ties token acquisition to the credentials file. Long-term
//! credentials live in an ordinary profile section that the user maintains by
//! hand; the temporary credentials obtained with MFA are written into a managed
//! region tagged with a key (the profile name unless overridden).
//!
//! ## File Layout
//!
//! ```ini
//! [work]
//! aws_access_key_id=AKIA...                       # Permanent IAM user access key
//! aws_secret_access_key=...                       # Permanent IAM user secret key
//! mfa_device_arn=arn:aws:iam::123456789012:mfa/me # MFA device ARN
//!
//! # ${{{ key=work [auto update by updsts]
//! [work_sts]
//! aws_access_key_id=ASIA...                       # Temporary access key
//! aws_secret_access_key=...                       # Temporary secret key
//! aws_session_token=...                           # Session token
//! expiration_datetime=2024-01-01T21:00:00+09:00   # Local expiration time
//! # $}}} [auto update by updsts]
//! ```
//!
//! Only the region is ever rewritten. Hand-written profiles, comments and
//! regions owned by other keys keep their exact bytes, and the file keeps its
//! permission bits.

use std::{
    io,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result, ensure};
use log::info;
use serde::Serialize;

use crate::{
    commit,
    credentials::{CredentialBundle, TokenIssuer},
    error::Error,
    profile::ProfileStore,
    region::{self, RegionAction},
};

/// Default session duration in seconds.
pub const DEFAULT_DURATION: u32 = 3600;

/// Receipt of a rewrite, returned for confirmation and logging.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdateResult {
    pub updated_profile_name: String,
    pub aws_access_key_id: String,
    pub aws_token_expiration: String,
}

/// Everything needed to refresh one profile.
#[derive(Debug, Clone)]
pub struct UpdateRequest {
    /// Profile holding the long-term credentials and MFA device.
    pub profile_name: String,
    /// Current code from the MFA device.
    pub totp_code: String,
    /// Session duration in seconds.
    pub duration: u32,
    /// Section written inside the region; `<key>_sts` when absent.
    pub sts_profile_name: Option<String>,
    /// Region key; the profile name when absent.
    pub target_key: Option<String>,
}

/// Resolves the credentials file path, defaulting to `~/.aws/credentials`.
pub fn credentials_path(path: Option<PathBuf>) -> Result<PathBuf> {
    path.filter(|p| !p.as_os_str().is_empty())
        .or_else(|| dirs::home_dir().map(|d| d.join(".aws").join("credentials")))
        .context("Could not determine home directory")
}

/// Section name written into a region: the explicit name if given and
/// non-empty, `<key>_sts` otherwise.
pub fn sts_section_name(key: &str, section: Option<&str>) -> String {
    match section {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => format!("{key}_sts"),
    }
}

/// Region keys are non-empty runs of ASCII letters, digits, `-` and `_`.
pub fn is_valid_key(key: &str) -> bool {
    !key.is_empty()
        && key
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}

/// Section names must stay on the header line: no line breaks and no brackets.
pub fn is_valid_section(name: &str) -> bool {
    !name.contains(['\r', '\n', '[', ']'])
}

/// Checks a region key and section name and resolves the section to write.
///
/// # Arguments
///
/// * `key` - Region key the scanner matches on
/// * `section` - Explicit section name, or `None`/empty for `<key>_sts`
///
/// # Returns
///
/// * `Ok(String)` - The section name to emit inside the region
/// * `Err(io::Error)` - `InvalidInput` when either value could corrupt the file:
///   - A key the scanner could never match again, which would append a fresh
///     region on every run
///   - A section name that would spill onto extra lines, such as an injected
///     end marker
pub fn resolve_target(key: &str, section: Option<&str>) -> io::Result<String> {
    if !is_valid_key(key) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid region key '{key}'"),
        ));
    }
    let section = sts_section_name(key, section);
    if !is_valid_section(&section) {
        return Err(io::Error::new(
            io::ErrorKind::InvalidInput,
            format!("invalid section name {section:?}"),
        ));
    }
    Ok(section)
}

/// Rewrites the region tagged `key` in the file at `path` with `bundle`.
///
/// The region's body is replaced if it exists; otherwise a new region is
/// appended. The file is swapped atomically and keeps its permissions.
///
/// # Arguments
///
/// * `path` - Credentials file to rewrite; it must already exist
/// * `key` - Region key to look for
/// * `section` - Section name written inside the region (`<key>_sts` if absent)
/// * `bundle` - Temporary credentials to write
///
/// # Returns
///
/// * `Ok(UpdateResult)` - Section name, access key ID and expiration written
/// * `Err(io::Error)` - The original file is left intact when:
///   - The key or section name is rejected by [`resolve_target`] (`InvalidInput`)
///   - The file is missing or unreadable (`NotFound`, `PermissionDenied`)
///   - Writing the temp file or renaming it fails
pub fn apply(
    path: &Path,
    key: &str,
    section: Option<&str>,
    bundle: &CredentialBundle,
) -> io::Result<UpdateResult> {
    let section = resolve_target(key, section)?;

    info!("modifying : '{}'", path.display());
    let action = commit::replace_with(path, |input, output| {
        region::rewrite(input, output, key, &section, bundle)
    })?;
    match action {
        RegionAction::Replaced => info!("replaced : key='{key}' section='{section}'"),
        RegionAction::Created => {
            info!("key='{key}' not found in the credential file, added section '{section}'")
        }
    }
    info!("modified  : '{}'", path.display());

    Ok(UpdateResult {
        updated_profile_name: section,
        aws_access_key_id: bundle.access_key_id.clone(),
        aws_token_expiration: bundle.expiration.clone(),
    })
}

/// Obtains fresh session credentials for a profile and writes them into its
/// managed region.
///
/// This performs the complete refresh:
/// 1. Checks the TOTP code, region key and section name
/// 2. Loads the profile's long-term credentials and MFA device from `path`
/// 3. Exchanges them and the code for session credentials through `issuer`
/// 4. Rewrites the managed region in the same file
///
/// Everything that can be checked locally is checked before the code is sent,
/// so a bad request never spends a one-time code.
///
/// # Arguments
///
/// * `issuer` - Source of session credentials (STS in production)
/// * `path` - Credentials file holding the profile and receiving the region
/// * `request` - Profile, code, duration and optional key/section overrides
///
/// # Returns
///
/// * `Ok(UpdateResult)` - What was written, for confirmation output
/// * `Err(anyhow::Error)` - If the file is left untouched because:
///   - The TOTP code is empty ([`Error::MissingTotp`])
///   - The key or section name is invalid (`InvalidInput`)
///   - The profile or one of its required fields is missing
///   - Token acquisition fails
///
/// A failure while rewriting is reported with the file path as context.
pub async fn update_credentials<I: TokenIssuer>(
    issuer: &I,
    path: &Path,
    request: &UpdateRequest,
) -> Result<UpdateResult> {
    ensure!(!request.totp_code.is_empty(), Error::MissingTotp);

    // The region key defaults to the profile that owns the long-term credentials
    let key = request
        .target_key
        .clone()
        .filter(|key| !key.is_empty())
        .unwrap_or_else(|| request.profile_name.clone());
    let section = resolve_target(&key, request.sts_profile_name.as_deref())?;

    let long_term = ProfileStore::load(path)?.long_term(&request.profile_name)?;

    info!(
        "Fetching credentials - Profile: '{}', Duration: {}s",
        request.profile_name, request.duration
    );
    let bundle = issuer
        .issue(&long_term, &request.totp_code, request.duration)
        .await
        .context("Failed to retrieve STS credentials")?;
    info!(
        "Successfully obtained temporary STS credentials for profile '{}'",
        request.profile_name
    );

    // The rewrite is blocking file I/O, so keep it off the async workers
    let target = path.to_path_buf();
    let result = tokio::task::spawn_blocking(move || {
        apply(&target, &key, Some(section.as_str()), &bundle)
    })
    .await
    .context("Credentials rewrite task failed")?
    .with_context(|| format!("Failed to update credentials file '{}'", path.display()))?;

    info!(
        "Credentials for profile '{}' updated successfully. Expires at: {}",
        request.profile_name, result.aws_token_expiration
    );
    Ok(result)
}
