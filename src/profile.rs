//! Read-only view of the profiles stored in the credentials file.
//!
//! A profile used for token acquisition looks like:
//!
//! ```ini
//! [work]
//! aws_access_key_id=AKIA...
//! aws_secret_access_key=...
//! mfa_device_arn=arn:aws:iam::123456789012:mfa/user
//! totp_secret_name=work-totp
//! ```

use std::{fs, path::Path};

use anyhow::{Context, Result, anyhow};
use configparser::ini::Ini;
use log::{debug, info};
use serde::Serialize;

use crate::{credentials::LongTermCredentials, error::Error, mask::mask};

/// Placeholder shown for fields a profile does not define.
pub const NOT_DEFINED: &str = "(not defined)";

/// Display record of one profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProfileInfo {
    pub profile_name: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub aws_session_token: String,
    pub mfa_device_arn: String,
    pub totp_secret_name: String,
    pub expiration_datetime: String,
}

pub struct ProfileStore {
    ini: Ini,
}

impl ProfileStore {
    /// Reads and parses the credentials file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        debug!("Using credential file: {}", path.display());
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read credentials file '{}'", path.display()))?;
        Self::parse(content)
    }

    pub fn parse(content: String) -> Result<Self> {
        let mut ini = Ini::new_cs();
        ini.read(content)
            .map_err(|e| anyhow!("Failed to parse credentials: {e}"))?;
        Ok(Self { ini })
    }

    fn has_profile(&self, profile: &str) -> bool {
        self.ini.sections().iter().any(|section| section == profile)
    }

    fn value(&self, profile: &str, field: &str) -> Option<String> {
        self.ini
            .get(profile, field)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    /// Loads the long-term key pair and MFA device of `profile`.
    pub fn long_term(&self, profile: &str) -> Result<LongTermCredentials, Error> {
        if !self.has_profile(profile) {
            return Err(Error::ProfileNotFound(profile.to_string()));
        }

        let get = |field| {
            self.value(profile, field).ok_or_else(|| Error::MissingField {
                profile: profile.to_string(),
                field,
            })
        };

        let credentials = LongTermCredentials::new(
            get("aws_access_key_id")?,
            get("aws_secret_access_key")?,
            get("mfa_device_arn")?,
        );
        debug!("Using profile '{profile}' with {credentials}");
        Ok(credentials)
    }

    /// Describes `profile`, masking the secret key and session token when
    /// `masked` is set.
    pub fn info(&self, profile: &str, masked: bool) -> Result<ProfileInfo, Error> {
        if !self.has_profile(profile) {
            return Err(Error::ProfileNotFound(profile.to_string()));
        }

        let plain = |field| {
            self.value(profile, field)
                .unwrap_or_else(|| NOT_DEFINED.to_string())
        };
        let secret = |field| {
            self.value(profile, field)
                .map(|value| if masked { mask(&value) } else { value })
                .unwrap_or_else(|| NOT_DEFINED.to_string())
        };

        Ok(ProfileInfo {
            profile_name: profile.to_string(),
            aws_access_key_id: plain("aws_access_key_id"),
            aws_secret_access_key: secret("aws_secret_access_key"),
            aws_session_token: secret("aws_session_token"),
            mfa_device_arn: plain("mfa_device_arn"),
            totp_secret_name: plain("totp_secret_name"),
            expiration_datetime: plain("expiration_datetime"),
        })
    }

    /// Describes every profile in file order.
    pub fn list(&self, masked: bool) -> Result<Vec<ProfileInfo>, Error> {
        let profiles = self
            .ini
            .sections()
            .iter()
            .map(|section| self.info(section, masked))
            .collect::<Result<Vec<_>, _>>()?;

        if profiles.is_empty() {
            info!("No valid profiles found in the credentials file.");
        } else {
            info!("Found {} profiles in the credentials file.", profiles.len());
        }
        Ok(profiles)
    }
}
