use std::{fmt, future::Future};

use anyhow::{Context, Result};
use aws_config::Region;
use aws_sdk_sts::{Client, config::Credentials};
use chrono::{DateTime, Local, Utc};
use log::debug;

use crate::error::Error;

/// Region used for STS when neither the environment nor the AWS config names one.
const DEFAULT_STS_REGION: &str = "us-east-1";

/// Temporary credentials as written into a managed region.
///
/// Fields left empty are written as empty values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CredentialBundle {
    pub access_key_id: String,
    pub secret_access_key: String,
    pub session_token: String,
    /// ISO-8601 timestamp in local time.
    pub expiration: String,
}

/// Long-lived key pair and MFA device of a profile.
#[derive(Clone)]
pub struct LongTermCredentials {
    credentials: Credentials,
    mfa_device: String,
}

impl LongTermCredentials {
    pub fn new(access_key_id: String, secret_access_key: String, mfa_device: String) -> Self {
        Self {
            credentials: Credentials::new(access_key_id, secret_access_key, None, None, "updsts"),
            mfa_device,
        }
    }
}

impl fmt::Display for LongTermCredentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "access key '{}' with MFA device '{}'",
            self.credentials.access_key_id(),
            self.mfa_device
        )
    }
}

/// Exchanges long-term credentials and a TOTP code for a [`CredentialBundle`].
pub trait TokenIssuer {
    fn issue(
        &self,
        long_term: &LongTermCredentials,
        totp: &str,
        duration: u32,
    ) -> impl Future<Output = Result<CredentialBundle>> + Send;
}

/// [`TokenIssuer`] backed by STS `GetSessionToken`.
pub struct StsIssuer;

impl TokenIssuer for StsIssuer {
    async fn issue(
        &self,
        long_term: &LongTermCredentials,
        totp: &str,
        duration: u32,
    ) -> Result<CredentialBundle> {
        let config = aws_config::from_env()
            .credentials_provider(long_term.credentials.clone())
            .load()
            .await;

        let region = config
            .region()
            .cloned()
            .unwrap_or_else(|| Region::new(DEFAULT_STS_REGION));
        debug!("Using STS region: {region}");

        let sts_config = aws_sdk_sts::config::Builder::from(&config)
            .region(region)
            .build();

        let session = Client::from_conf(sts_config)
            .get_session_token()
            .duration_seconds(duration as i32)
            .serial_number(&long_term.mfa_device)
            .token_code(totp)
            .send()
            .await
            .context("STS GetSessionToken request failed")?
            .credentials()
            .cloned()
            .ok_or(Error::NoCredentialsReturned)?;

        Ok(CredentialBundle {
            access_key_id: session.access_key_id().to_string(),
            secret_access_key: session.secret_access_key().to_string(),
            session_token: session.session_token().to_string(),
            expiration: local_expiration(session.expiration())?,
        })
    }
}

/// Renders an STS expiration (UTC) as an ISO-8601 string in the local timezone.
pub fn local_expiration(expiration: &aws_smithy_types::DateTime) -> Result<String, Error> {
    DateTime::<Utc>::from_timestamp(expiration.secs(), expiration.subsec_nanos())
        .map(|utc| utc.with_timezone(&Local).to_rfc3339())
        .ok_or(Error::InvalidExpiration)
}
