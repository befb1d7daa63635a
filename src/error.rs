//! Errors raised around the rewrite engine and their user-facing wording.

use std::io;

/// Failures of the profile store and token acquisition.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Profile '{0}' not found in the credential file")]
    ProfileNotFound(String),

    #[error("Profile '{profile}' is missing required option '{field}'")]
    MissingField { profile: String, field: &'static str },

    #[error("TOTP token is required to obtain STS token")]
    MissingTotp,

    #[error("STS returned no credentials")]
    NoCredentialsReturned,

    #[error("STS returned an expiration that cannot be represented")]
    InvalidExpiration,
}

/// Maps an error chain to the message shown on the terminal.
///
/// Missing files, permission problems and unknown profiles get a dedicated
/// message; anything else carries the original error text.
pub fn user_message(err: &anyhow::Error) -> String {
    for cause in err.chain() {
        if let Some(io_err) = cause.downcast_ref::<io::Error>() {
            match io_err.kind() {
                io::ErrorKind::NotFound => {
                    return "Error: Credential file not found. Please ensure the file exists or specify a valid path.".to_string();
                }
                io::ErrorKind::PermissionDenied => {
                    return "Error: Permission denied when accessing the credential file. Check your permissions.".to_string();
                }
                _ => {}
            }
        }
        if let Some(Error::ProfileNotFound(profile)) = cause.downcast_ref::<Error>() {
            return format!(
                "Error: Profile name '{profile}' is not found in the credential file. Please check the profile name."
            );
        }
    }
    format!("Error: {err:#}")
}
