//! AWS STS Credential Updater
//!
//! Refreshes temporary AWS credentials with an MFA code and keeps them in a
//! machine-editable region of the credentials file.
//!
//! The program performs the following operations:
//! 1. Parses command-line arguments and initializes logging
//! 2. Resolves the MFA code (argument, 1Password, or manual input)
//! 3. Exchanges the profile's long-term credentials and the code for session
//!    credentials via STS
//! 4. Rewrites the profile's managed region, leaving the rest of the file as is
//!
//! `list` shows the stored profiles with secrets masked, and `mcp` exposes the
//! same operations as tools to an automation host over stdio.

use std::{path::Path, process::ExitCode};

use anyhow::Result;
use clap::Parser;
use log::debug;

mod cli;
mod commit;
mod credentials;
mod error;
mod logging;
mod mask;
mod mcp;
mod profile;
mod region;
mod totp;
mod updater;

use cli::{Args, Command, GetArgs, McpArgs};
use credentials::StsIssuer;
use profile::{ProfileInfo, ProfileStore};
use totp::OnePassword;
use updater::UpdateRequest;

/// Entry point for the credential updater.
///
/// Parses arguments, installs logging, then runs the selected command.
///
/// # Returns
/// * `ExitCode::SUCCESS` - The command completed
/// * `ExitCode::FAILURE` - Logging could not be set up or the command failed;
///   a short user-facing message is printed to stderr
#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();

    if let Err(e) = logging::init(args.verbose, args.log_file.as_deref()) {
        eprintln!("Failed to initialize logging: {e:#}");
        return ExitCode::FAILURE;
    }

    match run(args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            // The user message goes to stderr; keep the full chain for -vv
            debug!("{err:#}");
            eprintln!("{}", error::user_message(&err));
            ExitCode::FAILURE
        }
    }
}

async fn run(args: Args) -> Result<()> {
    let Args {
        credentials_file,
        command,
        ..
    } = args;

    match command {
        Command::Get(get) => {
            let path = updater::credentials_path(credentials_file)?;
            get_credentials(get, &path).await
        }
        Command::List => {
            let path = updater::credentials_path(credentials_file)?;
            print_profiles(&ProfileStore::load(&path)?.list(true)?);
            Ok(())
        }
        Command::Mcp(McpArgs { server: true }) => mcp::serve().await,
        Command::Mcp(McpArgs { server: false }) => {
            mcp::print_tools();
            Ok(())
        }
    }
}

/// Refreshes one profile's session credentials and prints what was written.
///
/// # Arguments
/// * `get` - Options of the `get` subcommand
/// * `path` - Resolved credentials file
///
/// # Errors
/// This function will return an error if:
/// * No valid MFA code can be obtained
/// * The key, section name or profile is invalid
/// * STS rejects the request
/// * The credentials file cannot be rewritten
async fn get_credentials(get: GetArgs, path: &Path) -> Result<()> {
    let GetArgs {
        profile_name,
        totp_token,
        duration,
        sts_profile_name,
        target_key,
        op_account,
        op_item_name,
    } = get;

    // Use the given code, else ask 1Password, else prompt
    let totp_code = totp::resolve(totp_token, OnePassword::from_parts(op_account, op_item_name))?;
    let request = UpdateRequest {
        profile_name,
        totp_code,
        duration,
        sts_profile_name,
        target_key,
    };

    // Exchange the code for session credentials and rewrite the managed region
    let result = updater::update_credentials(&StsIssuer, path, &request).await?;
    println!(
        "Credentials for profile '{}' updated successfully.",
        request.profile_name
    );
    println!("  Updated Profile     : {}", result.updated_profile_name);
    println!("  Access Key ID       : {}", result.aws_access_key_id);
    println!("  Expiration DateTime : {}", result.aws_token_expiration);
    Ok(())
}

fn print_profiles(profiles: &[ProfileInfo]) {
    if profiles.is_empty() {
        println!("No profiles found.");
        return;
    }
    for profile in profiles {
        println!("Profile Name: {}", profile.profile_name);
        println!("  Access Key ID       : {}", profile.aws_access_key_id);
        println!("  Secret Key          : {}", profile.aws_secret_access_key);
        println!("  Session Token       : {}", profile.aws_session_token);
        println!("  Expiration DateTime : {}", profile.expiration_datetime);
        println!("  MFA Device ARN      : {}", profile.mfa_device_arn);
        println!("  TOTP Secret Name    : {}", profile.totp_secret_name);
        println!();
    }
}
