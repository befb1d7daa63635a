//! Command-line interface definitions.

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand};

use crate::updater::DEFAULT_DURATION;

/// AWS STS credential updater.
///
/// Obtains temporary session credentials with an MFA code and writes them into
/// a managed region of the credentials file, leaving every other line as is.
#[derive(Debug, Parser)]
#[command(author, version, about)]
pub struct Args {
    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Path to the credential file where profiles are stored [default: ~/.aws/credentials]
    #[arg(short, long, global = true, env = "AWS_SHARED_CREDENTIALS_FILE")]
    pub credentials_file: Option<PathBuf>,

    /// Append log output to this file instead of stderr
    #[arg(long, global = true, env = "UPDSTS_LOG_FILE")]
    pub log_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Get/Update new sts token
    Get(GetArgs),
    /// List all profiles with secrets masked
    List,
    /// Run or inspect the tool server for automation hosts
    Mcp(McpArgs),
}

#[derive(Debug, clap::Args)]
pub struct GetArgs {
    /// Profile holding the long-term credentials and MFA device
    #[arg(short = 'n', long)]
    pub profile_name: String,

    /// MFA TOTP code; prompted for when absent
    #[arg(short, long)]
    pub totp_token: Option<String>,

    /// Session duration in seconds (900-129600)
    #[arg(
        short,
        long,
        env = "UPDSTS_DURATION",
        default_value_t = DEFAULT_DURATION,
        value_parser = clap::value_parser!(u32).range(900..=129_600)
    )]
    pub duration: u32,

    /// Section name written inside the region [default: <key>_sts]
    #[arg(short, long)]
    pub sts_profile_name: Option<String>,

    /// Region key to rewrite [default: the profile name]
    #[arg(short = 'k', long)]
    pub target_key: Option<String>,

    /// 1Password account for automatic MFA token retrieval
    #[arg(long, env = "UPDSTS_OP_ACCOUNT")]
    pub op_account: Option<String>,

    /// 1Password item name containing the TOTP
    #[arg(long, env = "UPDSTS_OP_ITEM_NAME")]
    pub op_item_name: Option<String>,
}

#[derive(Debug, clap::Args)]
pub struct McpArgs {
    /// Serve tools over stdio instead of printing the tool list
    #[arg(long)]
    pub server: bool,
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;
    use pretty_assertions::assert_eq;

    use super::*;

    fn parse(args: &[&str]) -> Args {
        Args::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_command_structure_validation() {
        Args::command().debug_assert();
    }

    #[test]
    fn test_get_defaults() {
        let args = parse(&["updsts", "get", "-n", "work", "-t", "123456"]);
        let Command::Get(get) = args.command else {
            panic!("Expected Get command");
        };
        assert_eq!(get.profile_name, "work");
        assert_eq!(get.totp_token.as_deref(), Some("123456"));
        assert_eq!(get.duration, 3600);
        assert_eq!(get.sts_profile_name, None);
        assert_eq!(get.target_key, None);
    }

    #[test]
    fn test_get_all_options() {
        let args = parse(&[
            "updsts", "-vv", "get", "-n", "work", "-d", "7200", "-s", "custom_sts", "-k", "custom_key",
            "-c", "/path/to/creds",
        ]);
        assert_eq!(args.verbose, 2);
        assert_eq!(args.credentials_file, Some(PathBuf::from("/path/to/creds")));
        let Command::Get(get) = args.command else {
            panic!("Expected Get command");
        };
        assert_eq!(get.duration, 7200);
        assert_eq!(get.sts_profile_name.as_deref(), Some("custom_sts"));
        assert_eq!(get.target_key.as_deref(), Some("custom_key"));
        assert_eq!(get.totp_token, None);
    }

    #[test]
    fn test_get_rejects_out_of_range_duration() {
        assert!(Args::try_parse_from(["updsts", "get", "-n", "work", "-d", "60"]).is_err());
        assert!(Args::try_parse_from(["updsts", "get", "-n", "work", "-d", "200000"]).is_err());
    }

    #[test]
    fn test_get_requires_profile() {
        assert!(Args::try_parse_from(["updsts", "get"]).is_err());
    }

    #[test]
    fn test_list_and_mcp() {
        assert!(matches!(parse(&["updsts", "list"]).command, Command::List));
        assert!(matches!(
            parse(&["updsts", "mcp", "--server"]).command,
            Command::Mcp(McpArgs { server: true })
        ));
        assert!(matches!(
            parse(&["updsts", "mcp"]).command,
            Command::Mcp(McpArgs { server: false })
        ));
    }

    #[test]
    fn test_subcommand_required() {
        assert!(Args::try_parse_from(["updsts"]).is_err());
    }
}
