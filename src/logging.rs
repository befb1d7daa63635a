//! Process-wide logger setup.
//!
//! Components log through the `log` facade; this module installs the
//! `env_logger` backend once. Later calls keep the first configuration.

use std::{fs, fs::OpenOptions, path::Path};

use anyhow::{Context, Result};
use env_logger::{Builder, Env, Target};
use log::{LevelFilter, debug};

/// Maps the `-v` count to a level: warn, info, then debug.
pub fn level_for(verbosity: u8) -> LevelFilter {
    match verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    }
}

/// Installs the logger. `RUST_LOG` overrides the verbosity flag.
///
/// Output goes to stderr, keeping stdout free for command output and the tool
/// protocol, or is appended to `log_file` when one is given.
pub fn init(verbosity: u8, log_file: Option<&Path>) -> Result<()> {
    let mut builder = Builder::new();
    builder
        .filter_level(level_for(verbosity))
        .parse_env(Env::default());

    if let Some(path) = log_file {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create log directory '{}'", parent.display()))?;
        }
        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("Failed to open log file '{}'", path.display()))?;
        builder.target(Target::Pipe(Box::new(file)));
    }

    if builder.try_init().is_err() {
        debug!("Logger already initialized, keeping the existing configuration");
    }
    Ok(())
}
