//! CLI module.

pub use anyhow::Result;
use args::{Args, CommandExecutor};
use clap::Parser;
use portal_config::{Config, Profile};
use portal_logging::configure_logging;
use tracing::info;

pub(crate) mod args;
mod commands;
mod config_validator;
#[cfg(test)]
mod testutils;

/// Initialize command line.
pub fn initialize_command_line() -> Result<()> {
    let args = Args::parse();
    dotenv::from_path(&args.env_file).ok();

    let profile = args.profile.as_deref().map(Profile::lookup).transpose()?;
    let mut config = Config::resolve(profile, &args.env_file)?;
    config.version = env!("CARGO_PKG_VERSION").to_string();

    configure_logging(&config)?;
    config_validator::validate_configuration(&config)?;

    info!(
        version = config.version,
        profile = config.profile.name(),
        message = "Configuration loaded"
    );

    CommandExecutor::parse_args(config, args)
}
