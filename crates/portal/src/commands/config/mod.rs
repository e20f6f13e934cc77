//! Configuration commands.

use async_trait::async_trait;
use clap::{Parser, Subcommand};

use super::{Command, CommandContext};
use crate::Result;

mod show;

use self::show::ConfigShowCommand;

/// Inspect configuration
#[derive(Parser)]
pub(crate) struct ConfigCommand {
    #[clap(subcommand)]
    inner: ConfigSubCommand,
}

#[async_trait]
impl Command for ConfigCommand {
    async fn execute(self, ctx: CommandContext) -> Result<()> {
        self.inner.execute(ctx).await
    }
}

#[derive(Subcommand)]
enum ConfigSubCommand {
    Show(ConfigShowCommand),
}

#[async_trait]
impl Command for ConfigSubCommand {
    async fn execute(self, ctx: CommandContext) -> Result<()> {
        match self {
            Self::Show(sub) => sub.execute(ctx).await,
        }
    }
}
