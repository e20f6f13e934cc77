//! User commands.

use async_trait::async_trait;
use clap::{Parser, Subcommand};

use super::{Command, CommandContext};
use crate::Result;

mod add;
mod list;

use self::{add::UserAddCommand, list::UserListCommand};

/// Manage users
#[derive(Parser)]
pub(crate) struct UserCommand {
    #[clap(subcommand)]
    inner: UserSubCommand,
}

#[async_trait]
impl Command for UserCommand {
    async fn execute(self, ctx: CommandContext) -> Result<()> {
        self.inner.execute(ctx).await
    }
}

#[derive(Subcommand)]
enum UserSubCommand {
    Add(UserAddCommand),
    List(UserListCommand),
}

#[async_trait]
impl Command for UserSubCommand {
    async fn execute(self, ctx: CommandContext) -> Result<()> {
        match self {
            Self::Add(sub) => sub.execute(ctx).await,
            Self::List(sub) => sub.execute(ctx).await,
        }
    }
}
