use async_trait::async_trait;
use clap::Parser;

use crate::{
    commands::{Command, CommandContext},
    Result,
};

/// List users
#[derive(Parser)]
pub(crate) struct UserListCommand;

#[async_trait]
impl Command for UserListCommand {
    async fn execute(self, ctx: CommandContext) -> Result<()> {
        let users = ctx.db_service.users_all().await?;
        if users.is_empty() {
            writeln!(ctx.writer.write().await, "No user known.")?;
        } else {
            for user in users {
                let suffix = if user.active { "" } else { " (inactive)" };
                writeln!(
                    ctx.writer.write().await,
                    "- {}: {} <{}>{}",
                    user.id,
                    user.username,
                    user.email,
                    suffix
                )?;
            }
        }

        Ok(())
    }
}
