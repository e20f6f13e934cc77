use async_trait::async_trait;
use clap::Parser;
use portal_server::{extensions::Extensions, run_server, AppContext};

use super::{Command, CommandContext};
use crate::Result;

/// Start server
#[derive(Parser)]
pub(crate) struct ServerCommand;

#[async_trait]
impl Command for ServerCommand {
    async fn execute(self, ctx: CommandContext) -> Result<()> {
        let extensions = Extensions::with_services(&ctx.config, ctx.db_service, ctx.job_queue)?;
        let context = AppContext::new(ctx.config, extensions)?;

        run_server(context).await?;

        Ok(())
    }
}
