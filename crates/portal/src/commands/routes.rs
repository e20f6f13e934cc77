use async_trait::async_trait;
use clap::Parser;
use portal_server::build_registry;

use super::{Command, CommandContext};
use crate::Result;

/// Show the dispatch table
#[derive(Parser)]
pub(crate) struct RoutesCommand;

#[async_trait]
impl Command for RoutesCommand {
    async fn execute(self, ctx: CommandContext) -> Result<()> {
        let registry = build_registry()?;
        let mut writer = ctx.writer.write().await;

        for route in registry.routes() {
            writeln!(
                writer,
                "{:<6} {:<18} {}",
                route.method, route.path, route.endpoint
            )?;
        }

        Ok(())
    }
}
