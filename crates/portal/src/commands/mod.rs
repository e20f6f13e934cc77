//! Commands.

use std::{io::Write, sync::Arc};

use async_trait::async_trait;
use clap::Subcommand;
use portal_config::Config;
use portal_database_interface::DbService;
use portal_jobs_interface::JobQueueService;
use tokio::sync::RwLock;

use self::{
    config::ConfigCommand, routes::RoutesCommand, server::ServerCommand, users::UserCommand,
};
use crate::Result;

mod config;
mod routes;
mod server;
mod users;

pub(crate) struct CommandContext {
    pub config: Config,
    pub db_service: Arc<dyn DbService>,
    pub job_queue: Arc<dyn JobQueueService>,
    pub writer: Arc<RwLock<dyn Write + Send + Sync>>,
}

#[async_trait]
pub(crate) trait Command {
    async fn execute(self, ctx: CommandContext) -> Result<()>;
}

/// Command
#[derive(Subcommand)]
pub(crate) enum SubCommand {
    Server(ServerCommand),
    Routes(RoutesCommand),
    Users(UserCommand),
    Config(ConfigCommand),
}

#[async_trait]
impl Command for SubCommand {
    async fn execute(self, ctx: CommandContext) -> Result<()> {
        match self {
            Self::Server(sub) => sub.execute(ctx).await,
            Self::Routes(sub) => sub.execute(ctx).await,
            Self::Users(sub) => sub.execute(ctx).await,
            Self::Config(sub) => sub.execute(ctx).await,
        }
    }
}
