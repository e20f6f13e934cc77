use std::{path::PathBuf, sync::Arc};

use clap::Parser;
use portal_config::{Config, DatabaseDriver, JobQueueDriver, DEFAULT_ENV_FILE};
use portal_database_interface::DbService;
use portal_database_memory::MemoryDb;
use portal_database_pg::{establish_pool_connection, run_migrations, PostgresDb};
use portal_jobs_interface::JobQueueService;
use portal_jobs_memory::MemoryJobQueue;
use portal_jobs_redis::RedisJobQueue;
use tokio::sync::RwLock;
use tracing::info;

use crate::{
    commands::{Command, CommandContext, SubCommand},
    Result,
};

#[derive(Parser)]
#[command(about = None, long_about = None)]
pub struct Args {
    /// Configuration profile, instead of APP_ENV
    #[arg(long, global = true)]
    pub profile: Option<String>,

    /// Env file layered over the profile
    #[arg(long, global = true, default_value = DEFAULT_ENV_FILE)]
    pub env_file: PathBuf,

    #[command(subcommand)]
    cmd: SubCommand,
}

pub struct CommandExecutor;

impl CommandExecutor {
    pub fn parse_args(config: Config, args: Args) -> Result<()> {
        let sync = |config: Config, args: Args| async move {
            let db_service: Arc<dyn DbService> = {
                if config.database.driver == DatabaseDriver::Postgres {
                    info!("Using PostgresDb database driver");

                    let pool = establish_pool_connection(&config).await?;
                    run_migrations(&pool).await?;

                    Arc::new(PostgresDb::new(pool))
                } else {
                    info!("Using MemoryDb database driver");
                    Arc::new(MemoryDb::new())
                }
            };

            let job_queue: Arc<dyn JobQueueService> = {
                if config.jobs.driver == JobQueueDriver::Redis {
                    info!("Using RedisJobQueue job queue driver");
                    Arc::new(RedisJobQueue::new(&config.jobs.redis_url)?)
                } else {
                    info!("Using MemoryJobQueue job queue driver");
                    Arc::new(MemoryJobQueue::new())
                }
            };

            let ctx = CommandContext {
                config,
                db_service,
                job_queue,
                writer: Arc::new(RwLock::new(std::io::stdout())),
            };

            Self::parse_args_async(args, ctx).await
        };

        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()?;

        actix_rt::System::with_tokio_rt(move || runtime).block_on(sync(config, args))
    }

    pub(crate) async fn parse_args_async(args: Args, ctx: CommandContext) -> Result<()> {
        args.cmd.execute(ctx).await
    }
}
