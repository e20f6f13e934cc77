use std::{io::Write, sync::Arc};

use clap::Parser;
use portal_config::Config;
use portal_database_memory::MemoryDb;
use portal_jobs_memory::MemoryJobQueue;
use tokio::sync::RwLock;

use crate::{
    args::{Args, CommandExecutor},
    commands::CommandContext,
};

pub(crate) struct CommandContextTest {
    pub config: Config,
    pub db_service: Arc<MemoryDb>,
    pub job_queue: Arc<MemoryJobQueue>,
}

impl CommandContextTest {
    pub fn new() -> Self {
        Self {
            config: Config::testing().unwrap(),
            db_service: Arc::new(MemoryDb::new()),
            job_queue: Arc::new(MemoryJobQueue::new()),
        }
    }

    pub fn into_context(self, writer: Arc<RwLock<dyn Write + Send + Sync>>) -> CommandContext {
        CommandContext {
            config: self.config,
            db_service: self.db_service,
            job_queue: self.job_queue,
            writer,
        }
    }
}

pub(crate) async fn test_command(ctx: CommandContextTest, command_args: &[&str]) -> String {
    let buf = Arc::new(RwLock::new(Vec::new()));

    {
        let command_args = {
            let mut tmp_args = vec!["portal"];
            tmp_args.extend(command_args);
            tmp_args
        };

        let args = Args::try_parse_from(command_args);
        match args {
            Ok(args) => CommandExecutor::parse_args_async(args, ctx.into_context(buf.clone()))
                .await
                .unwrap(),
            Err(e) => {
                eprintln!("{}", e);
                panic!("Parse error.")
            }
        }
    }

    let vec = buf.read().await.to_vec();
    std::str::from_utf8(&vec).unwrap().to_string()
}
