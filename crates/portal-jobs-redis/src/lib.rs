//! Redis job queue, using RQ key names.

use async_trait::async_trait;
use portal_jobs_interface::{Job, JobError, JobQueueService, Result};
use redis::{aio::MultiplexedConnection, Client, Cmd, FromRedisValue, Pipeline};

const QUEUES_KEY: &str = "rq:queues";
const JOB_COUNTER_KEY: &str = "rq:job-counter";

fn queue_key(queue: &str) -> String {
    format!("rq:queue:{queue}")
}

/// Register the queue and push the job in one transaction.
fn enqueue_pipeline(queue: &str, job: &str) -> Pipeline {
    let mut pipe = redis::pipe();
    pipe.atomic()
        .cmd("SADD")
        .arg(QUEUES_KEY)
        .arg(queue_key(queue))
        .ignore()
        .cmd("RPUSH")
        .arg(queue_key(queue))
        .arg(job)
        .ignore();
    pipe
}

/// Redis job queue.
#[derive(Clone)]
pub struct RedisJobQueue(Client);

impl RedisJobQueue {
    /// Creates a new redis adapter. No connection is opened yet.
    pub fn new(addr: &str) -> Result<Self> {
        Client::open(addr)
            .map(Self)
            .map_err(|e| JobError::ImplementationError { source: e.into() })
    }

    async fn connection(&self) -> Result<MultiplexedConnection> {
        self.0
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| JobError::ImplementationError { source: e.into() })
    }

    async fn execute_command<T: FromRedisValue>(&self, cmd: &Cmd) -> Result<T> {
        let mut conn = self.connection().await?;

        cmd.query_async(&mut conn)
            .await
            .map_err(|e| JobError::ImplementationError { source: e.into() })
    }

    async fn execute_pipeline<T: FromRedisValue>(&self, pipe: &Pipeline) -> Result<T> {
        let mut conn = self.connection().await?;

        pipe.query_async(&mut conn)
            .await
            .map_err(|e| JobError::ImplementationError { source: e.into() })
    }
}

#[async_trait]
impl JobQueueService for RedisJobQueue {
    #[tracing::instrument(skip(self, payload), ret)]
    async fn enqueue(&self, queue: &str, name: &str, payload: serde_json::Value) -> Result<Job> {
        if queue.is_empty() {
            return Err(JobError::EmptyQueueName);
        }

        let id: u64 = self
            .execute_command(redis::cmd("INCR").arg(JOB_COUNTER_KEY))
            .await?;
        let job = Job::new(id.to_string(), queue, name, payload);

        self.execute_pipeline::<()>(&enqueue_pipeline(queue, &job.to_json()?))
            .await?;

        Ok(job)
    }

    #[tracing::instrument(skip(self))]
    async fn dequeue(&self, queue: &str) -> Result<Option<Job>> {
        let value: Option<String> = self
            .execute_command(redis::cmd("LPOP").arg(queue_key(queue)))
            .await?;

        value.map(|v| Job::from_json(queue, &v)).transpose()
    }

    #[tracing::instrument(skip(self), ret)]
    async fn queue_length(&self, queue: &str) -> Result<u64> {
        self.execute_command(redis::cmd("LLEN").arg(queue_key(queue)))
            .await
    }

    #[tracing::instrument(skip(self))]
    async fn health_check(&self) -> Result<()> {
        self.execute_command::<()>(&redis::cmd("PING")).await
    }
}

#[cfg(test)]
mod tests {
    use std::error::Error;

    use serde_json::json;

    use super::*;

    #[test]
    fn invalid_url() {
        assert!(matches!(
            RedisJobQueue::new("not-redis"),
            Err(JobError::ImplementationError { .. })
        ));
    }

    #[test]
    fn keys() {
        assert_eq!(queue_key("default"), "rq:queue:default");
    }

    #[test]
    fn enqueue_is_transactional() {
        let packed = enqueue_pipeline("default", "{}").get_packed_pipeline();
        let packed = String::from_utf8(packed).unwrap();

        let multi = packed.find("MULTI").unwrap();
        let sadd = packed.find("SADD").unwrap();
        let rpush = packed.find("RPUSH").unwrap();
        let exec = packed.find("EXEC").unwrap();
        assert!(multi < sadd && sadd < rpush && rpush < exec, "{packed}");
        assert!(packed.contains("rq:queue:default"));
    }

    #[tokio::test]
    #[ignore]
    async fn test_redis() -> Result<(), Box<dyn Error>> {
        let queue = RedisJobQueue::new("redis://localhost")?;
        let name = "portal-test";

        while queue.dequeue(name).await?.is_some() {}

        let job = queue.enqueue(name, "ping", json!({"n": 1})).await?;
        assert_eq!(queue.queue_length(name).await?, 1);
        assert_eq!(queue.dequeue(name).await?, Some(job));
        queue.health_check().await?;

        Ok(())
    }
}
