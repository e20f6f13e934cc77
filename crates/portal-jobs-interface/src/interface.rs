//! Job queue interface.

use async_trait::async_trait;

use crate::{Job, Result};

/// Job queue adapter trait.
#[cfg_attr(any(test, feature = "testkit"), mockall::automock)]
#[async_trait]
pub trait JobQueueService: Send + Sync {
    /// Push a job on a queue.
    async fn enqueue(
        &self,
        queue: &str,
        name: &str,
        payload: serde_json::Value,
    ) -> Result<Job>;
    /// Pop the oldest job from a queue.
    async fn dequeue(&self, queue: &str) -> Result<Option<Job>>;
    /// Count pending jobs in a queue.
    async fn queue_length(&self, queue: &str) -> Result<u64>;
    /// Check the backend is reachable.
    async fn health_check(&self) -> Result<()>;
}
