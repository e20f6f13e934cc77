//! In-memory job queue.

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        atomic::{AtomicU64, Ordering},
        RwLock,
    },
};

use async_trait::async_trait;
use portal_jobs_interface::{Job, JobError, JobQueueService, Result};

/// Queue keeping jobs in process memory. Nothing runs them.
#[derive(Debug, Default)]
pub struct MemoryJobQueue {
    queues: RwLock<HashMap<String, VecDeque<Job>>>,
    last_id: AtomicU64,
}

impl MemoryJobQueue {
    pub fn new() -> Self {
        Default::default()
    }

    /// Snapshot of the pending jobs of a queue.
    pub fn jobs(&self, queue: &str) -> Vec<Job> {
        self.queues
            .read()
            .unwrap()
            .get(queue)
            .map(|q| q.iter().cloned().collect())
            .unwrap_or_default()
    }
}

#[async_trait]
impl JobQueueService for MemoryJobQueue {
    #[tracing::instrument(skip(self, payload), ret)]
    async fn enqueue(&self, queue: &str, name: &str, payload: serde_json::Value) -> Result<Job> {
        if queue.is_empty() {
            return Err(JobError::EmptyQueueName);
        }

        let id = self.last_id.fetch_add(1, Ordering::SeqCst) + 1;
        let job = Job::new(id.to_string(), queue, name, payload);
        self.queues
            .write()
            .unwrap()
            .entry(queue.into())
            .or_default()
            .push_back(job.clone());

        Ok(job)
    }

    async fn dequeue(&self, queue: &str) -> Result<Option<Job>> {
        Ok(self
            .queues
            .write()
            .unwrap()
            .get_mut(queue)
            .and_then(VecDeque::pop_front))
    }

    async fn queue_length(&self, queue: &str) -> Result<u64> {
        Ok(self
            .queues
            .read()
            .unwrap()
            .get(queue)
            .map(|q| q.len() as u64)
            .unwrap_or(0))
    }

    async fn health_check(&self) -> Result<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn fifo() {
        let queue = MemoryJobQueue::new();
        let first = queue.enqueue("default", "a", json!({})).await.unwrap();
        let second = queue.enqueue("default", "b", json!({})).await.unwrap();
        queue.enqueue("other", "c", json!({})).await.unwrap();

        assert_eq!(first.id, "1");
        assert_eq!(second.id, "2");
        assert_eq!(queue.queue_length("default").await.unwrap(), 2);
        assert_eq!(queue.dequeue("default").await.unwrap(), Some(first));
        assert_eq!(queue.dequeue("default").await.unwrap(), Some(second));
        assert_eq!(queue.dequeue("default").await.unwrap(), None);
        assert_eq!(queue.jobs("other").len(), 1);
    }

    #[tokio::test]
    async fn unknown_queue() {
        let queue = MemoryJobQueue::new();
        assert_eq!(queue.queue_length("nope").await.unwrap(), 0);
        assert_eq!(queue.dequeue("nope").await.unwrap(), None);
    }

    #[tokio::test]
    async fn empty_queue_name() {
        let queue = MemoryJobQueue::new();
        assert!(matches!(
            queue.enqueue("", "a", json!(null)).await,
            Err(JobError::EmptyQueueName)
        ));
    }
}
