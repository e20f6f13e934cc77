use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

/// Queued job.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Job {
    /// Job ID, assigned by the queue.
    pub id: String,
    /// Queue the job was pushed on.
    pub queue: String,
    /// Task name, resolved by the worker.
    pub name: String,
    /// Task arguments.
    pub payload: serde_json::Value,
    /// Enqueue timestamp.
    #[serde(with = "time::serde::rfc3339")]
    pub enqueued_at: OffsetDateTime,
}

impl Job {
    /// Build a job about to be pushed on `queue`.
    pub fn new<Q: Into<String>, N: Into<String>>(
        id: String,
        queue: Q,
        name: N,
        payload: serde_json::Value,
    ) -> Self {
        Self {
            id,
            queue: queue.into(),
            name: name.into(),
            payload,
            enqueued_at: OffsetDateTime::now_utc(),
        }
    }

    /// Encode for storage.
    pub fn to_json(&self) -> crate::Result<String> {
        serde_json::to_string(self)
            .map_err(|e| crate::JobError::ImplementationError { source: e.into() })
    }

    /// Decode a stored job.
    pub fn from_json(queue: &str, value: &str) -> crate::Result<Self> {
        serde_json::from_str(value).map_err(|e| crate::JobError::MalformedJob {
            queue: queue.into(),
            source: e,
        })
    }
}
