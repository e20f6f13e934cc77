use thiserror::Error;

/// Job queue error.
#[derive(Debug, Error)]
pub enum JobError {
    /// Queue names cannot be empty.
    #[error("Queue name cannot be empty")]
    EmptyQueueName,

    /// Stored job could not be decoded.
    #[error("Malformed job in queue '{queue}',\n  caused by: {source}")]
    MalformedJob {
        /// Queue name.
        queue: String,
        /// Source error.
        source: serde_json::Error,
    },

    /// Wraps an implementation error.
    #[error(transparent)]
    ImplementationError {
        /// Source error.
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

/// Job queue result.
pub type Result<T, E = JobError> = core::result::Result<T, E>;
