//! Error types for the queue crate.

/// Errors produced while producing to or consuming from the durable queue.
#[derive(Debug, thiserror::Error)]
pub enum QueueError {
    #[error("failed to produce message after {attempts} attempt(s): {reason}")]
    ProduceFailed { attempts: u32, reason: String },

    #[error("failed to consume from queue: {0}")]
    ConsumeFailed(String),

    #[error("failed to commit offset: {0}")]
    CommitFailed(String),

    #[error("message payload could not be (de)serialized: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("dead letter publish failed: {0}")]
    DeadLetterFailed(String),
}

pub type QueueResult<T> = Result<T, QueueError>;
