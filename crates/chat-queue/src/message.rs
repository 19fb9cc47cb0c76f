//! Queue envelope wrapping a produced payload with retry bookkeeping.

use serde::{Deserialize, Serialize};

/// Envelope carried on the wire. `attempt` starts at 0 and is incremented by
/// the consumer each time a handler fails and the message is reproduced for
/// retry; once `attempt` exceeds the configured retry budget the message is
/// routed to the dead letter topic instead of being retried again.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueEnvelope<T> {
    pub payload: T,
    #[serde(default)]
    pub attempt: u32,
    #[serde(default)]
    pub original_topic: String,
}

impl<T> QueueEnvelope<T> {
    #[must_use]
    pub fn new(payload: T) -> Self {
        Self {
            payload,
            attempt: 0,
            original_topic: String::new(),
        }
    }

    #[must_use]
    pub fn retry(self) -> Self {
        Self {
            attempt: self.attempt + 1,
            ..self
        }
    }
}

/// A message delivered to a consumer handler, carrying the partition key
/// (the guild id, as a string) alongside the decoded envelope.
#[derive(Debug, Clone)]
pub struct Delivery<T> {
    pub key: String,
    pub envelope: QueueEnvelope<T>,
    pub partition: i32,
    pub offset: i64,
}
