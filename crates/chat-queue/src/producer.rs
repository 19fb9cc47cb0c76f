//! Durable producer: publishes partitioned, keyed messages to the queue.

use std::time::Duration;

use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use serde::Serialize;
use tracing::warn;

use crate::error::{QueueError, QueueResult};

/// Configuration for the Kafka-backed producer side of the queue.
#[derive(Debug, Clone)]
pub struct ProducerConfig {
    pub brokers: Vec<String>,
    pub topic: String,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

/// Produces messages onto a topic, partitioned by key (the guild id), so
/// that all messages for a given guild are consumed in order by a single
/// consumer within a group.
pub struct Producer {
    inner: FutureProducer,
    topic: String,
    max_retries: u32,
    retry_backoff: Duration,
}

impl Producer {
    /// # Errors
    /// Returns `QueueError::ProduceFailed` if the underlying client cannot
    /// be constructed (invalid broker list, unreachable config, etc).
    pub fn new(config: &ProducerConfig) -> QueueResult<Self> {
        let inner: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", config.brokers.join(","))
            .set("message.timeout.ms", "10000")
            .set("compression.type", "lz4")
            .set("enable.idempotence", "true")
            .create()
            .map_err(|e| QueueError::ProduceFailed {
                attempts: 0,
                reason: e.to_string(),
            })?;

        Ok(Self {
            inner,
            topic: config.topic.clone(),
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    /// Serialize and produce `payload` keyed by `key`, retrying transient
    /// failures with exponential backoff up to `max_retries` times.
    pub async fn produce<T: Serialize>(&self, key: &str, payload: &T) -> QueueResult<()> {
        self.produce_to(&self.topic, key, payload).await
    }

    /// Produce to an arbitrary topic (used by the consumer to forward to the
    /// dead letter topic without needing a second `Producer`).
    pub async fn produce_to<T: Serialize>(
        &self,
        topic: &str,
        key: &str,
        payload: &T,
    ) -> QueueResult<()> {
        let envelope = serde_json::json!({
            "payload": payload,
            "attempt": 0,
            "original_topic": "",
        });
        self.publish_envelope(topic, key, &envelope).await
    }

    /// Publish an already-built envelope verbatim (no re-wrapping). Used by
    /// the consumer's requeue/DLQ paths, whose envelope already carries the
    /// real attempt count — wrapping it a second time would reset that
    /// count to 0 on every delivery and the retry budget would never trip.
    pub async fn publish_envelope(
        &self,
        topic: &str,
        key: &str,
        envelope: &serde_json::Value,
    ) -> QueueResult<()> {
        let body = serde_json::to_vec(envelope)?;

        let mut attempt = 0u32;
        loop {
            let record = FutureRecord::to(topic).key(key).payload(&body);
            match self.inner.send(record, Duration::from_secs(5)).await {
                Ok(_) => return Ok(()),
                Err((err, _)) if attempt < self.max_retries => {
                    attempt += 1;
                    warn!(topic, key, attempt, error = %err, "produce failed, retrying");
                    tokio::time::sleep(self.retry_backoff * attempt).await;
                }
                Err((err, _)) => {
                    return Err(QueueError::ProduceFailed {
                        attempts: attempt + 1,
                        reason: err.to_string(),
                    })
                }
            }
        }
    }
}
