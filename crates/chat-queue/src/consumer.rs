//! Durable consumer: a consumer-group member that processes messages for
//! its assigned partitions in order, retrying failures and routing
//! exhausted retries to the dead letter topic.

use std::time::Duration;

use futures_util::StreamExt;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer as _, StreamConsumer};
use rdkafka::message::Message as _;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{error, warn};

use crate::error::{QueueError, QueueResult};
use crate::producer::Producer;

/// Configuration for the consumer-group side of the queue.
#[derive(Debug, Clone)]
pub struct ConsumerConfig {
    pub brokers: Vec<String>,
    pub topic: String,
    pub dlq_topic: String,
    pub consumer_group: String,
    pub max_retries: u32,
    pub retry_backoff_ms: u64,
}

/// Outcome of handling a single delivered message.
pub enum HandleOutcome {
    /// Processed successfully; the offset can be committed.
    Ack,
    /// Transient failure; retry (subject to the retry budget).
    Retry(String),
}

pub struct Consumer {
    inner: StreamConsumer,
    producer: Producer,
    topic: String,
    dlq_topic: String,
    max_retries: u32,
    retry_backoff: Duration,
}

impl Consumer {
    /// # Errors
    /// Returns `QueueError::ConsumeFailed` if the client or subscription
    /// cannot be created.
    pub fn new(config: &ConsumerConfig) -> QueueResult<Self> {
        let inner: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", config.brokers.join(","))
            .set("group.id", &config.consumer_group)
            .set("enable.auto.commit", "false")
            .set("auto.offset.reset", "earliest")
            .create()
            .map_err(|e| QueueError::ConsumeFailed(e.to_string()))?;

        inner
            .subscribe(&[config.topic.as_str()])
            .map_err(|e| QueueError::ConsumeFailed(e.to_string()))?;

        let producer = Producer::new(&crate::producer::ProducerConfig {
            brokers: config.brokers.clone(),
            topic: config.topic.clone(),
            max_retries: config.max_retries,
            retry_backoff_ms: config.retry_backoff_ms,
        })?;

        Ok(Self {
            inner,
            producer,
            topic: config.topic.clone(),
            dlq_topic: config.dlq_topic.clone(),
            max_retries: config.max_retries,
            retry_backoff: Duration::from_millis(config.retry_backoff_ms),
        })
    }

    /// Consume indefinitely, invoking `handle` for each decoded message.
    /// Offsets are committed per-message after a successful handle or after
    /// the message has been routed to the dead letter topic; a message that
    /// fails and still has retry budget left is reproduced onto its own
    /// topic with an incremented attempt count and the current offset is
    /// still committed (redelivery happens via the requeued copy, not via
    /// offset rewind, so healthy messages behind it are never blocked).
    pub async fn run<T, F, Fut>(&self, mut handle: F) -> QueueResult<()>
    where
        T: Serialize + DeserializeOwned + Send + 'static,
        F: FnMut(String, T, u32) -> Fut,
        Fut: std::future::Future<Output = HandleOutcome>,
    {
        let mut stream = self.inner.stream();
        while let Some(result) = stream.next().await {
            let msg = match result {
                Ok(msg) => msg,
                Err(e) => {
                    error!(error = %e, "kafka consume error");
                    continue;
                }
            };

            let key = msg
                .key()
                .map(|k| String::from_utf8_lossy(k).into_owned())
                .unwrap_or_default();
            let Some(payload) = msg.payload() else {
                let _ = self.inner.commit_message(&msg, CommitMode::Async);
                continue;
            };

            let envelope: serde_json::Value = match serde_json::from_slice(payload) {
                Ok(v) => v,
                Err(e) => {
                    warn!(error = %e, "dropping undecodable queue message");
                    let _ = self.inner.commit_message(&msg, CommitMode::Async);
                    continue;
                }
            };
            let attempt = envelope
                .get("attempt")
                .and_then(serde_json::Value::as_u64)
                .unwrap_or(0) as u32;
            let decoded: T = match serde_json::from_value(envelope["payload"].clone()) {
                Ok(v) => v,
                Err(e) => {
                    warn!(error = %e, "dropping malformed queue payload");
                    let _ = self.inner.commit_message(&msg, CommitMode::Async);
                    continue;
                }
            };

            match handle(key.clone(), decoded, attempt).await {
                HandleOutcome::Ack => {
                    let _ = self.inner.commit_message(&msg, CommitMode::Async);
                }
                HandleOutcome::Retry(reason) => {
                    if attempt >= self.max_retries {
                        warn!(key, attempt, reason, "retry budget exhausted, routing to dlq");
                        if let Err(e) = self
                            .route_to_dlq(&key, &envelope, attempt, &reason)
                            .await
                        {
                            error!(error = %e, "failed to publish to dead letter topic");
                        }
                    } else {
                        // Exponential doubling: attempt 0 waits 1x base, attempt 1
                        // waits 2x, attempt 2 waits 4x, ... (testable property 5).
                        let backoff = self.retry_backoff * (1u32 << attempt.min(16));
                        tokio::time::sleep(backoff).await;
                        if let Err(e) = self.requeue(&key, &envelope, attempt).await {
                            error!(error = %e, "failed to requeue message for retry");
                        }
                    }
                    let _ = self.inner.commit_message(&msg, CommitMode::Async);
                }
            }
        }
        Ok(())
    }

    async fn requeue(
        &self,
        key: &str,
        envelope: &serde_json::Value,
        attempt: u32,
    ) -> QueueResult<()> {
        let next = serde_json::json!({
            "payload": envelope["payload"],
            "attempt": attempt + 1,
            "original_topic": self.topic,
        });
        self.producer.publish_envelope(&self.topic, key, &next).await
    }

    async fn route_to_dlq(
        &self,
        key: &str,
        envelope: &serde_json::Value,
        attempt: u32,
        reason: &str,
    ) -> QueueResult<()> {
        let dead = serde_json::json!({
            "payload": envelope["payload"],
            "attempt": attempt,
            "original_topic": self.topic,
            "failure_reason": reason,
        });
        self.producer
            .publish_envelope(&self.dlq_topic, key, &dead)
            .await
            .map_err(|e| QueueError::DeadLetterFailed(e.to_string()))
    }
}
