//! # chat-queue
//!
//! A durable, partitioned queue in front of message ingestion. Producers key
//! every record by guild id so that all writes for one guild land on the
//! same partition and are consumed in order by exactly one consumer within a
//! group; failures are retried with backoff up to a bounded budget and then
//! routed to a dead letter topic instead of blocking the partition forever.

pub mod consumer;
pub mod error;
pub mod message;
pub mod producer;

pub use consumer::{Consumer, ConsumerConfig, HandleOutcome};
pub use error::{QueueError, QueueResult};
pub use message::{Delivery, QueueEnvelope};
pub use producer::{Producer, ProducerConfig};
