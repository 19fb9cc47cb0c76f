//! Atomic per-guild sequence counter.
//!
//! Keyed `guild:{guild_id}:seq` in Redis. The counter is cold-start-recovered
//! from the database's `max_sequence_id` the first time a guild is touched,
//! via `SETNX`, so a freshly provisioned cache never reissues a sequence
//! number a prior incarnation already persisted.

use std::sync::Arc;
use std::time::Duration;

use chat_core::{DomainError, MessageRepository, Snowflake};
use redis::AsyncCommands;

use crate::pool::RedisPool;

const SEQ_KEY_PREFIX: &str = "guild:";
const SEQ_KEY_SUFFIX: &str = ":seq";
const MAX_ATTEMPTS: u32 = 3;
const RETRY_BACKOFF: Duration = Duration::from_millis(50);

/// Issues gap-free, monotonically increasing sequence numbers per guild.
#[derive(Clone)]
pub struct SeqGen {
    pool: RedisPool,
    message_repo: Arc<dyn MessageRepository>,
}

impl SeqGen {
    /// Create a new sequence generator backed by `pool`, recovering cold
    /// counters via `message_repo`.
    #[must_use]
    pub fn new(pool: RedisPool, message_repo: Arc<dyn MessageRepository>) -> Self {
        Self { pool, message_repo }
    }

    fn key(guild_id: Snowflake) -> String {
        format!("{SEQ_KEY_PREFIX}{guild_id}{SEQ_KEY_SUFFIX}")
    }

    /// Allocate the next sequence number for `guild_id`.
    ///
    /// Retries up to [`MAX_ATTEMPTS`] times with a fixed backoff before
    /// surfacing `DomainError::SeqUnavailable`.
    pub async fn next(&self, guild_id: Snowflake) -> Result<i64, DomainError> {
        let key = Self::key(guild_id);
        let mut attempts = 0;

        loop {
            attempts += 1;
            match self.try_next(guild_id, &key).await {
                Ok(seq) => return Ok(seq),
                Err(err) if attempts >= MAX_ATTEMPTS => {
                    tracing::warn!(
                        guild_id = %guild_id,
                        attempts,
                        error = %err,
                        "sequence counter unavailable"
                    );
                    return Err(DomainError::SeqUnavailable { guild_id, attempts });
                }
                Err(err) => {
                    tracing::debug!(
                        guild_id = %guild_id,
                        attempt = attempts,
                        error = %err,
                        "retrying sequence allocation"
                    );
                    tokio::time::sleep(RETRY_BACKOFF).await;
                }
            }
        }
    }

    async fn try_next(&self, guild_id: Snowflake, key: &str) -> Result<i64, DomainError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| DomainError::CacheError(e.to_string()))?;

        let exists: bool = conn
            .exists(key)
            .await
            .map_err(|e| DomainError::CacheError(e.to_string()))?;

        if !exists {
            let recovered = self
                .message_repo
                .max_sequence_id(guild_id)
                .await?
                .unwrap_or(0);
            let _: bool = conn
                .set_nx(key, recovered)
                .await
                .map_err(|e| DomainError::CacheError(e.to_string()))?;
        }

        let seq: i64 = conn
            .incr(key, 1)
            .await
            .map_err(|e| DomainError::CacheError(e.to_string()))?;
        Ok(seq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let guild_id = Snowflake::from(42i64);
        assert_eq!(SeqGen::key(guild_id), format!("guild:{guild_id}:seq"));
    }
}
