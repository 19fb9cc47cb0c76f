//! Per-user offline inbox backed by a head-prepended Redis list.

use chat_core::{Message, Snowflake};
use redis::AsyncCommands;

use crate::pool::{RedisPool, RedisResult};

const INBOX_PREFIX: &str = "inbox:user:";

/// The unit of data stored in a user's inbox — a full message so the
/// gateway can replay it verbatim on reconnect without a round trip to the
/// store.
pub type InboxEntry = Message;

/// Per-user offline message queue.
#[derive(Clone)]
pub struct Inbox {
    pool: RedisPool,
}

impl Inbox {
    /// Create a new inbox store.
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    fn key(user_id: Snowflake) -> String {
        format!("{INBOX_PREFIX}{user_id}")
    }

    /// Prepend a message to `user_id`'s inbox.
    pub async fn push(&self, user_id: Snowflake, message: &InboxEntry) -> RedisResult<()> {
        let key = Self::key(user_id);
        let payload = serde_json::to_string(message)?;
        let mut conn = self.pool.get().await?;
        conn.lpush::<_, _, ()>(&key, payload).await?;
        Ok(())
    }

    /// Atomically read and clear `user_id`'s inbox in one round trip,
    /// returning messages oldest-first (the list is head-prepended, so the
    /// raw read comes back newest-first and is reversed here).
    pub async fn drain_all(&self, user_id: Snowflake) -> RedisResult<Vec<InboxEntry>> {
        let key = Self::key(user_id);
        let mut conn = self.pool.get().await?;

        let (raw, _): (Vec<String>, ()) = redis::pipe()
            .lrange(&key, 0, -1)
            .del(&key)
            .query_async(&mut conn)
            .await?;

        let mut messages = Vec::with_capacity(raw.len());
        for item in raw.into_iter().rev() {
            match serde_json::from_str::<InboxEntry>(&item) {
                Ok(msg) => messages.push(msg),
                Err(err) => {
                    tracing::warn!(user_id = %user_id, error = %err, "dropping unreadable inbox entry");
                }
            }
        }
        Ok(messages)
    }

    /// Number of messages currently queued for `user_id`.
    pub async fn len(&self, user_id: Snowflake) -> RedisResult<u64> {
        let key = Self::key(user_id);
        let mut conn = self.pool.get().await?;
        let len: u64 = conn.llen(&key).await?;
        Ok(len)
    }

    /// Check whether `user_id` has any queued messages.
    pub async fn is_empty(&self, user_id: Snowflake) -> RedisResult<bool> {
        Ok(self.len(user_id).await? == 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_format() {
        let user_id = Snowflake::from(42i64);
        assert_eq!(Inbox::key(user_id), format!("inbox:user:{user_id}"));
    }
}
