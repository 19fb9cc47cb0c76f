//! PostgreSQL implementation of MessageRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use chat_core::entities::Message;
use chat_core::traits::{MessageRepository, RepoResult};
use chat_core::value_objects::Snowflake;

use crate::mappers::MessageInsert;
use crate::models::MessageModel;

use super::error::{map_db_error, message_not_found};

const SELECT_COLUMNS: &str = "id, guild_id, sender_id, content, msg_type, sequence_id, created_at, deleted_at";

/// PostgreSQL implementation of `MessageRepository`
#[derive(Clone)]
pub struct PgMessageRepository {
    pool: PgPool,
}

impl PgMessageRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MessageRepository for PgMessageRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>> {
        let result = sqlx::query_as::<_, MessageModel>(&format!(
            "SELECT {SELECT_COLUMNS} FROM messages WHERE id = $1 AND deleted_at IS NULL"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Message::from))
    }

    #[instrument(skip(self))]
    async fn insert_message(&self, message: &Message) -> RepoResult<()> {
        let values = MessageInsert::new(message);
        sqlx::query(
            r"
            INSERT INTO messages (id, guild_id, sender_id, content, msg_type, sequence_id, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (id) DO NOTHING
            ",
        )
        .bind(values.id)
        .bind(values.guild_id)
        .bind(values.sender_id)
        .bind(values.content)
        .bind(values.msg_type)
        .bind(values.sequence_id)
        .bind(message.created_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn recent_messages(&self, guild_id: Snowflake, limit: i64, offset: i64) -> RepoResult<Vec<Message>> {
        let limit = limit.clamp(1, 1000);
        let results = sqlx::query_as::<_, MessageModel>(&format!(
            "SELECT {SELECT_COLUMNS} FROM messages \
             WHERE guild_id = $1 AND deleted_at IS NULL \
             ORDER BY sequence_id DESC LIMIT $2 OFFSET $3"
        ))
        .bind(guild_id.into_inner())
        .bind(limit)
        .bind(offset)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Message::from).collect())
    }

    #[instrument(skip(self))]
    async fn messages_after(&self, guild_id: Snowflake, after_seq: i64, limit: i64) -> RepoResult<Vec<Message>> {
        let limit = limit.clamp(1, 1000);
        let results = sqlx::query_as::<_, MessageModel>(&format!(
            "SELECT {SELECT_COLUMNS} FROM messages \
             WHERE guild_id = $1 AND sequence_id > $2 AND deleted_at IS NULL \
             ORDER BY sequence_id ASC LIMIT $3"
        ))
        .bind(guild_id.into_inner())
        .bind(after_seq)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Message::from).collect())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query(
            "UPDATE messages SET deleted_at = NOW() WHERE id = $1 AND deleted_at IS NULL",
        )
        .bind(id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(message_not_found(id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn max_sequence_id(&self, guild_id: Snowflake) -> RepoResult<Option<i64>> {
        sqlx::query_scalar::<_, Option<i64>>("SELECT MAX(sequence_id) FROM messages WHERE guild_id = $1")
            .bind(guild_id.into_inner())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgMessageRepository>();
    }
}
