//! Message service
//!
//! Read-path queries over guild message history. Message ingestion
//! (validate → membership check → produce) and the durable consume path
//! (dedup → sequence assignment → persist → publish → inbox write-back) run
//! inside the gateway's pipeline, not here: only WebSocket clients produce
//! messages, and the pipeline owns the `SeqGen`/`Inbox`/`Producer` wiring
//! end to end (§4.8).

use chat_core::entities::Message;
use chat_core::Snowflake;
use tracing::instrument;

use crate::dto::{MessageResponse, PaginatedResponse, PaginationMeta, MAX_HISTORY_LIMIT};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Message service
pub struct MessageService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MessageService<'a> {
    /// Create a new MessageService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Most recent messages in a guild, newest first, offset-paginated.
    #[instrument(skip(self))]
    pub async fn recent_messages(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        limit: i64,
        offset: i64,
    ) -> ServiceResult<PaginatedResponse<MessageResponse>> {
        self.require_member(guild_id, user_id).await?;

        let limit = limit.clamp(1, MAX_HISTORY_LIMIT);
        let messages = self.ctx.message_repo().recent_messages(guild_id, limit + 1, offset).await?;

        let has_more = messages.len() as i64 > limit;
        let page: Vec<Message> = messages.into_iter().take(limit as usize).collect();

        Ok(PaginatedResponse::new(
            page.into_iter().map(|m| MessageResponse::from(&m)).collect(),
            PaginationMeta { limit, has_more, next_after_seq: None },
        ))
    }

    /// Messages after a given sequence id, oldest first — the incremental
    /// pull a reconnecting client uses to fill the gap since it last read
    /// (§4.2, §6).
    #[instrument(skip(self))]
    pub async fn messages_after(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        after_seq: i64,
        limit: i64,
    ) -> ServiceResult<PaginatedResponse<MessageResponse>> {
        self.require_member(guild_id, user_id).await?;

        let limit = limit.clamp(1, MAX_HISTORY_LIMIT);
        let messages = self.ctx.message_repo().messages_after(guild_id, after_seq, limit + 1).await?;

        let has_more = messages.len() as i64 > limit;
        let page: Vec<Message> = messages.into_iter().take(limit as usize).collect();
        let next_after_seq = page.last().map(|m| m.sequence_id);

        Ok(PaginatedResponse::new(
            page.into_iter().map(|m| MessageResponse::from(&m)).collect(),
            PaginationMeta { limit, has_more, next_after_seq },
        ))
    }

    async fn require_member(&self, guild_id: Snowflake, user_id: Snowflake) -> ServiceResult<()> {
        if !self.ctx.membership_repo().is_member(guild_id, user_id).await? {
            return Err(ServiceError::permission_denied("Must be a guild member to view messages"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // Integration tests would go here with mocked dependencies
}
