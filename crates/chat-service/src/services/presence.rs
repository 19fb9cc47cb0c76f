//! Presence service
//!
//! Queries and updates online status: per-guild online membership (used for
//! fan-out decisions) and a user's own status field.

use chat_cache::UserStatus;
use chat_core::Snowflake;
use tracing::instrument;

use crate::dto::PresenceResponse;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Presence service
pub struct PresenceService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> PresenceService<'a> {
    /// Create a new PresenceService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Set a user's status (online/idle/dnd/offline) and persist it on the
    /// user record so it survives reconnects.
    #[instrument(skip(self))]
    pub async fn set_status(&self, user_id: Snowflake, status: UserStatus) -> ServiceResult<PresenceResponse> {
        let mut user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))?;

        let domain_status = match status {
            UserStatus::Online => chat_core::entities::UserStatus::Online,
            UserStatus::Idle => chat_core::entities::UserStatus::Idle,
            UserStatus::Dnd => chat_core::entities::UserStatus::Dnd,
            UserStatus::Offline => chat_core::entities::UserStatus::Offline,
        };
        user.set_status(domain_status);
        self.ctx.user_repo().update(&user).await?;

        Ok(PresenceResponse { user_id: user_id.to_string(), status: status.to_string() })
    }

    /// Whether a user currently holds a live connection on any gateway node.
    #[instrument(skip(self))]
    pub async fn is_online(&self, user_id: Snowflake) -> ServiceResult<bool> {
        self.ctx
            .presence_store()
            .is_user_online(user_id)
            .await
            .map_err(|e| ServiceError::internal(e.to_string()))
    }

    /// Online member count for a guild, used for guild listings.
    #[instrument(skip(self))]
    pub async fn guild_online_count(&self, guild_id: Snowflake) -> ServiceResult<u64> {
        self.ctx
            .presence_store()
            .guild_online_count(guild_id)
            .await
            .map_err(|e| ServiceError::internal(e.to_string()))
    }

    /// Online member ids for a guild, used to decide which connected
    /// sessions to skip when falling back to the inbox (§4.8).
    #[instrument(skip(self))]
    pub async fn guild_online_users(&self, guild_id: Snowflake) -> ServiceResult<Vec<Snowflake>> {
        self.ctx
            .presence_store()
            .guild_online_users(guild_id)
            .await
            .map_err(|e| ServiceError::internal(e.to_string()))
    }

    /// Which gateway node currently holds a user's connection, if any.
    #[instrument(skip(self))]
    pub async fn connect_route(&self, user_id: Snowflake) -> ServiceResult<Option<String>> {
        self.ctx
            .presence_store()
            .get_connect_route(user_id)
            .await
            .map_err(|e| ServiceError::internal(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    // Integration tests would go here with mocked dependencies
}
