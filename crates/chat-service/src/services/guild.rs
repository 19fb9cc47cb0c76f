//! Guild service
//!
//! Handles guild creation, membership lookup for the caller, and guild
//! metadata management.

use chat_cache::{PubSubChannel, PubSubEvent};
use chat_core::entities::{generate_invite_code, Guild, GuildRole, Membership};
use chat_core::Snowflake;
use serde_json::json;
use tracing::{info, instrument};

use crate::dto::{
    CreateGuildRequest, GuildResponse, GuildWithMembership, GuildWithMembershipResponse,
    UpdateGuildRequest,
};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Guild service
pub struct GuildService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> GuildService<'a> {
    /// Create a new GuildService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a new guild. The creator becomes the owner, transactionally
    /// with the owner's own membership row (§3: a guild always has exactly
    /// one owner).
    #[instrument(skip(self, request))]
    pub async fn create_guild(
        &self,
        owner_id: Snowflake,
        request: CreateGuildRequest,
    ) -> ServiceResult<GuildResponse> {
        let guild_id = self.ctx.generate_id()?;
        let invite_code = generate_invite_code();

        let guild = Guild::new(guild_id, request.name, owner_id, invite_code);
        let owner_membership = Membership::new(guild_id, owner_id, GuildRole::Owner);

        self.ctx.guild_repo().create_with_owner(&guild, &owner_membership).await?;

        info!(guild_id = %guild_id, owner_id = %owner_id, "Guild created successfully");

        self.publish_guild_event("GUILD_CREATE", &guild).await;

        Ok(GuildResponse::from(&guild))
    }

    /// Get guild by ID
    #[instrument(skip(self))]
    pub async fn get_guild(&self, guild_id: Snowflake) -> ServiceResult<GuildResponse> {
        Ok(GuildResponse::from(&self.get_guild_entity(guild_id).await?))
    }

    /// Get guild entity by ID
    #[instrument(skip(self))]
    pub async fn get_guild_entity(&self, guild_id: Snowflake) -> ServiceResult<Guild> {
        self.ctx
            .guild_repo()
            .find_by_id(guild_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Guild", guild_id.to_string()))
    }

    /// Get a guild paired with the caller's own membership, member count and
    /// latest sequence id (for unread counts), as shown on `GET /guilds/mine`.
    #[instrument(skip(self))]
    pub async fn get_guild_with_membership(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<GuildWithMembershipResponse> {
        let guild = self.get_guild_entity(guild_id).await?;

        let membership = self
            .ctx
            .membership_repo()
            .find(guild_id, user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Member", format!("{guild_id}/{user_id}")))?;

        let member_count = self.ctx.guild_repo().member_count(guild_id).await?;
        let latest_seq = self.ctx.message_repo().max_sequence_id(guild_id).await?.unwrap_or(0);

        Ok(GuildWithMembershipResponse::from(GuildWithMembership {
            guild,
            membership,
            member_count,
            latest_seq,
        }))
    }

    /// Update guild settings (name, or transfer ownership). Owner only.
    #[instrument(skip(self, request))]
    pub async fn update_guild(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        request: UpdateGuildRequest,
    ) -> ServiceResult<GuildResponse> {
        let mut guild = self.get_guild_entity(guild_id).await?;

        if !guild.is_owner(user_id) {
            return Err(ServiceError::permission_denied("Only the owner can update this guild"));
        }

        if let Some(name) = request.name {
            guild.set_name(name);
        }

        self.ctx.guild_repo().update(&guild).await?;
        self.publish_guild_event("GUILD_UPDATE", &guild).await;

        Ok(GuildResponse::from(&guild))
    }

    /// Transfer ownership to another member. Owner only; new owner must
    /// already be a member.
    #[instrument(skip(self))]
    pub async fn transfer_ownership(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        new_owner_id: Snowflake,
    ) -> ServiceResult<GuildResponse> {
        let mut guild = self.get_guild_entity(guild_id).await?;

        if !guild.is_owner(user_id) {
            return Err(ServiceError::permission_denied("Only the owner can transfer ownership"));
        }

        if !self.ctx.membership_repo().is_member(guild_id, new_owner_id).await? {
            return Err(ServiceError::validation("New owner must already be a guild member"));
        }

        guild.transfer_ownership(new_owner_id);
        self.ctx.guild_repo().update(&guild).await?;

        let mut old_owner_membership = self
            .ctx
            .membership_repo()
            .find(guild_id, user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Member", format!("{guild_id}/{user_id}")))?;
        old_owner_membership.set_role(GuildRole::Admin);
        self.ctx.membership_repo().update(&old_owner_membership).await?;

        let mut new_owner_membership = self
            .ctx
            .membership_repo()
            .find(guild_id, new_owner_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Member", format!("{guild_id}/{new_owner_id}")))?;
        new_owner_membership.set_role(GuildRole::Owner);
        self.ctx.membership_repo().update(&new_owner_membership).await?;

        info!(guild_id = %guild_id, old_owner = %user_id, new_owner = %new_owner_id, "Guild ownership transferred");

        self.publish_guild_event("GUILD_UPDATE", &guild).await;

        Ok(GuildResponse::from(&guild))
    }

    /// Delete guild. Owner only.
    #[instrument(skip(self))]
    pub async fn delete_guild(&self, guild_id: Snowflake, user_id: Snowflake) -> ServiceResult<()> {
        let guild = self.get_guild_entity(guild_id).await?;

        if !guild.is_owner(user_id) {
            return Err(ServiceError::permission_denied("Only the owner can delete this guild"));
        }

        self.ctx.guild_repo().delete(guild_id).await?;

        info!(guild_id = %guild_id, "Guild deleted");

        let event = PubSubEvent::new("GUILD_DELETE", json!({ "id": guild_id.to_string() }));
        self.ctx
            .publisher()
            .publish(&PubSubChannel::guild(guild_id), &event)
            .await
            .ok();

        Ok(())
    }

    /// List every guild the caller belongs to, each paired with their own
    /// membership so the client can derive unread counts
    /// (`latest_seq - last_read_seq`), as shown on `GET /guilds/mine`.
    #[instrument(skip(self))]
    pub async fn list_mine(&self, user_id: Snowflake) -> ServiceResult<Vec<GuildWithMembershipResponse>> {
        let memberships = self.ctx.membership_repo().find_by_user(user_id).await?;

        let mut guilds = Vec::with_capacity(memberships.len());
        for membership in memberships {
            let guild = self.get_guild_entity(membership.guild_id).await?;
            let member_count = self.ctx.guild_repo().member_count(membership.guild_id).await?;
            let latest_seq = self.ctx.message_repo().max_sequence_id(membership.guild_id).await?.unwrap_or(0);

            guilds.push(GuildWithMembershipResponse::from(GuildWithMembership {
                guild,
                membership,
                member_count,
                latest_seq,
            }));
        }

        Ok(guilds)
    }

    /// Leave a guild. The owner cannot leave without transferring ownership
    /// first.
    #[instrument(skip(self))]
    pub async fn leave_guild(&self, guild_id: Snowflake, user_id: Snowflake) -> ServiceResult<()> {
        let guild = self.get_guild_entity(guild_id).await?;

        if guild.is_owner(user_id) {
            return Err(ServiceError::conflict(
                "Guild owner cannot leave; transfer ownership first",
            ));
        }

        if !self.ctx.membership_repo().is_member(guild_id, user_id).await? {
            return Err(ServiceError::not_found("Member", format!("{guild_id}/{user_id}")));
        }

        self.ctx.membership_repo().delete(guild_id, user_id).await?;

        info!(guild_id = %guild_id, user_id = %user_id, "User left guild");

        let event = PubSubEvent::new(
            "GUILD_MEMBER_REMOVE",
            json!({
                "guild_id": guild_id.to_string(),
                "user_id": user_id.to_string(),
            }),
        );
        self.ctx
            .publisher()
            .publish(&PubSubChannel::guild(guild_id), &event)
            .await
            .ok();

        Ok(())
    }

    /// Helper to publish guild metadata events. Best-effort (§4.3: the bus
    /// is not on the durability path).
    async fn publish_guild_event(&self, event_type: &str, guild: &Guild) {
        let data = json!({
            "id": guild.id.to_string(),
            "name": guild.name,
            "owner_id": guild.owner_id.to_string(),
            "invite_code": guild.invite_code,
            "created_at": guild.created_at.to_rfc3339(),
        });

        let event = PubSubEvent::new(event_type, data);
        self.ctx
            .publisher()
            .publish(&PubSubChannel::guild(guild.id), &event)
            .await
            .ok();
    }
}

#[cfg(test)]
mod tests {
    // Integration tests would go here with mocked dependencies
}
