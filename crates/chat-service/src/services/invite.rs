//! Invite service
//!
//! Handles creation, resolution, and revocation of revocable guild invites,
//! independent of a guild's permanent `invite_code`.

use chat_core::entities::{generate_invite_code, Invite};
use chat_core::Snowflake;
use chrono::{Duration, Utc};
use tracing::{info, instrument};

use crate::dto::{CreateInviteRequest, InviteResponse, InviteWithDetails};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

const DEFAULT_INVITE_TTL_SECS: i64 = 86_400;

/// Invite service
pub struct InviteService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> InviteService<'a> {
    /// Create a new InviteService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Create a revocable invite for a guild. Any member may create one.
    #[instrument(skip(self, request))]
    pub async fn create_invite(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        request: CreateInviteRequest,
    ) -> ServiceResult<InviteResponse> {
        let guild = self
            .ctx
            .guild_repo()
            .find_by_id(guild_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Guild", guild_id.to_string()))?;

        if !self.ctx.membership_repo().is_member(guild_id, user_id).await? {
            return Err(ServiceError::permission_denied("Must be a guild member to create invites"));
        }

        let ttl_secs = request.max_age.unwrap_or(DEFAULT_INVITE_TTL_SECS);
        let expires_at = Utc::now() + Duration::seconds(ttl_secs);

        let invite = Invite::new(generate_invite_code(), guild_id, user_id, expires_at);
        self.ctx.invite_repo().create(&invite).await?;

        let creator = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))?;

        let member_count = self.ctx.guild_repo().member_count(guild_id).await?;

        info!(guild_id = %guild_id, code = %invite.code, "Invite created");

        Ok(InviteResponse::from(InviteWithDetails {
            invite,
            guild,
            creator,
            member_count,
        }))
    }

    /// Look up an invite, resolving its guild and creator for a preview
    /// before the caller decides whether to join.
    #[instrument(skip(self))]
    pub async fn resolve_invite(&self, code: &str) -> ServiceResult<InviteResponse> {
        let invite = self.get_valid_invite(code).await?;

        let guild = self
            .ctx
            .guild_repo()
            .find_by_id(invite.guild_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Guild", invite.guild_id.to_string()))?;

        let creator = self
            .ctx
            .user_repo()
            .find_by_id(invite.creator_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", invite.creator_id.to_string()))?;

        let member_count = self.ctx.guild_repo().member_count(invite.guild_id).await?;

        Ok(InviteResponse::from(InviteWithDetails {
            invite,
            guild,
            creator,
            member_count,
        }))
    }

    /// List invites currently outstanding for a guild, each resolved with
    /// its guild preview and creator profile.
    #[instrument(skip(self))]
    pub async fn list_guild_invites(&self, guild_id: Snowflake) -> ServiceResult<Vec<InviteResponse>> {
        let guild = self
            .ctx
            .guild_repo()
            .find_by_id(guild_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Guild", guild_id.to_string()))?;
        let member_count = self.ctx.guild_repo().member_count(guild_id).await?;

        let invites = self.ctx.invite_repo().find_by_guild(guild_id).await?;

        let mut responses = Vec::with_capacity(invites.len());
        for invite in invites {
            let creator = self
                .ctx
                .user_repo()
                .find_by_id(invite.creator_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("User", invite.creator_id.to_string()))?;

            responses.push(InviteResponse::from(InviteWithDetails {
                invite,
                guild: guild.clone(),
                creator,
                member_count,
            }));
        }

        Ok(responses)
    }

    /// Revoke an invite. Only its creator or a guild admin/owner may revoke it.
    #[instrument(skip(self))]
    pub async fn revoke_invite(&self, code: &str, user_id: Snowflake) -> ServiceResult<()> {
        let invite = self
            .ctx
            .invite_repo()
            .find_by_code(code)
            .await?
            .ok_or_else(|| ServiceError::not_found("Invite", code.to_string()))?;

        if invite.creator_id != user_id {
            let membership = self
                .ctx
                .membership_repo()
                .find(invite.guild_id, user_id)
                .await?
                .ok_or_else(|| ServiceError::permission_denied("Not authorized to revoke this invite"))?;

            if !membership.is_admin_or_owner() {
                return Err(ServiceError::permission_denied(
                    "Only the invite's creator or a guild admin can revoke it",
                ));
            }
        }

        self.ctx.invite_repo().delete(code).await?;

        info!(code = %code, "Invite revoked");
        Ok(())
    }

    /// Fetch an invite by code and ensure it hasn't expired.
    async fn get_valid_invite(&self, code: &str) -> ServiceResult<Invite> {
        let invite = self
            .ctx
            .invite_repo()
            .find_by_code(code)
            .await?
            .ok_or_else(|| ServiceError::not_found("Invite", code.to_string()))?;

        if invite.is_expired() {
            return Err(ServiceError::conflict("Invite has expired"));
        }

        Ok(invite)
    }
}

#[cfg(test)]
mod tests {
    // Integration tests would go here with mocked dependencies
}
