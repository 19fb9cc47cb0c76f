//! Membership service
//!
//! Handles joining guilds via invite codes, listing/managing members, role
//! changes, kicks, and the read-cursor ack used for unread counts.

use chat_cache::{PubSubChannel, PubSubEvent};
use chat_core::entities::{GuildRole, Membership};
use chat_core::Snowflake;
use serde_json::json;
use tracing::{info, instrument};

use crate::dto::{MemberResponse, MemberWithUser};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// Membership service
pub struct MembershipService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> MembershipService<'a> {
    /// Create a new MembershipService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Join a guild via its permanent invite code or a revocable invite code.
    #[instrument(skip(self))]
    pub async fn join_guild(&self, user_id: Snowflake, invite_code: &str) -> ServiceResult<MemberResponse> {
        let guild_id = if let Some(guild) = self.ctx.guild_repo().find_by_invite_code(invite_code).await? {
            guild.id
        } else {
            let invite = self
                .ctx
                .invite_repo()
                .find_by_code(invite_code)
                .await?
                .ok_or_else(|| ServiceError::not_found("Invite", invite_code.to_string()))?;

            if invite.is_expired() {
                return Err(ServiceError::conflict("Invite has expired"));
            }

            invite.guild_id
        };

        if self.ctx.membership_repo().is_member(guild_id, user_id).await? {
            return Err(ServiceError::conflict("Already a member of this guild"));
        }

        let membership = Membership::new(guild_id, user_id, GuildRole::Member);
        self.ctx.membership_repo().create(&membership).await?;

        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))?;

        info!(guild_id = %guild_id, user_id = %user_id, "User joined guild");

        let event = PubSubEvent::new(
            "GUILD_MEMBER_ADD",
            json!({
                "guild_id": guild_id.to_string(),
                "user_id": user_id.to_string(),
                "role": membership.role.to_string(),
            }),
        );
        self.ctx
            .publisher()
            .publish(&PubSubChannel::guild(guild_id), &event)
            .await
            .ok();

        Ok(MemberResponse::from(MemberWithUser { membership, user }))
    }

    /// Get a single member's record, with their user profile attached.
    #[instrument(skip(self))]
    pub async fn get_member(&self, guild_id: Snowflake, user_id: Snowflake) -> ServiceResult<MemberResponse> {
        let membership = self.get_membership(guild_id, user_id).await?;

        let user = self
            .ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))?;

        Ok(MemberResponse::from(MemberWithUser { membership, user }))
    }

    /// Raw membership lookup, used internally by other services.
    #[instrument(skip(self))]
    pub async fn get_membership(&self, guild_id: Snowflake, user_id: Snowflake) -> ServiceResult<Membership> {
        self.ctx
            .membership_repo()
            .find(guild_id, user_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("Member", format!("{guild_id}/{user_id}")))
    }

    /// List members in a guild, paginated by a cursor user id.
    #[instrument(skip(self))]
    pub async fn list_members(
        &self,
        guild_id: Snowflake,
        limit: i64,
        after: Option<Snowflake>,
    ) -> ServiceResult<Vec<MemberResponse>> {
        let memberships = self.ctx.membership_repo().find_by_guild(guild_id, limit, after).await?;

        let mut members = Vec::with_capacity(memberships.len());
        for membership in memberships {
            let user = self
                .ctx
                .user_repo()
                .find_by_id(membership.user_id)
                .await?
                .ok_or_else(|| ServiceError::not_found("User", membership.user_id.to_string()))?;
            members.push(MemberResponse::from(MemberWithUser { membership, user }));
        }

        Ok(members)
    }

    /// Change a member's role. Owner/admin only; cannot create a second
    /// owner, and admins cannot change the owner's role.
    #[instrument(skip(self))]
    pub async fn update_member_role(
        &self,
        guild_id: Snowflake,
        actor_id: Snowflake,
        target_id: Snowflake,
        new_role: GuildRole,
    ) -> ServiceResult<MemberResponse> {
        if matches!(new_role, GuildRole::Owner) {
            return Err(ServiceError::validation(
                "Use the ownership transfer endpoint to assign a new owner",
            ));
        }

        let actor_membership = self.get_membership(guild_id, actor_id).await?;
        if !actor_membership.is_admin_or_owner() {
            return Err(ServiceError::permission_denied("Only an admin or owner can change roles"));
        }

        let mut target_membership = self.get_membership(guild_id, target_id).await?;
        if target_membership.is_owner() {
            return Err(ServiceError::permission_denied("Cannot change the owner's role"));
        }

        target_membership.set_role(new_role);
        self.ctx.membership_repo().update(&target_membership).await?;

        let user = self
            .ctx
            .user_repo()
            .find_by_id(target_id)
            .await?
            .ok_or_else(|| ServiceError::not_found("User", target_id.to_string()))?;

        info!(guild_id = %guild_id, target_id = %target_id, new_role = %new_role, "Member role updated");

        let event = PubSubEvent::new(
            "GUILD_MEMBER_UPDATE",
            json!({
                "guild_id": guild_id.to_string(),
                "user_id": target_id.to_string(),
                "role": new_role.to_string(),
            }),
        );
        self.ctx
            .publisher()
            .publish(&PubSubChannel::guild(guild_id), &event)
            .await
            .ok();

        Ok(MemberResponse::from(MemberWithUser { membership: target_membership, user }))
    }

    /// Remove (kick) a member. Owner/admin only; the owner cannot be kicked.
    #[instrument(skip(self))]
    pub async fn remove_member(
        &self,
        guild_id: Snowflake,
        actor_id: Snowflake,
        target_id: Snowflake,
    ) -> ServiceResult<()> {
        let actor_membership = self.get_membership(guild_id, actor_id).await?;
        if !actor_membership.is_admin_or_owner() {
            return Err(ServiceError::permission_denied("Only an admin or owner can remove members"));
        }

        let target_membership = self.get_membership(guild_id, target_id).await?;
        if target_membership.is_owner() {
            return Err(ServiceError::permission_denied("Cannot remove the guild owner"));
        }

        self.ctx.membership_repo().delete(guild_id, target_id).await?;

        info!(guild_id = %guild_id, target_id = %target_id, "Member removed");

        let event = PubSubEvent::new(
            "GUILD_MEMBER_REMOVE",
            json!({
                "guild_id": guild_id.to_string(),
                "user_id": target_id.to_string(),
            }),
        );
        self.ctx
            .publisher()
            .publish(&PubSubChannel::guild(guild_id), &event)
            .await
            .ok();

        Ok(())
    }

    /// Advance a member's read cursor (I4: unread = maxSeq - last_read_seq).
    #[instrument(skip(self))]
    pub async fn ack_messages(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        sequence_id: i64,
    ) -> ServiceResult<()> {
        if !self.ctx.membership_repo().is_member(guild_id, user_id).await? {
            return Err(ServiceError::not_found("Member", format!("{guild_id}/{user_id}")));
        }

        self.ctx.membership_repo().mark_read(guild_id, user_id, sequence_id).await?;
        Ok(())
    }
}
