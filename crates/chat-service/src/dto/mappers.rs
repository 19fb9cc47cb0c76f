//! Entity to DTO mappers
//!
//! Implements `From` conversions from domain entities to response DTOs.

use chat_core::entities::{Guild, Invite, Membership, Message, User};

use super::responses::{
    CurrentUserResponse, GuildPreviewResponse, GuildResponse, GuildWithMembershipResponse,
    InviteResponse, MemberResponse, MessageResponse, PresenceResponse, UserResponse,
};

// ============================================================================
// User Mappers
// ============================================================================

impl From<&User> for UserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            display_name: user.display_name().to_string(),
            avatar_url: user.avatar_url.clone(),
            status: user.status.to_string(),
            created_at: user.created_at,
        }
    }
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

impl From<&User> for CurrentUserResponse {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            username: user.username.clone(),
            display_name: user.display_name().to_string(),
            email: user.email.clone(),
            avatar_url: user.avatar_url.clone(),
            status: user.status.to_string(),
            created_at: user.created_at,
        }
    }
}

impl From<User> for CurrentUserResponse {
    fn from(user: User) -> Self {
        Self::from(&user)
    }
}

impl From<&User> for PresenceResponse {
    fn from(user: &User) -> Self {
        Self {
            user_id: user.id.to_string(),
            status: user.status.to_string(),
        }
    }
}

// ============================================================================
// Guild Mappers
// ============================================================================

impl From<&Guild> for GuildResponse {
    fn from(guild: &Guild) -> Self {
        Self {
            id: guild.id.to_string(),
            name: guild.name.clone(),
            owner_id: guild.owner_id.to_string(),
            invite_code: guild.invite_code.clone(),
            created_at: guild.created_at,
        }
    }
}

impl From<Guild> for GuildResponse {
    fn from(guild: Guild) -> Self {
        Self::from(&guild)
    }
}

impl From<&Guild> for GuildPreviewResponse {
    fn from(guild: &Guild) -> Self {
        Self {
            id: guild.id.to_string(),
            name: guild.name.clone(),
            member_count: 0, // caller fills in via GuildWithMembership / GuildWithMembers
        }
    }
}

/// A guild paired with the caller's own membership, for `GET /guilds/mine`.
pub struct GuildWithMembership {
    pub guild: Guild,
    pub membership: Membership,
    pub member_count: i64,
    pub latest_seq: i64,
}

impl From<GuildWithMembership> for GuildWithMembershipResponse {
    fn from(gwm: GuildWithMembership) -> Self {
        Self {
            guild: GuildResponse::from(&gwm.guild),
            member_count: gwm.member_count,
            role: gwm.membership.role.to_string(),
            unread_count: gwm.membership.unread_count(gwm.latest_seq),
        }
    }
}

/// A guild paired with a member count, for invite/preview resolution.
pub struct GuildWithCount {
    pub guild: Guild,
    pub member_count: i64,
}

impl From<GuildWithCount> for GuildPreviewResponse {
    fn from(gwc: GuildWithCount) -> Self {
        Self {
            id: gwc.guild.id.to_string(),
            name: gwc.guild.name,
            member_count: gwc.member_count,
        }
    }
}

// ============================================================================
// Message Mappers
// ============================================================================

impl From<&Message> for MessageResponse {
    fn from(message: &Message) -> Self {
        Self {
            id: message.id.to_string(),
            guild_id: message.guild_id.to_string(),
            sender_id: message.sender_id.to_string(),
            content: message.content.clone(),
            msg_type: message.msg_type.to_string(),
            sequence_id: message.sequence_id,
            timestamp_ms: message.created_at.timestamp_millis(),
        }
    }
}

impl From<Message> for MessageResponse {
    fn from(message: Message) -> Self {
        Self::from(&message)
    }
}

// ============================================================================
// Membership Mappers
// ============================================================================

/// A membership paired with the member's user record.
pub struct MemberWithUser {
    pub membership: Membership,
    pub user: User,
}

impl From<MemberWithUser> for MemberResponse {
    fn from(mwu: MemberWithUser) -> Self {
        Self {
            user: UserResponse::from(mwu.user),
            role: mwu.membership.role.to_string(),
            last_read_seq: mwu.membership.last_read_seq,
            joined_at: mwu.membership.joined_at,
        }
    }
}

// ============================================================================
// Invite Mappers
// ============================================================================

/// An invite paired with its guild and creator, for full resolution responses.
pub struct InviteWithDetails {
    pub invite: Invite,
    pub guild: Guild,
    pub creator: User,
    pub member_count: i64,
}

impl From<InviteWithDetails> for InviteResponse {
    fn from(details: InviteWithDetails) -> Self {
        Self {
            code: details.invite.code,
            guild: GuildPreviewResponse {
                id: details.guild.id.to_string(),
                name: details.guild.name,
                member_count: details.member_count,
            },
            creator: UserResponse::from(details.creator),
            created_at: details.invite.created_at,
            expires_at: details.invite.expires_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_core::entities::{GuildRole, MessageType, UserStatus};
    use chat_core::Snowflake;
    use chrono::Utc;

    fn test_user() -> User {
        User::new(
            Snowflake::new(123456789),
            "testuser".to_string(),
            "test@example.com".to_string(),
            "hash".to_string(),
        )
    }

    fn test_guild() -> Guild {
        Guild::new(
            Snowflake::new(987654321),
            "Test Guild".to_string(),
            Snowflake::new(123456789),
            "ABCD1234".to_string(),
        )
    }

    #[test]
    fn test_user_to_user_response() {
        let user = test_user();
        let response = UserResponse::from(&user);

        assert_eq!(response.id, "123456789");
        assert_eq!(response.username, "testuser");
        assert_eq!(response.display_name, "testuser");
        assert_eq!(response.status, "offline");
    }

    #[test]
    fn test_user_to_current_user_response() {
        let user = test_user();
        let response = CurrentUserResponse::from(&user);

        assert_eq!(response.email, "test@example.com");
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let mut user = test_user();
        user.set_display_name(Some("Alice".to_string()));
        assert_eq!(UserResponse::from(&user).display_name, "Alice");
    }

    #[test]
    fn test_guild_to_guild_response() {
        let guild = test_guild();
        let response = GuildResponse::from(&guild);

        assert_eq!(response.id, "987654321");
        assert_eq!(response.name, "Test Guild");
        assert_eq!(response.owner_id, "123456789");
        assert_eq!(response.invite_code, "ABCD1234");
    }

    #[test]
    fn test_guild_with_membership_unread_count() {
        let guild = test_guild();
        let mut membership = Membership::new(guild.id, Snowflake::new(1), GuildRole::Member);
        membership.mark_read(5);

        let response = GuildWithMembershipResponse::from(GuildWithMembership {
            guild,
            membership,
            member_count: 3,
            latest_seq: 12,
        });

        assert_eq!(response.member_count, 3);
        assert_eq!(response.role, "member");
        assert_eq!(response.unread_count, 7);
    }

    #[test]
    fn test_message_to_message_response() {
        let message = Message::new(
            Snowflake::new(1),
            Snowflake::new(100),
            Snowflake::new(200),
            "hello".to_string(),
            MessageType::Text,
            42,
        );
        let response = MessageResponse::from(&message);

        assert_eq!(response.sequence_id, 42);
        assert_eq!(response.content, "hello");
        assert_eq!(response.msg_type, "text");
    }

    #[test]
    fn test_member_with_user_to_response() {
        let user = test_user();
        let membership = Membership::new(Snowflake::new(987654321), user.id, GuildRole::Admin);

        let response = MemberResponse::from(MemberWithUser { membership, user });

        assert_eq!(response.role, "admin");
        assert_eq!(response.last_read_seq, 0);
    }

    #[test]
    fn test_invite_with_details_to_response() {
        let guild = test_guild();
        let creator = test_user();
        let invite = Invite::new(
            "WXYZ9876".to_string(),
            guild.id,
            creator.id,
            Utc::now() + chrono::Duration::hours(24),
        );

        let response = InviteResponse::from(InviteWithDetails {
            invite,
            guild,
            creator,
            member_count: 10,
        });

        assert_eq!(response.code, "WXYZ9876");
        assert_eq!(response.guild.member_count, 10);
    }

    #[test]
    fn test_presence_response_from_user() {
        let mut user = test_user();
        user.set_status(UserStatus::Online);
        let response = PresenceResponse::from(&user);
        assert_eq!(response.status, "online");
    }
}
