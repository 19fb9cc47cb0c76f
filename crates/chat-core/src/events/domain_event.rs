//! Domain events - events emitted when domain state changes
//!
//! These events are used for:
//! - Notifying WebSocket clients of real-time updates
//! - Triggering side effects (e.g., cache invalidation)

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// All possible domain events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DomainEvent {
    GuildCreated(GuildCreatedEvent),
    GuildUpdated(GuildUpdatedEvent),
    GuildDeleted(GuildDeletedEvent),

    MessageCreated(MessageCreatedEvent),
    MessageDeleted(MessageDeletedEvent),

    MemberJoined(MemberJoinedEvent),
    MemberLeft(MemberLeftEvent),
    MemberKicked(MemberKickedEvent),
    MemberRoleChanged(MemberRoleChangedEvent),

    InviteCreated(InviteCreatedEvent),
    InviteRevoked(InviteRevokedEvent),

    PresenceUpdated(PresenceUpdatedEvent),
    TypingStarted(TypingStartedEvent),
}

impl DomainEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::GuildCreated(_) => "GUILD_CREATED",
            Self::GuildUpdated(_) => "GUILD_UPDATED",
            Self::GuildDeleted(_) => "GUILD_DELETED",
            Self::MessageCreated(_) => "MESSAGE_CREATED",
            Self::MessageDeleted(_) => "MESSAGE_DELETED",
            Self::MemberJoined(_) => "MEMBER_JOINED",
            Self::MemberLeft(_) => "MEMBER_LEFT",
            Self::MemberKicked(_) => "MEMBER_KICKED",
            Self::MemberRoleChanged(_) => "MEMBER_ROLE_CHANGED",
            Self::InviteCreated(_) => "INVITE_CREATED",
            Self::InviteRevoked(_) => "INVITE_REVOKED",
            Self::PresenceUpdated(_) => "PRESENCE_UPDATED",
            Self::TypingStarted(_) => "TYPING_STARTED",
        }
    }

    /// Get the timestamp of the event
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::GuildCreated(e) => e.timestamp,
            Self::GuildUpdated(e) => e.timestamp,
            Self::GuildDeleted(e) => e.timestamp,
            Self::MessageCreated(e) => e.timestamp,
            Self::MessageDeleted(e) => e.timestamp,
            Self::MemberJoined(e) => e.timestamp,
            Self::MemberLeft(e) => e.timestamp,
            Self::MemberKicked(e) => e.timestamp,
            Self::MemberRoleChanged(e) => e.timestamp,
            Self::InviteCreated(e) => e.timestamp,
            Self::InviteRevoked(e) => e.timestamp,
            Self::PresenceUpdated(e) => e.timestamp,
            Self::TypingStarted(e) => e.timestamp,
        }
    }

    /// Guild this event pertains to, if any — used by the Hub to route to
    /// the right room (§4.7).
    pub fn guild_id(&self) -> Option<Snowflake> {
        match self {
            Self::GuildCreated(e) => Some(e.guild_id),
            Self::GuildUpdated(e) => Some(e.guild_id),
            Self::GuildDeleted(e) => Some(e.guild_id),
            Self::MessageCreated(e) => Some(e.guild_id),
            Self::MessageDeleted(e) => Some(e.guild_id),
            Self::MemberJoined(e) => Some(e.guild_id),
            Self::MemberLeft(e) => Some(e.guild_id),
            Self::MemberKicked(e) => Some(e.guild_id),
            Self::MemberRoleChanged(e) => Some(e.guild_id),
            Self::InviteCreated(e) => Some(e.guild_id),
            Self::InviteRevoked(e) => Some(e.guild_id),
            Self::PresenceUpdated(_) => None,
            Self::TypingStarted(e) => Some(e.guild_id),
        }
    }
}

// ============================================================================
// Event Structs
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildCreatedEvent {
    pub guild_id: Snowflake,
    pub owner_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildUpdatedEvent {
    pub guild_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GuildDeletedEvent {
    pub guild_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageCreatedEvent {
    pub message_id: Snowflake,
    pub guild_id: Snowflake,
    pub sender_id: Snowflake,
    pub sequence_id: i64,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageDeletedEvent {
    pub message_id: Snowflake,
    pub guild_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberJoinedEvent {
    pub guild_id: Snowflake,
    pub user_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberLeftEvent {
    pub guild_id: Snowflake,
    pub user_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberKickedEvent {
    pub guild_id: Snowflake,
    pub user_id: Snowflake,
    pub kicked_by: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemberRoleChangedEvent {
    pub guild_id: Snowflake,
    pub user_id: Snowflake,
    pub role: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteCreatedEvent {
    pub code: String,
    pub guild_id: Snowflake,
    pub creator_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InviteRevokedEvent {
    pub code: String,
    pub guild_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceUpdatedEvent {
    pub user_id: Snowflake,
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TypingStartedEvent {
    pub guild_id: Snowflake,
    pub user_id: Snowflake,
    pub timestamp: DateTime<Utc>,
}

// ============================================================================
// Event Creation Helpers
// ============================================================================

impl GuildCreatedEvent {
    pub fn new(guild_id: Snowflake, owner_id: Snowflake) -> Self {
        Self { guild_id, owner_id, timestamp: Utc::now() }
    }
}

impl MessageCreatedEvent {
    pub fn new(message_id: Snowflake, guild_id: Snowflake, sender_id: Snowflake, sequence_id: i64) -> Self {
        Self { message_id, guild_id, sender_id, sequence_id, timestamp: Utc::now() }
    }
}

impl MemberJoinedEvent {
    pub fn new(guild_id: Snowflake, user_id: Snowflake) -> Self {
        Self { guild_id, user_id, timestamp: Utc::now() }
    }
}

impl MemberLeftEvent {
    pub fn new(guild_id: Snowflake, user_id: Snowflake) -> Self {
        Self { guild_id, user_id, timestamp: Utc::now() }
    }
}

impl TypingStartedEvent {
    pub fn new(guild_id: Snowflake, user_id: Snowflake) -> Self {
        Self { guild_id, user_id, timestamp: Utc::now() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_serialization() {
        let event = DomainEvent::MessageCreated(MessageCreatedEvent::new(
            Snowflake::new(1),
            Snowflake::new(2),
            Snowflake::new(4),
            42,
        ));

        let json = serde_json::to_string(&event).unwrap();
        assert!(json.contains("MESSAGE_CREATED"));

        let parsed: DomainEvent = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.event_type(), "MESSAGE_CREATED");
        assert_eq!(parsed.guild_id(), Some(Snowflake::new(2)));
    }

    #[test]
    fn test_event_type() {
        let event = DomainEvent::GuildCreated(GuildCreatedEvent::new(Snowflake::new(1), Snowflake::new(2)));
        assert_eq!(event.event_type(), "GUILD_CREATED");
    }

    #[test]
    fn test_presence_event_has_no_guild() {
        let event = DomainEvent::PresenceUpdated(PresenceUpdatedEvent {
            user_id: Snowflake::new(1),
            status: "online".to_string(),
            timestamp: Utc::now(),
        });
        assert_eq!(event.guild_id(), None);
    }
}
