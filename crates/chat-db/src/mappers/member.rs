//! Membership entity <-> model mapper

use chat_core::entities::{GuildRole, Membership};
use chat_core::value_objects::Snowflake;

use crate::models::MembershipModel;

/// Convert MembershipModel to Membership entity
impl From<MembershipModel> for Membership {
    fn from(model: MembershipModel) -> Self {
        Membership {
            guild_id: Snowflake::new(model.guild_id),
            user_id: Snowflake::new(model.user_id),
            role: model.role.parse().unwrap_or(GuildRole::Member),
            last_read_seq: model.last_read_seq,
            joined_at: model.joined_at,
            updated_at: model.updated_at,
        }
    }
}

/// Convert a Membership entity reference to values for database insertion
pub struct MembershipInsert {
    pub guild_id: i64,
    pub user_id: i64,
    pub role: String,
    pub last_read_seq: i64,
}

impl MembershipInsert {
    pub fn new(member: &Membership) -> Self {
        Self {
            guild_id: member.guild_id.into_inner(),
            user_id: member.user_id.into_inner(),
            role: member.role.to_string(),
            last_read_seq: member.last_read_seq,
        }
    }
}

/// Convert a Membership entity reference to values for database update
pub struct MembershipUpdate {
    pub guild_id: i64,
    pub user_id: i64,
    pub role: String,
    pub last_read_seq: i64,
}

impl MembershipUpdate {
    pub fn new(member: &Membership) -> Self {
        Self {
            guild_id: member.guild_id.into_inner(),
            user_id: member.user_id.into_inner(),
            role: member.role.to_string(),
            last_read_seq: member.last_read_seq,
        }
    }
}
