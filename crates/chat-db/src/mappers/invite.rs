//! Invite entity <-> model mapper

use chat_core::entities::Invite;
use chat_core::value_objects::Snowflake;

use crate::models::InviteModel;

/// Convert InviteModel to Invite entity
impl From<InviteModel> for Invite {
    fn from(model: InviteModel) -> Self {
        Invite {
            code: model.code,
            guild_id: Snowflake::new(model.guild_id),
            creator_id: Snowflake::new(model.creator_id),
            created_at: model.created_at,
            expires_at: model.expires_at,
        }
    }
}

/// Convert an Invite entity reference to values for database insertion
pub struct InviteInsert<'a> {
    pub code: &'a str,
    pub guild_id: i64,
    pub creator_id: i64,
    pub expires_at: chrono::DateTime<chrono::Utc>,
}

impl<'a> InviteInsert<'a> {
    pub fn new(invite: &'a Invite) -> Self {
        Self {
            code: &invite.code,
            guild_id: invite.guild_id.into_inner(),
            creator_id: invite.creator_id.into_inner(),
            expires_at: invite.expires_at,
        }
    }
}
