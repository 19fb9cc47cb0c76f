//! Guild entity <-> model mapper

use chat_core::entities::Guild;
use chat_core::value_objects::Snowflake;

use crate::models::GuildModel;

/// Convert GuildModel to Guild entity
impl From<GuildModel> for Guild {
    fn from(model: GuildModel) -> Self {
        Guild {
            id: Snowflake::new(model.id),
            name: model.name,
            owner_id: Snowflake::new(model.owner_id),
            invite_code: model.invite_code,
            created_at: model.created_at,
            updated_at: model.updated_at,
        }
    }
}

/// Convert a Guild entity reference to values for database insertion
pub struct GuildInsert<'a> {
    pub id: i64,
    pub name: &'a str,
    pub owner_id: i64,
    pub invite_code: &'a str,
}

impl<'a> GuildInsert<'a> {
    pub fn new(guild: &'a Guild) -> Self {
        Self {
            id: guild.id.into_inner(),
            name: &guild.name,
            owner_id: guild.owner_id.into_inner(),
            invite_code: &guild.invite_code,
        }
    }
}

/// Convert a Guild entity reference to values for database update
pub struct GuildUpdate<'a> {
    pub id: i64,
    pub name: &'a str,
    pub owner_id: i64,
    pub invite_code: &'a str,
}

impl<'a> GuildUpdate<'a> {
    pub fn new(guild: &'a Guild) -> Self {
        Self {
            id: guild.id.into_inner(),
            name: &guild.name,
            owner_id: guild.owner_id.into_inner(),
            invite_code: &guild.invite_code,
        }
    }
}
