//! Message entity <-> model mapper

use chat_core::entities::{Message, MessageType};
use chat_core::value_objects::Snowflake;

use crate::models::MessageModel;

/// Convert MessageModel to Message entity
impl From<MessageModel> for Message {
    fn from(model: MessageModel) -> Self {
        Message {
            id: Snowflake::new(model.id),
            guild_id: Snowflake::new(model.guild_id),
            sender_id: Snowflake::new(model.sender_id),
            content: model.content,
            msg_type: model.msg_type.parse().unwrap_or(MessageType::Text),
            sequence_id: model.sequence_id,
            created_at: model.created_at,
            deleted_at: model.deleted_at,
        }
    }
}

/// Convert a Message entity reference to values for database insertion
pub struct MessageInsert<'a> {
    pub id: i64,
    pub guild_id: i64,
    pub sender_id: i64,
    pub content: &'a str,
    pub msg_type: String,
    pub sequence_id: i64,
}

impl<'a> MessageInsert<'a> {
    pub fn new(message: &'a Message) -> Self {
        Self {
            id: message.id.into_inner(),
            guild_id: message.guild_id.into_inner(),
            sender_id: message.sender_id.into_inner(),
            content: &message.content,
            msg_type: message.msg_type.to_string(),
            sequence_id: message.sequence_id,
        }
    }
}
