//! Message entity - represents a chat message

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Discriminates system-generated messages (join/leave notices) from
/// user-authored content, and leaves room for non-text payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    Text,
    Image,
    File,
    System,
}

impl std::fmt::Display for MessageType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Text => "text",
            Self::Image => "image",
            Self::File => "file",
            Self::System => "system",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for MessageType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "image" => Ok(Self::Image),
            "file" => Ok(Self::File),
            "system" => Ok(Self::System),
            other => Err(format!("invalid message type: {other}")),
        }
    }
}

/// Message entity. `sequence_id` is the per-guild gap-free ordering cursor
/// minted by `SeqGen` (§4.1); `id` is the globally unique Snowflake.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Message {
    pub id: Snowflake,
    pub guild_id: Snowflake,
    pub sender_id: Snowflake,
    pub content: String,
    pub msg_type: MessageType,
    pub sequence_id: i64,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

impl Message {
    /// Create a new Message
    pub fn new(
        id: Snowflake,
        guild_id: Snowflake,
        sender_id: Snowflake,
        content: String,
        msg_type: MessageType,
        sequence_id: i64,
    ) -> Self {
        Self {
            id,
            guild_id,
            sender_id,
            content,
            msg_type,
            sequence_id,
            created_at: Utc::now(),
            deleted_at: None,
        }
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    /// Soft-delete: content is tombstoned, the sequence slot stays occupied
    /// so `sequence_id` ordering never develops a gap.
    pub fn soft_delete(&mut self) {
        self.content.clear();
        self.deleted_at = Some(Utc::now());
    }

    /// Get a truncated preview of the message (for notifications)
    pub fn preview(&self, max_len: usize) -> &str {
        if self.content.len() <= max_len {
            &self.content
        } else {
            let mut end = max_len;
            while !self.content.is_char_boundary(end) && end > 0 {
                end -= 1;
            }
            &self.content[..end]
        }
    }

    /// Check if message content is empty
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.content.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn msg() -> Message {
        Message::new(
            Snowflake::new(1),
            Snowflake::new(100),
            Snowflake::new(200),
            "Hello, world!".to_string(),
            MessageType::Text,
            1,
        )
    }

    #[test]
    fn test_message_creation() {
        let m = msg();
        assert!(!m.is_deleted());
        assert!(!m.is_empty());
        assert_eq!(m.sequence_id, 1);
    }

    #[test]
    fn test_soft_delete_preserves_sequence() {
        let mut m = msg();
        let seq = m.sequence_id;
        m.soft_delete();
        assert!(m.is_deleted());
        assert!(m.content.is_empty());
        assert_eq!(m.sequence_id, seq, "soft delete must not shift the sequence cursor");
    }

    #[test]
    fn test_message_preview() {
        let m = msg();
        assert_eq!(m.preview(5), "Hello");
        assert_eq!(m.preview(100), "Hello, world!");
    }

    #[test]
    fn test_message_type_roundtrip() {
        assert_eq!("system".parse::<MessageType>().unwrap().to_string(), "system");
        assert!("bogus".parse::<MessageType>().is_err());
    }
}
