//! Wire format for the gateway's single frame type.
//!
//! `WSMessage` is sent both directions: client frames carry a user's
//! outbound chat message, server frames carry the persisted/fanned-out
//! result (or a `SYSTEM` error). It is encoded as binary protobuf via
//! `prost`'s derive macro (no `.proto` file — the struct tags are the
//! source of truth) with a JSON fallback for clients that send text frames.

use prost::Message;
use serde::{Deserialize, Serialize};

/// Discriminates a user-authored chat line from a server-generated notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[repr(i32)]
pub enum MsgType {
    Text = 0,
    System = 1,
}

impl MsgType {
    #[must_use]
    pub fn from_i32(v: i32) -> Self {
        match v {
            1 => Self::System,
            _ => Self::Text,
        }
    }
}

impl Default for MsgType {
    fn default() -> Self {
        Self::Text
    }
}

/// The one frame shape the gateway speaks, in either direction.
///
/// `prost::Message` is implemented by hand below rather than derived: a
/// plain enum field doesn't satisfy prost's `Message` bound for nested
/// types, so `r#type` is carried on the wire as `i32` (tag 7) and
/// converted at the edges via `MsgType::from_i32`/`as i32`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WSMessage {
    #[serde(default)]
    pub message_id: String,
    #[serde(default)]
    pub user_id: String,
    #[serde(default)]
    pub guild_id: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub seq_id: i64,
    #[serde(default)]
    pub timestamp_ms: i64,
    #[serde(default)]
    pub r#type: MsgType,
    #[serde(default)]
    pub username: String,
}

impl From<&chat_core::Message> for WSMessage {
    /// Replay shape for an inbox entry (§4.9): the persisted record carries
    /// no `username`, so that field is left blank rather than faked — the
    /// client already has it from guild membership data.
    fn from(message: &chat_core::Message) -> Self {
        let r#type = match message.msg_type {
            chat_core::MessageType::System => MsgType::System,
            _ => MsgType::Text,
        };
        Self {
            message_id: message.id.to_string(),
            user_id: message.sender_id.to_string(),
            guild_id: message.guild_id.to_string(),
            content: message.content.clone(),
            seq_id: message.sequence_id,
            timestamp_ms: message.created_at.timestamp_millis(),
            r#type,
            username: String::new(),
        }
    }
}

impl WSMessage {
    #[must_use]
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            r#type: MsgType::System,
            content: content.into(),
            timestamp_ms: chrono::Utc::now().timestamp_millis(),
            ..Default::default()
        }
    }

    /// Decode a frame, trying protobuf first and falling back to JSON —
    /// the order the wire format document specifies.
    pub fn decode_frame(bytes: &[u8]) -> Result<Self, String> {
        if let Ok(msg) = Self::decode(bytes) {
            return Ok(msg);
        }
        serde_json::from_slice(bytes).map_err(|e| e.to_string())
    }

    #[must_use]
    pub fn encode_frame(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.encoded_len());
        // infallible: buf has reserved capacity and Vec<u8> never errors on write
        Message::encode(self, &mut buf).expect("encoding WSMessage into a Vec cannot fail");
        buf
    }
}

impl Default for WSMessage {
    fn default() -> Self {
        Self {
            message_id: String::new(),
            user_id: String::new(),
            guild_id: String::new(),
            content: String::new(),
            seq_id: 0,
            timestamp_ms: 0,
            r#type: MsgType::Text,
            username: String::new(),
        }
    }
}

impl prost::Message for WSMessage {
    fn encode_raw(&self, buf: &mut impl bytes::BufMut)
    where
        Self: Sized,
    {
        if !self.message_id.is_empty() {
            prost::encoding::string::encode(1, &self.message_id, buf);
        }
        if !self.user_id.is_empty() {
            prost::encoding::string::encode(2, &self.user_id, buf);
        }
        if !self.guild_id.is_empty() {
            prost::encoding::string::encode(3, &self.guild_id, buf);
        }
        if !self.content.is_empty() {
            prost::encoding::string::encode(4, &self.content, buf);
        }
        if self.seq_id != 0 {
            prost::encoding::int64::encode(5, &self.seq_id, buf);
        }
        if self.timestamp_ms != 0 {
            prost::encoding::int64::encode(6, &self.timestamp_ms, buf);
        }
        let type_val = self.r#type as i32;
        if type_val != 0 {
            prost::encoding::int32::encode(7, &type_val, buf);
        }
        if !self.username.is_empty() {
            prost::encoding::string::encode(8, &self.username, buf);
        }
    }

    fn merge_field(
        &mut self,
        tag: u32,
        wire_type: prost::encoding::WireType,
        buf: &mut impl bytes::Buf,
        ctx: prost::encoding::DecodeContext,
    ) -> Result<(), prost::DecodeError>
    where
        Self: Sized,
    {
        match tag {
            1 => prost::encoding::string::merge(wire_type, &mut self.message_id, buf, ctx),
            2 => prost::encoding::string::merge(wire_type, &mut self.user_id, buf, ctx),
            3 => prost::encoding::string::merge(wire_type, &mut self.guild_id, buf, ctx),
            4 => prost::encoding::string::merge(wire_type, &mut self.content, buf, ctx),
            5 => prost::encoding::int64::merge(wire_type, &mut self.seq_id, buf, ctx),
            6 => prost::encoding::int64::merge(wire_type, &mut self.timestamp_ms, buf, ctx),
            7 => {
                let mut raw = self.r#type as i32;
                prost::encoding::int32::merge(wire_type, &mut raw, buf, ctx)?;
                self.r#type = MsgType::from_i32(raw);
                Ok(())
            }
            8 => prost::encoding::string::merge(wire_type, &mut self.username, buf, ctx),
            _ => prost::encoding::skip_field(wire_type, tag, buf, ctx),
        }
    }

    fn encoded_len(&self) -> usize {
        let mut len = 0;
        if !self.message_id.is_empty() {
            len += prost::encoding::string::encoded_len(1, &self.message_id);
        }
        if !self.user_id.is_empty() {
            len += prost::encoding::string::encoded_len(2, &self.user_id);
        }
        if !self.guild_id.is_empty() {
            len += prost::encoding::string::encoded_len(3, &self.guild_id);
        }
        if !self.content.is_empty() {
            len += prost::encoding::string::encoded_len(4, &self.content);
        }
        if self.seq_id != 0 {
            len += prost::encoding::int64::encoded_len(5, &self.seq_id);
        }
        if self.timestamp_ms != 0 {
            len += prost::encoding::int64::encoded_len(6, &self.timestamp_ms);
        }
        let type_val = self.r#type as i32;
        if type_val != 0 {
            len += prost::encoding::int32::encoded_len(7, &type_val);
        }
        if !self.username.is_empty() {
            len += prost::encoding::string::encoded_len(8, &self.username);
        }
        len
    }

    fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_protobuf_roundtrip() {
        let msg = WSMessage {
            message_id: "1".into(),
            user_id: "2".into(),
            guild_id: "10".into(),
            content: "hi".into(),
            seq_id: 1,
            timestamp_ms: 1_700_000_000_000,
            r#type: MsgType::Text,
            username: "alice".into(),
        };
        let bytes = msg.encode_frame();
        let decoded = WSMessage::decode_frame(&bytes).unwrap();
        assert_eq!(msg, decoded);
    }

    #[test]
    fn test_json_fallback() {
        let msg = WSMessage::system("not a member");
        let json = serde_json::to_vec(&msg).unwrap();
        let decoded = WSMessage::decode_frame(&json).unwrap();
        assert_eq!(decoded.r#type, MsgType::System);
        assert_eq!(decoded.content, "not a member");
    }

    #[test]
    fn test_system_frame_defaults() {
        let msg = WSMessage::system("boom");
        assert_eq!(msg.r#type, MsgType::System);
        assert!(msg.timestamp_ms > 0);
    }

    #[test]
    fn test_from_persisted_message_carries_seq_id() {
        use chat_core::{Message, MessageType, Snowflake};

        let persisted = Message::new(
            Snowflake::new(1),
            Snowflake::new(10),
            Snowflake::new(100),
            "hi".into(),
            MessageType::Text,
            4,
        );
        let frame = WSMessage::from(&persisted);
        assert_eq!(frame.seq_id, 4);
        assert_eq!(frame.content, "hi");
        assert_eq!(frame.r#type, MsgType::Text);
    }
}
