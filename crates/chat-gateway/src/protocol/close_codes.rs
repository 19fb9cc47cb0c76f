//! WebSocket close codes
//!
//! The gateway's wire protocol has no in-band error opcode: invalid
//! messages stay on the connection as a `SYSTEM` frame (§4.8). Close codes
//! are reserved for cases where the connection itself cannot continue.

use serde::{Deserialize, Serialize};

/// Gateway WebSocket close codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u16)]
pub enum CloseCode {
    /// A second successful upgrade for the same user replaced this session (I2).
    SessionReplaced = 4000,
    /// Frame failed to decode as protobuf or JSON, or exceeded the content cap.
    DecodeError = 4002,
    /// No pong observed within the heartbeat timeout.
    HeartbeatTimeout = 4009,
}

impl CloseCode {
    #[must_use]
    pub const fn as_u16(self) -> u16 {
        self as u16
    }

    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::SessionReplaced => "Session replaced by a newer connection",
            Self::DecodeError => "Invalid frame encoding",
            Self::HeartbeatTimeout => "Heartbeat timeout",
        }
    }
}

impl std::fmt::Display for CloseCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({}): {}", self.as_u16(), self.as_u16(), self.description())
    }
}

impl From<CloseCode> for u16 {
    fn from(code: CloseCode) -> Self {
        code.as_u16()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_close_code_values() {
        assert_eq!(CloseCode::SessionReplaced.as_u16(), 4000);
        assert_eq!(CloseCode::DecodeError.as_u16(), 4002);
        assert_eq!(CloseCode::HeartbeatTimeout.as_u16(), 4009);
    }
}
