//! Invite entity - represents a revocable, expiring invite to a guild

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Invite entity. Simpler than a permanent `Guild.invite_code`: scoped to a
/// creator, always has an expiry, and is revocable independently of the
/// guild's own code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Invite {
    pub code: String,
    pub guild_id: Snowflake,
    pub creator_id: Snowflake,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl Invite {
    /// Create a new Invite expiring at the given instant
    pub fn new(code: String, guild_id: Snowflake, creator_id: Snowflake, expires_at: DateTime<Utc>) -> Self {
        Self {
            code,
            guild_id,
            creator_id,
            created_at: Utc::now(),
            expires_at,
        }
    }

    /// Check if invite is expired
    pub fn is_expired(&self) -> bool {
        Utc::now() > self.expires_at
    }

    /// Check if invite is still valid
    #[inline]
    pub fn is_valid(&self) -> bool {
        !self.is_expired()
    }
}

/// Generate a cryptographically secure random invite code: 8 uppercase
/// alphanumeric characters, fixed length (see DESIGN.md Open Question
/// decision on invite code length).
pub fn generate_invite_code() -> String {
    use rand::Rng;

    const CHARSET: &[u8] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
    const CODE_LEN: usize = 8;

    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| CHARSET[rng.gen_range(0..CHARSET.len())] as char)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn invite() -> Invite {
        Invite::new(
            "ABCD1234".to_string(),
            Snowflake::new(100),
            Snowflake::new(300),
            Utc::now() + Duration::hours(24),
        )
    }

    #[test]
    fn test_invite_creation() {
        let inv = invite();
        assert_eq!(inv.code, "ABCD1234");
        assert!(inv.is_valid());
        assert!(!inv.is_expired());
    }

    #[test]
    fn test_invite_expiry() {
        let inv = Invite::new(
            "ABCD1234".to_string(),
            Snowflake::new(100),
            Snowflake::new(300),
            Utc::now() - Duration::seconds(1),
        );
        assert!(inv.is_expired());
        assert!(!inv.is_valid());
    }

    #[test]
    fn test_generate_invite_code() {
        let code1 = generate_invite_code();
        let code2 = generate_invite_code();

        assert_eq!(code1.len(), 8);
        assert_eq!(code2.len(), 8);
        assert!(code1.chars().all(|c| c.is_ascii_uppercase() || c.is_ascii_digit()));
    }
}
