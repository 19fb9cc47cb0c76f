//! Guild entity - represents a chat group

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// Guild (group) entity. Every guild carries a single permanent, non-expiring
/// invite code minted atomically with the guild (see Open Question decision
/// in DESIGN.md); `Invite` models additional, revocable, expiring invites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Guild {
    pub id: Snowflake,
    pub name: String,
    pub owner_id: Snowflake,
    pub invite_code: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Guild {
    /// Create a new Guild
    pub fn new(id: Snowflake, name: String, owner_id: Snowflake, invite_code: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            name,
            owner_id,
            invite_code,
            created_at: now,
            updated_at: now,
        }
    }

    /// Check if a user is the guild owner
    #[inline]
    pub fn is_owner(&self, user_id: Snowflake) -> bool {
        self.owner_id == user_id
    }

    /// Update the guild name
    pub fn set_name(&mut self, name: String) {
        self.name = name;
        self.updated_at = Utc::now();
    }

    /// Transfer ownership to another user
    pub fn transfer_ownership(&mut self, new_owner_id: Snowflake) {
        self.owner_id = new_owner_id;
        self.updated_at = Utc::now();
    }

    /// Rotate the guild's permanent invite code
    pub fn rotate_invite_code(&mut self, new_code: String) {
        self.invite_code = new_code;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guild_creation() {
        let guild = Guild::new(
            Snowflake::new(1),
            "Test Guild".to_string(),
            Snowflake::new(100),
            "ABCD1234".to_string(),
        );
        assert_eq!(guild.name, "Test Guild");
        assert!(guild.is_owner(Snowflake::new(100)));
        assert!(!guild.is_owner(Snowflake::new(200)));
    }

    #[test]
    fn test_transfer_ownership() {
        let mut guild = Guild::new(
            Snowflake::new(1),
            "Test".to_string(),
            Snowflake::new(100),
            "ABCD1234".to_string(),
        );
        assert!(guild.is_owner(Snowflake::new(100)));

        guild.transfer_ownership(Snowflake::new(200));
        assert!(!guild.is_owner(Snowflake::new(100)));
        assert!(guild.is_owner(Snowflake::new(200)));
    }

    #[test]
    fn test_rotate_invite_code() {
        let mut guild = Guild::new(
            Snowflake::new(1),
            "Test".to_string(),
            Snowflake::new(100),
            "ABCD1234".to_string(),
        );
        guild.rotate_invite_code("WXYZ9876".to_string());
        assert_eq!(guild.invite_code, "WXYZ9876");
    }
}
