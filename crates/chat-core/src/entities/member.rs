//! Membership entity - represents a user's membership in a guild

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// A member's role within a guild. Single role per member, no permission
/// bitsets: Owner (exactly one, the guild creator), Admin (can manage
/// members/invites), Member (default).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GuildRole {
    Owner,
    Admin,
    Member,
}

impl std::fmt::Display for GuildRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Owner => "owner",
            Self::Admin => "admin",
            Self::Member => "member",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for GuildRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "owner" => Ok(Self::Owner),
            "admin" => Ok(Self::Admin),
            "member" => Ok(Self::Member),
            other => Err(format!("invalid guild role: {other}")),
        }
    }
}

/// Membership entity (junction between User and Guild).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Membership {
    pub guild_id: Snowflake,
    pub user_id: Snowflake,
    pub role: GuildRole,
    /// Highest message sequence_id this member has read, for unread counts.
    pub last_read_seq: i64,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Membership {
    /// Create a new Membership
    pub fn new(guild_id: Snowflake, user_id: Snowflake, role: GuildRole) -> Self {
        let now = Utc::now();
        Self {
            guild_id,
            user_id,
            role,
            last_read_seq: 0,
            joined_at: now,
            updated_at: now,
        }
    }

    #[inline]
    pub fn is_owner(&self) -> bool {
        matches!(self.role, GuildRole::Owner)
    }

    #[inline]
    pub fn is_admin_or_owner(&self) -> bool {
        matches!(self.role, GuildRole::Owner | GuildRole::Admin)
    }

    pub fn set_role(&mut self, role: GuildRole) {
        self.role = role;
        self.updated_at = Utc::now();
    }

    /// Advance the read cursor; no-op if `seq` does not move it forward.
    pub fn mark_read(&mut self, seq: i64) {
        if seq > self.last_read_seq {
            self.last_read_seq = seq;
            self.updated_at = Utc::now();
        }
    }

    #[inline]
    pub fn unread_count(&self, latest_seq: i64) -> i64 {
        (latest_seq - self.last_read_seq).max(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_member_creation() {
        let member = Membership::new(Snowflake::new(100), Snowflake::new(200), GuildRole::Member);
        assert_eq!(member.guild_id, Snowflake::new(100));
        assert_eq!(member.user_id, Snowflake::new(200));
        assert_eq!(member.last_read_seq, 0);
        assert!(!member.is_owner());
    }

    #[test]
    fn test_role_checks() {
        let owner = Membership::new(Snowflake::new(1), Snowflake::new(2), GuildRole::Owner);
        assert!(owner.is_owner());
        assert!(owner.is_admin_or_owner());

        let admin = Membership::new(Snowflake::new(1), Snowflake::new(3), GuildRole::Admin);
        assert!(!admin.is_owner());
        assert!(admin.is_admin_or_owner());

        let member = Membership::new(Snowflake::new(1), Snowflake::new(4), GuildRole::Member);
        assert!(!member.is_admin_or_owner());
    }

    #[test]
    fn test_mark_read_monotonic() {
        let mut member = Membership::new(Snowflake::new(1), Snowflake::new(2), GuildRole::Member);
        member.mark_read(10);
        assert_eq!(member.last_read_seq, 10);
        member.mark_read(5);
        assert_eq!(member.last_read_seq, 10, "read cursor must not move backwards");
        member.mark_read(20);
        assert_eq!(member.last_read_seq, 20);
    }

    #[test]
    fn test_unread_count() {
        let mut member = Membership::new(Snowflake::new(1), Snowflake::new(2), GuildRole::Member);
        member.mark_read(5);
        assert_eq!(member.unread_count(12), 7);
        assert_eq!(member.unread_count(2), 0);
    }

    #[test]
    fn test_role_roundtrip() {
        assert_eq!("owner".parse::<GuildRole>().unwrap().to_string(), "owner");
        assert!("bogus".parse::<GuildRole>().is_err());
    }
}
