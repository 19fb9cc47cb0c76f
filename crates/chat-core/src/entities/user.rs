//! User entity - represents a chat user

use chrono::{DateTime, Utc};

use crate::value_objects::Snowflake;

/// A user's presence status (§3, I5).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserStatus {
    Online,
    Offline,
    Idle,
    Dnd,
}

impl Default for UserStatus {
    fn default() -> Self {
        Self::Offline
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Online => "online",
            Self::Offline => "offline",
            Self::Idle => "idle",
            Self::Dnd => "dnd",
        };
        write!(f, "{s}")
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "offline" => Ok(Self::Offline),
            "idle" => Ok(Self::Idle),
            "dnd" => Ok(Self::Dnd),
            other => Err(format!("invalid user status: {other}")),
        }
    }
}

/// User entity. Usernames are globally unique; there is no discriminator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Snowflake,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
    pub status: UserStatus,
    /// Node this user's active session is bound to, for gateway routing.
    pub bound_node_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Username must be 3-20 chars, alphanumeric plus underscore.
pub fn is_valid_username(username: &str) -> bool {
    let len = username.chars().count();
    (3..=20).contains(&len) && username.chars().all(|c| c.is_ascii_alphanumeric() || c == '_')
}

impl User {
    /// Create a new User with required fields
    pub fn new(id: Snowflake, username: String, email: String, password_hash: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            username,
            email,
            password_hash,
            display_name: None,
            avatar_url: None,
            status: UserStatus::Offline,
            bound_node_id: None,
            created_at: now,
            updated_at: now,
            deleted_at: None,
        }
    }

    /// Name shown in clients: display_name if set, else username.
    pub fn display_name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.username)
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }

    pub fn soft_delete(&mut self) {
        self.deleted_at = Some(Utc::now());
        self.updated_at = Utc::now();
    }

    pub fn set_status(&mut self, status: UserStatus) {
        self.status = status;
        self.updated_at = Utc::now();
    }

    pub fn set_display_name(&mut self, display_name: Option<String>) {
        self.display_name = display_name;
        self.updated_at = Utc::now();
    }

    pub fn bind_node(&mut self, node_id: impl Into<String>) {
        self.bound_node_id = Some(node_id.into());
        self.updated_at = Utc::now();
    }

    pub fn unbind_node(&mut self) {
        self.bound_node_id = None;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> User {
        User::new(
            Snowflake::new(1),
            "testuser".to_string(),
            "test@example.com".to_string(),
            "hashed".to_string(),
        )
    }

    #[test]
    fn test_display_name_falls_back_to_username() {
        let u = user();
        assert_eq!(u.display_name(), "testuser");
    }

    #[test]
    fn test_display_name_prefers_override() {
        let mut u = user();
        u.set_display_name(Some("Nickname".to_string()));
        assert_eq!(u.display_name(), "Nickname");
    }

    #[test]
    fn test_soft_delete() {
        let mut u = user();
        assert!(!u.is_deleted());
        u.soft_delete();
        assert!(u.is_deleted());
    }

    #[test]
    fn test_username_validation() {
        assert!(is_valid_username("abc"));
        assert!(is_valid_username("alice_02"));
        assert!(!is_valid_username("ab"));
        assert!(!is_valid_username(&"a".repeat(21)));
        assert!(!is_valid_username("has space"));
        assert!(!is_valid_username("has-dash"));
    }

    #[test]
    fn test_status_roundtrip() {
        assert_eq!("online".parse::<UserStatus>().unwrap(), UserStatus::Online);
        assert_eq!("DND".parse::<UserStatus>().unwrap(), UserStatus::Dnd);
        assert!("invalid".parse::<UserStatus>().is_err());
        assert_eq!(UserStatus::Idle.to_string(), "idle");
    }

    #[test]
    fn test_bind_unbind_node() {
        let mut u = user();
        u.bind_node("node-1");
        assert_eq!(u.bound_node_id.as_deref(), Some("node-1"));
        u.unbind_node();
        assert!(u.bound_node_id.is_none());
    }
}
