//! Request DTOs for API endpoints
//!
//! All request DTOs implement `Deserialize` and `Validate` for input validation.

use chat_core::{GuildRole, Snowflake};
use serde::Deserialize;
use validator::Validate;

// ============================================================================
// Auth Requests
// ============================================================================

/// User registration request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct RegisterRequest {
    #[validate(length(min = 3, max = 20, message = "Username must be 3-20 characters"))]
    pub username: String,

    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    #[validate(length(min = 8, max = 72, message = "Password must be 8-72 characters"))]
    pub password: String,
}

/// User login request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct LoginRequest {
    #[validate(email(message = "Invalid email format"))]
    pub email: String,

    pub password: String,
}

/// Token refresh request
#[derive(Debug, Clone, Deserialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Logout request (optional refresh token to revoke)
#[derive(Debug, Clone, Deserialize, Default)]
pub struct LogoutRequest {
    pub refresh_token: Option<String>,
}

// ============================================================================
// User Requests
// ============================================================================

/// Update current user's profile
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateUserRequest {
    #[validate(length(min = 3, max = 20, message = "Username must be 3-20 characters"))]
    pub username: Option<String>,

    /// Display name shown alongside the username, or null to clear it
    pub display_name: Option<String>,

    /// Avatar URL, or null to remove
    pub avatar_url: Option<String>,
}

// ============================================================================
// Guild Requests
// ============================================================================

/// Create a new guild
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateGuildRequest {
    #[validate(length(min = 2, max = 100, message = "Guild name must be 2-100 characters"))]
    pub name: String,
}

/// Update an existing guild's metadata (owner only)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct UpdateGuildRequest {
    #[validate(length(min = 2, max = 100, message = "Guild name must be 2-100 characters"))]
    pub name: Option<String>,
}

/// Transfer guild ownership to another member (owner only)
#[derive(Debug, Clone, Deserialize)]
pub struct TransferGuildOwnershipRequest {
    pub new_owner_id: Snowflake,
}

/// Join a guild via its invite code (guild's permanent code or a revocable invite)
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct JoinGuildRequest {
    #[validate(length(min = 6, max = 8, message = "Invite code must be 6-8 characters"))]
    pub invite_code: String,
}

// ============================================================================
// Membership Requests
// ============================================================================

/// Change a member's role (owner/admin only; cannot create a second owner)
#[derive(Debug, Clone, Deserialize)]
pub struct UpdateMemberRoleRequest {
    pub role: GuildRole,
}

// ============================================================================
// Invite Requests
// ============================================================================

/// Create a revocable invite for a guild
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct CreateInviteRequest {
    /// Seconds until expiry, default 24h
    #[validate(range(min = 1, message = "max_age must be positive"))]
    pub max_age: Option<i64>,
}

// ============================================================================
// Message Requests
// ============================================================================

/// Acknowledge messages up to and including `sequence_id` for a guild
#[derive(Debug, Clone, Deserialize)]
pub struct AckMessagesRequest {
    pub sequence_id: i64,
}

/// Query parameters for `GET /guilds/{id}/messages`. `after_seq` present
/// selects the incremental (post-reconnect) pull; its absence selects the
/// offset-paged, newest-first history instead.
#[derive(Debug, Clone, Deserialize)]
pub struct MessagesHistoryQuery {
    pub after_seq: Option<i64>,
    #[serde(default = "default_history_limit")]
    pub limit: i64,
    #[serde(default)]
    pub offset: i64,
}

fn default_history_limit() -> i64 {
    50
}

/// Maximum page size the server will honor regardless of what a client asks for.
pub const MAX_HISTORY_LIMIT: i64 = 100;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_register_request_validation() {
        let valid = RegisterRequest {
            username: "alice".to_string(),
            email: "alice@example.com".to_string(),
            password: "password123".to_string(),
        };
        assert!(valid.validate().is_ok());

        let invalid_username = RegisterRequest {
            username: "a".to_string(),
            ..valid.clone()
        };
        assert!(invalid_username.validate().is_err());

        let invalid_email = RegisterRequest {
            email: "not-an-email".to_string(),
            ..valid.clone()
        };
        assert!(invalid_email.validate().is_err());

        let invalid_password = RegisterRequest {
            password: "short".to_string(),
            ..valid
        };
        assert!(invalid_password.validate().is_err());
    }

    #[test]
    fn test_create_guild_validation() {
        let valid = CreateGuildRequest {
            name: "My Guild".to_string(),
        };
        assert!(valid.validate().is_ok());

        let too_short = CreateGuildRequest { name: "A".to_string() };
        assert!(too_short.validate().is_err());
    }

    #[test]
    fn test_join_guild_validation() {
        let valid = JoinGuildRequest {
            invite_code: "ABC123".to_string(),
        };
        assert!(valid.validate().is_ok());

        let too_short = JoinGuildRequest {
            invite_code: "AB".to_string(),
        };
        assert!(too_short.validate().is_err());
    }

    #[test]
    fn test_create_invite_validation() {
        let valid = CreateInviteRequest { max_age: Some(3600) };
        assert!(valid.validate().is_ok());

        let invalid = CreateInviteRequest { max_age: Some(-1) };
        assert!(invalid.validate().is_err());
    }

    #[test]
    fn test_default_history_limit() {
        assert_eq!(default_history_limit(), 50);
        assert!(MAX_HISTORY_LIMIT >= default_history_limit());
    }
}
