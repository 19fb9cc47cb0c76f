//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("User not found: {0}")]
    UserNotFound(Snowflake),

    #[error("Guild not found: {0}")]
    GuildNotFound(Snowflake),

    #[error("Message not found: {0}")]
    MessageNotFound(Snowflake),

    #[error("Member not found in guild")]
    MemberNotFound,

    #[error("Invite not found: {0}")]
    InviteNotFound(String),

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Invalid email format")]
    InvalidEmail,

    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    #[error("Password too weak: {0}")]
    WeakPassword(String),

    #[error("Invalid message: {0}")]
    InvalidMessage(String),

    #[error("Invalid snowflake generator layout: {0}")]
    InvalidSnowflakeLayout(String),

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Missing permission: {0}")]
    MissingPermission(String),

    #[error("Not guild owner")]
    NotGuildOwner,

    #[error("User {user_id} is not a member of guild {guild_id}")]
    NotMember { guild_id: Snowflake, user_id: Snowflake },

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Email already in use")]
    EmailAlreadyExists,

    #[error("Username already in use")]
    UsernameAlreadyExists,

    #[error("Already a member of this guild")]
    AlreadyMember,

    #[error("Invite code already exists")]
    InviteCodeExists,

    // =========================================================================
    // Business Rule Violations
    // =========================================================================
    #[error("Cannot leave owned guild (transfer ownership first)")]
    CannotLeaveOwnedGuild,

    #[error("Cannot kick guild owner")]
    CannotKickOwner,

    #[error("Invite has expired")]
    InviteExpired,

    // =========================================================================
    // Core pipeline failures (§4.1, §4.4, §4.8, §7)
    // =========================================================================
    /// Snowflake generator observed the clock moving backwards. Fatal to the
    /// in-flight id mint; callers must not retry silently.
    #[error("clock skew detected: now={now_ms}ms < last={last_ms}ms")]
    ClockSkew { now_ms: i64, last_ms: i64 },

    /// `SeqGen.next` exhausted its retry budget against the KV store.
    #[error("sequence counter unavailable for guild {guild_id} after {attempts} attempts")]
    SeqUnavailable { guild_id: Snowflake, attempts: u32 },

    /// Queue producer exhausted its retry budget.
    #[error("produce to queue failed after {attempts} attempts: {reason}")]
    ProduceFailed { attempts: u32, reason: String },

    /// Durable persistence of a message failed after handler retries; caller
    /// routes to DLQ and acknowledges the queue offset regardless.
    #[error("persist failed: {0}")]
    PersistFailed(String),

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Bus error: {0}")]
    BusError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for API responses
    pub fn code(&self) -> &'static str {
        match self {
            // Not Found
            Self::UserNotFound(_) => "UNKNOWN_USER",
            Self::GuildNotFound(_) => "UNKNOWN_GUILD",
            Self::MessageNotFound(_) => "UNKNOWN_MESSAGE",
            Self::MemberNotFound => "UNKNOWN_MEMBER",
            Self::InviteNotFound(_) => "UNKNOWN_INVITE",

            // Validation
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::InvalidEmail => "INVALID_EMAIL",
            Self::InvalidUsername(_) => "INVALID_USERNAME",
            Self::WeakPassword(_) => "WEAK_PASSWORD",
            Self::InvalidMessage(_) => "INVALID_MESSAGE",
            Self::InvalidSnowflakeLayout(_) => "INVALID_SNOWFLAKE_LAYOUT",

            // Authorization
            Self::MissingPermission(_) => "MISSING_PERMISSIONS",
            Self::NotGuildOwner => "NOT_GUILD_OWNER",
            Self::NotMember { .. } => "NOT_MEMBER",

            // Conflict
            Self::EmailAlreadyExists => "EMAIL_ALREADY_EXISTS",
            Self::UsernameAlreadyExists => "USERNAME_ALREADY_EXISTS",
            Self::AlreadyMember => "ALREADY_MEMBER",
            Self::InviteCodeExists => "INVITE_CODE_EXISTS",

            // Business Rules
            Self::CannotLeaveOwnedGuild => "CANNOT_LEAVE_OWNED_GUILD",
            Self::CannotKickOwner => "CANNOT_KICK_OWNER",
            Self::InviteExpired => "INVITE_EXPIRED",

            // Core pipeline
            Self::ClockSkew { .. } => "CLOCK_SKEW",
            Self::SeqUnavailable { .. } => "SEQ_UNAVAILABLE",
            Self::ProduceFailed { .. } => "PRODUCE_FAILED",
            Self::PersistFailed(_) => "PERSIST_FAILED",

            // Infrastructure
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::BusError(_) => "BUS_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::UserNotFound(_)
                | Self::GuildNotFound(_)
                | Self::MessageNotFound(_)
                | Self::MemberNotFound
                | Self::InviteNotFound(_)
        )
    }

    /// Check if this is a validation error
    pub fn is_validation(&self) -> bool {
        matches!(
            self,
            Self::ValidationError(_)
                | Self::InvalidEmail
                | Self::InvalidUsername(_)
                | Self::WeakPassword(_)
                | Self::InvalidMessage(_)
        )
    }

    /// Check if this is an authorization error
    pub fn is_authorization(&self) -> bool {
        matches!(self, Self::MissingPermission(_) | Self::NotGuildOwner | Self::NotMember { .. })
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(
            self,
            Self::EmailAlreadyExists
                | Self::UsernameAlreadyExists
                | Self::AlreadyMember
                | Self::InviteCodeExists
        )
    }

    /// Whether this failure belongs to the core pipeline retry/DLQ path (§7).
    pub fn is_pipeline_failure(&self) -> bool {
        matches!(
            self,
            Self::ClockSkew { .. }
                | Self::SeqUnavailable { .. }
                | Self::ProduceFailed { .. }
                | Self::PersistFailed(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = DomainError::UserNotFound(Snowflake::new(1));
        assert_eq!(err.code(), "UNKNOWN_USER");

        let err = DomainError::MissingPermission("MANAGE_GUILD".to_string());
        assert_eq!(err.code(), "MISSING_PERMISSIONS");
    }

    #[test]
    fn test_is_not_found() {
        assert!(DomainError::UserNotFound(Snowflake::new(1)).is_not_found());
        assert!(DomainError::GuildNotFound(Snowflake::new(1)).is_not_found());
        assert!(!DomainError::EmailAlreadyExists.is_not_found());
    }

    #[test]
    fn test_is_authorization() {
        assert!(DomainError::NotGuildOwner.is_authorization());
        assert!(DomainError::MissingPermission("test".to_string()).is_authorization());
        assert!(!DomainError::UserNotFound(Snowflake::new(1)).is_authorization());
    }

    #[test]
    fn test_is_pipeline_failure() {
        assert!(DomainError::ClockSkew { now_ms: 1, last_ms: 2 }.is_pipeline_failure());
        assert!(DomainError::SeqUnavailable { guild_id: Snowflake::new(1), attempts: 3 }
            .is_pipeline_failure());
        assert!(!DomainError::AlreadyMember.is_pipeline_failure());
    }

    #[test]
    fn test_error_display() {
        let err = DomainError::UserNotFound(Snowflake::new(123));
        assert_eq!(err.to_string(), "User not found: 123");

        let err = DomainError::NotMember { guild_id: Snowflake::new(10), user_id: Snowflake::new(2) };
        assert_eq!(err.to_string(), "User 2 is not a member of guild 10");
    }
}
