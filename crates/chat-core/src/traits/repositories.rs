//! Repository traits (ports) - define the interface for data access
//!
//! These traits follow the Repository pattern from Domain-Driven Design.
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;

use crate::entities::{Guild, Invite, Membership, Message, User};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// User Repository
// ============================================================================

#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Find user by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<User>>;

    /// Find user by email
    async fn find_by_email(&self, email: &str) -> RepoResult<Option<User>>;

    /// Find user by username (globally unique, no discriminator)
    async fn find_by_username(&self, username: &str) -> RepoResult<Option<User>>;

    /// Check if email is already taken
    async fn email_exists(&self, email: &str) -> RepoResult<bool>;

    /// Check if username is already taken
    async fn username_exists(&self, username: &str) -> RepoResult<bool>;

    /// Create a new user
    async fn create(&self, user: &User) -> RepoResult<()>;

    /// Update an existing user
    async fn update(&self, user: &User) -> RepoResult<()>;

    /// Soft delete a user
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;

    /// Update password hash
    async fn update_password(&self, id: Snowflake, password_hash: &str) -> RepoResult<()>;
}

// ============================================================================
// Guild Repository
// ============================================================================

#[async_trait]
pub trait GuildRepository: Send + Sync {
    /// Find guild by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Guild>>;

    /// Find guild by its permanent invite code
    async fn find_by_invite_code(&self, invite_code: &str) -> RepoResult<Option<Guild>>;

    /// List all guilds a user is a member of
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Guild>>;

    /// Create a new guild together with the owner's membership record,
    /// transactionally (§3 invariant: a guild always has exactly one owner).
    async fn create_with_owner(&self, guild: &Guild, owner_membership: &Membership) -> RepoResult<()>;

    /// Update an existing guild
    async fn update(&self, guild: &Guild) -> RepoResult<()>;

    /// Delete a guild
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;

    /// Get member count for a guild
    async fn member_count(&self, guild_id: Snowflake) -> RepoResult<i64>;
}

// ============================================================================
// Membership Repository
// ============================================================================

#[async_trait]
pub trait MembershipRepository: Send + Sync {
    /// Find membership by guild and user ID
    async fn find(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<Option<Membership>>;

    /// List all members in a guild
    async fn find_by_guild(&self, guild_id: Snowflake, limit: i64, after: Option<Snowflake>) -> RepoResult<Vec<Membership>>;

    /// List all guilds a user belongs to (as membership records)
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Membership>>;

    /// Check if user is a member of guild. Backed by a cache-first read in
    /// the implementation; callers should not assume strict read-your-writes
    /// across nodes (§4.2, §5).
    async fn is_member(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<bool>;

    /// Add member to guild. Idempotent: adding an existing member returns
    /// `DomainError::AlreadyMember` rather than a duplicate row.
    async fn create(&self, member: &Membership) -> RepoResult<()>;

    /// Update membership (role, read cursor)
    async fn update(&self, member: &Membership) -> RepoResult<()>;

    /// Advance a member's read cursor
    async fn mark_read(&self, guild_id: Snowflake, user_id: Snowflake, seq: i64) -> RepoResult<()>;

    /// Remove member from guild
    async fn delete(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Invite Repository
// ============================================================================

#[async_trait]
pub trait InviteRepository: Send + Sync {
    /// Find invite by code
    async fn find_by_code(&self, code: &str) -> RepoResult<Option<Invite>>;

    /// List invites for a guild
    async fn find_by_guild(&self, guild_id: Snowflake) -> RepoResult<Vec<Invite>>;

    /// List invites created by a user
    async fn find_by_creator(&self, creator_id: Snowflake) -> RepoResult<Vec<Invite>>;

    /// Create a new invite
    async fn create(&self, invite: &Invite) -> RepoResult<()>;

    /// Revoke (delete) an invite
    async fn delete(&self, code: &str) -> RepoResult<()>;

    /// Delete expired invites for a guild, returns number removed
    async fn delete_expired(&self, guild_id: Snowflake) -> RepoResult<u64>;
}

// ============================================================================
// Message Repository
// ============================================================================

#[async_trait]
pub trait MessageRepository: Send + Sync {
    /// Find message by ID
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Message>>;

    /// Insert a new message. Idempotent on primary key: re-delivery of the
    /// same message id (e.g. after a consumer retry) is a no-op, not an
    /// error (§4.4, §7).
    async fn insert_message(&self, message: &Message) -> RepoResult<()>;

    /// Most recent messages in a guild, newest first.
    async fn recent_messages(&self, guild_id: Snowflake, limit: i64, offset: i64) -> RepoResult<Vec<Message>>;

    /// Messages with `sequence_id > after_seq`, oldest first, capped at
    /// `limit`. Implementations should check cache contiguity before
    /// falling back to a database range scan (§4.2).
    async fn messages_after(&self, guild_id: Snowflake, after_seq: i64, limit: i64) -> RepoResult<Vec<Message>>;

    /// Soft delete a message
    async fn delete(&self, id: Snowflake) -> RepoResult<()>;

    /// Highest sequence_id persisted for a guild, used to recover a
    /// `SeqGen` counter after a cold start. `None` if the guild has no
    /// messages yet.
    async fn max_sequence_id(&self, guild_id: Snowflake) -> RepoResult<Option<i64>>;
}
