//! Test fixtures and data generators
//!
//! Provides reusable test data for integration tests.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for unique test data
static COUNTER: AtomicU64 = AtomicU64::new(1);

/// Get a unique suffix for test data
pub fn unique_suffix() -> u64 {
    COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Registration request
#[derive(Debug, Serialize)]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
}

impl RegisterRequest {
    pub fn unique() -> Self {
        let suffix = unique_suffix();
        Self {
            username: format!("testuser{suffix}"),
            email: format!("test{suffix}@example.com"),
            password: "TestPass123!".to_string(),
        }
    }
}

/// Login request
#[derive(Debug, Serialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

impl LoginRequest {
    pub fn from_register(reg: &RegisterRequest) -> Self {
        Self {
            email: reg.email.clone(),
            password: reg.password.clone(),
        }
    }
}

/// Auth response (access + refresh token pair plus the current user)
#[derive(Debug, Deserialize)]
pub struct AuthResponse {
    pub user: CurrentUserResponse,
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
}

/// Public user response, safe to show to other users
#[derive(Debug, Deserialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub avatar_url: Option<String>,
    pub status: String,
    pub created_at: String,
}

/// Current authenticated user response (includes email)
#[derive(Debug, Deserialize)]
pub struct CurrentUserResponse {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub email: String,
    pub avatar_url: Option<String>,
    pub status: String,
    pub created_at: String,
}

/// Update current user's profile
#[derive(Debug, Serialize, Default)]
pub struct UpdateUserRequest {
    pub username: Option<String>,
    pub display_name: Option<String>,
    pub avatar_url: Option<String>,
}

/// Create guild request
#[derive(Debug, Serialize)]
pub struct CreateGuildRequest {
    pub name: String,
}

impl CreateGuildRequest {
    pub fn unique() -> Self {
        let suffix = unique_suffix();
        Self {
            name: format!("Test Guild {suffix}"),
        }
    }
}

/// Update guild request
#[derive(Debug, Serialize, Default)]
pub struct UpdateGuildRequest {
    pub name: Option<String>,
}

/// Transfer guild ownership request
#[derive(Debug, Serialize)]
pub struct TransferGuildOwnershipRequest {
    pub new_owner_id: String,
}

/// Guild response
#[derive(Debug, Deserialize)]
pub struct GuildResponse {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub invite_code: String,
    pub created_at: String,
}

/// Guild response including the caller's own membership, returned by `GET /guilds/mine`
#[derive(Debug, Deserialize)]
pub struct GuildWithMembershipResponse {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub invite_code: String,
    pub created_at: String,
    pub member_count: i64,
    pub role: String,
    pub unread_count: i64,
}

/// Guild preview shown before a member has joined
#[derive(Debug, Deserialize)]
pub struct GuildPreviewResponse {
    pub id: String,
    pub name: String,
    pub member_count: i64,
}

/// Change a member's role
#[derive(Debug, Serialize)]
pub struct UpdateMemberRoleRequest {
    pub role: String,
}

/// Guild member response
#[derive(Debug, Deserialize)]
pub struct MemberResponse {
    pub user: UserResponse,
    pub role: String,
    pub last_read_seq: i64,
    pub joined_at: String,
}

/// Create a revocable invite for a guild
#[derive(Debug, Serialize, Default)]
pub struct CreateInviteRequest {
    pub max_age: Option<i64>,
}

/// Invite response
#[derive(Debug, Deserialize)]
pub struct InviteResponse {
    pub code: String,
    pub guild: GuildPreviewResponse,
    pub creator: UserResponse,
    pub created_at: String,
    pub expires_at: String,
}

/// Token refresh request
#[derive(Debug, Serialize)]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Message response (guild-scoped, produced only through the gateway pipeline)
#[derive(Debug, Deserialize)]
pub struct MessageResponse {
    pub id: String,
    pub guild_id: String,
    pub sender_id: String,
    pub content: String,
    #[serde(rename = "type")]
    pub msg_type: String,
    pub sequence_id: i64,
    pub timestamp_ms: i64,
}

/// Pagination metadata for the message history endpoint
#[derive(Debug, Deserialize)]
pub struct PaginationMeta {
    pub limit: i64,
    pub has_more: bool,
    pub next_after_seq: Option<i64>,
}

/// Paginated message history response
#[derive(Debug, Deserialize)]
pub struct PaginatedMessages {
    pub data: Vec<MessageResponse>,
    pub pagination: PaginationMeta,
}

/// Acknowledge messages up to and including `sequence_id`
#[derive(Debug, Serialize)]
pub struct AckMessagesRequest {
    pub sequence_id: i64,
}

/// Error response
#[derive(Debug, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorBody,
}

#[derive(Debug, Deserialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}
