//! Response DTOs for API endpoints
//!
//! All response DTOs implement `Serialize` for JSON output.
//! Snowflake IDs are serialized as strings for JavaScript compatibility.

use chrono::{DateTime, Utc};
use serde::Serialize;

// ============================================================================
// Common Response Types
// ============================================================================

/// Generic API response wrapper
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Paginated response
#[derive(Debug, Serialize)]
pub struct PaginatedResponse<T> {
    pub data: Vec<T>,
    pub pagination: PaginationMeta,
}

impl<T> PaginatedResponse<T> {
    pub fn new(data: Vec<T>, pagination: PaginationMeta) -> Self {
        Self { data, pagination }
    }
}

/// Pagination metadata for the sequence-cursor history endpoint
/// (`after_seq`/`limit`): `next_after_seq` is the cursor to pass on the next
/// call, `None` once the guild has no more messages past the page returned.
#[derive(Debug, Serialize)]
pub struct PaginationMeta {
    pub limit: i64,
    pub has_more: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_after_seq: Option<i64>,
}

// ============================================================================
// Auth Responses
// ============================================================================

/// Authentication response with tokens
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    pub refresh_token: String,
    pub token_type: String,
    pub expires_in: i64,
    pub user: CurrentUserResponse,
}

impl AuthResponse {
    pub fn new(
        access_token: String,
        refresh_token: String,
        expires_in: i64,
        user: CurrentUserResponse,
    ) -> Self {
        Self {
            access_token,
            refresh_token,
            token_type: "Bearer".to_string(),
            expires_in,
            user,
        }
    }
}

// ============================================================================
// User Responses
// ============================================================================

/// Public user response, safe to show to other users
#[derive(Debug, Clone, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub username: String,
    pub display_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

/// Current authenticated user response (includes email)
#[derive(Debug, Clone, Serialize)]
pub struct CurrentUserResponse {
    pub id: String,
    pub username: String,
    pub display_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

// ============================================================================
// Guild Responses
// ============================================================================

/// Basic guild response
#[derive(Debug, Clone, Serialize)]
pub struct GuildResponse {
    pub id: String,
    pub name: String,
    pub owner_id: String,
    pub invite_code: String,
    pub created_at: DateTime<Utc>,
}

/// Guild response including the caller's own membership (for `GET /guilds/mine`)
#[derive(Debug, Clone, Serialize)]
pub struct GuildWithMembershipResponse {
    #[serde(flatten)]
    pub guild: GuildResponse,
    pub member_count: i64,
    pub role: String,
    pub unread_count: i64,
}

/// Guild preview, shown before a member has joined (e.g. invite resolution)
#[derive(Debug, Clone, Serialize)]
pub struct GuildPreviewResponse {
    pub id: String,
    pub name: String,
    pub member_count: i64,
}

// ============================================================================
// Message Responses
// ============================================================================

/// Message response
#[derive(Debug, Clone, Serialize)]
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

// ============================================================================
// Membership Responses
// ============================================================================

/// Guild member response
#[derive(Debug, Clone, Serialize)]
pub struct MemberResponse {
    pub user: UserResponse,
    pub role: String,
    pub last_read_seq: i64,
    pub joined_at: DateTime<Utc>,
}

// ============================================================================
// Invite Responses
// ============================================================================

/// Invite response
#[derive(Debug, Clone, Serialize)]
pub struct InviteResponse {
    pub code: String,
    pub guild: GuildPreviewResponse,
    pub creator: UserResponse,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

// ============================================================================
// Presence Responses
// ============================================================================

/// Presence response
#[derive(Debug, Clone, Serialize)]
pub struct PresenceResponse {
    pub user_id: String,
    pub status: String,
}

// ============================================================================
// Health Responses
// ============================================================================

/// Basic health check response
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
}

impl HealthResponse {
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: Utc::now(),
        }
    }
}

/// Readiness check response
#[derive(Debug, Clone, Serialize)]
pub struct ReadinessResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub checks: HealthChecks,
}

/// Health check status for each dependency
#[derive(Debug, Clone, Serialize)]
pub struct HealthChecks {
    pub database: String,
    pub redis: String,
    pub queue: String,
}

impl ReadinessResponse {
    pub fn ready(database_healthy: bool, redis_healthy: bool, queue_healthy: bool) -> Self {
        let all_healthy = database_healthy && redis_healthy && queue_healthy;
        Self {
            status: if all_healthy { "ready" } else { "not_ready" }.to_string(),
            timestamp: Utc::now(),
            checks: HealthChecks {
                database: if database_healthy { "healthy" } else { "unhealthy" }.to_string(),
                redis: if redis_healthy { "healthy" } else { "unhealthy" }.to_string(),
                queue: if queue_healthy { "healthy" } else { "unhealthy" }.to_string(),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user() -> CurrentUserResponse {
        CurrentUserResponse {
            id: "123456789".to_string(),
            username: "testuser".to_string(),
            display_name: "testuser".to_string(),
            email: "test@example.com".to_string(),
            avatar_url: None,
            status: "offline".to_string(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_auth_response_serialization() {
        let auth = AuthResponse::new(
            "access_token_here".to_string(),
            "refresh_token_here".to_string(),
            900,
            user(),
        );

        let json = serde_json::to_string(&auth).unwrap();
        assert!(json.contains("\"token_type\":\"Bearer\""));
        assert!(json.contains("\"expires_in\":900"));
    }

    #[test]
    fn test_paginated_response() {
        let messages = vec![MessageResponse {
            id: "1".to_string(),
            guild_id: "100".to_string(),
            sender_id: "200".to_string(),
            content: "hi".to_string(),
            msg_type: "text".to_string(),
            sequence_id: 1,
            timestamp_ms: 0,
        }];

        let response = PaginatedResponse::new(
            messages,
            PaginationMeta {
                limit: 50,
                has_more: true,
                next_after_seq: Some(1),
            },
        );

        assert!(response.pagination.has_more);
        assert_eq!(response.pagination.limit, 50);
        assert_eq!(response.pagination.next_after_seq, Some(1));
    }

    #[test]
    fn test_health_response() {
        let health = HealthResponse::healthy();
        assert_eq!(health.status, "healthy");
    }

    #[test]
    fn test_readiness_response() {
        let ready = ReadinessResponse::ready(true, true, true);
        assert_eq!(ready.status, "ready");
        assert_eq!(ready.checks.database, "healthy");
        assert_eq!(ready.checks.redis, "healthy");

        let not_ready = ReadinessResponse::ready(true, false, true);
        assert_eq!(not_ready.status, "not_ready");
        assert_eq!(not_ready.checks.redis, "unhealthy");
    }
}
