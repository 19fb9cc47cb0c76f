//! Data transfer objects for API requests and responses
//!
//! This module provides:
//! - Request DTOs with validation for API inputs
//! - Response DTOs for serializing API outputs
//! - Mappers for converting domain entities to DTOs

pub mod mappers;
pub mod requests;
pub mod responses;

// Re-export commonly used request types
pub use requests::{
    AckMessagesRequest, CreateGuildRequest, CreateInviteRequest, JoinGuildRequest, LoginRequest,
    LogoutRequest, MessagesHistoryQuery, RefreshTokenRequest, RegisterRequest,
    TransferGuildOwnershipRequest, UpdateGuildRequest, UpdateMemberRoleRequest, UpdateUserRequest,
    MAX_HISTORY_LIMIT,
};

// Re-export commonly used response types
pub use responses::{
    ApiResponse, AuthResponse, CurrentUserResponse, GuildPreviewResponse, GuildResponse,
    GuildWithMembershipResponse, HealthChecks, HealthResponse, InviteResponse, MemberResponse,
    MessageResponse, PaginatedResponse, PaginationMeta, PresenceResponse, ReadinessResponse,
    UserResponse,
};

// Re-export mappers and helper structs
pub use mappers::{GuildWithCount, GuildWithMembership, InviteWithDetails, MemberWithUser};
