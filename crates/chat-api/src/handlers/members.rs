//! Member handlers
//!
//! Endpoints for guild member management.

use axum::{
    extract::{Path, State},
    Json,
};
use chat_service::{GuildService, MemberResponse, MembershipService, UpdateMemberRoleRequest};

use crate::extractors::{AuthUser, GuildIdPath, GuildUserPath, Pagination};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// List guild members
///
/// GET /guilds/{guild_id}/members
pub async fn get_guild_members(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(path): Path<GuildIdPath>,
    pagination: Pagination,
) -> ApiResult<Json<Vec<MemberResponse>>> {
    let guild_id = path.guild_id()?;

    let service = MembershipService::new(state.service_context());
    let members = service
        .list_members(guild_id, i64::from(pagination.limit), pagination.after)
        .await?;
    Ok(Json(members))
}

/// Get a single guild member
///
/// GET /guilds/{guild_id}/members/{user_id}
pub async fn get_guild_member(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(path): Path<GuildUserPath>,
) -> ApiResult<Json<MemberResponse>> {
    let guild_id = path.guild_id()?;
    let user_id = path.user_id()?;

    let service = MembershipService::new(state.service_context());
    let response = service.get_member(guild_id, user_id).await?;
    Ok(Json(response))
}

/// Change a member's role
///
/// PATCH /guilds/{guild_id}/members/{user_id}
pub async fn update_guild_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<GuildUserPath>,
    Json(request): Json<UpdateMemberRoleRequest>,
) -> ApiResult<Json<MemberResponse>> {
    let guild_id = path.guild_id()?;
    let user_id = path.user_id()?;

    let service = MembershipService::new(state.service_context());
    let response = service
        .update_member_role(guild_id, auth.user_id, user_id, request.role)
        .await?;
    Ok(Json(response))
}

/// Remove (kick) a guild member
///
/// DELETE /guilds/{guild_id}/members/{user_id}
pub async fn remove_guild_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<GuildUserPath>,
) -> ApiResult<NoContent> {
    let guild_id = path.guild_id()?;
    let user_id = path.user_id()?;

    let service = MembershipService::new(state.service_context());
    service.remove_member(guild_id, auth.user_id, user_id).await?;
    Ok(NoContent)
}

/// Leave a guild
///
/// DELETE /guilds/{guild_id}/members/@me
pub async fn leave_guild(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<GuildIdPath>,
) -> ApiResult<NoContent> {
    let guild_id = path.guild_id()?;

    let service = GuildService::new(state.service_context());
    service.leave_guild(guild_id, auth.user_id).await?;
    Ok(NoContent)
}
