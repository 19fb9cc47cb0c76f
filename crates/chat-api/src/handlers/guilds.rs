//! Guild handlers
//!
//! Endpoints for guild management.

use axum::{
    extract::{Path, State},
    Json,
};
use chat_service::{
    CreateGuildRequest, GuildResponse, GuildService, GuildWithMembershipResponse,
    TransferGuildOwnershipRequest, UpdateGuildRequest,
};

use crate::extractors::{AuthUser, GuildIdPath, ValidatedJson};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// Create a new guild
///
/// POST /guilds
pub async fn create_guild(
    State(state): State<AppState>,
    auth: AuthUser,
    ValidatedJson(request): ValidatedJson<CreateGuildRequest>,
) -> ApiResult<Created<Json<GuildResponse>>> {
    let service = GuildService::new(state.service_context());
    let response = service.create_guild(auth.user_id, request).await?;
    Ok(Created(Json(response)))
}

/// Every guild the caller belongs to, with membership and unread counts
///
/// GET /guilds/mine
pub async fn list_mine(
    State(state): State<AppState>,
    auth: AuthUser,
) -> ApiResult<Json<Vec<GuildWithMembershipResponse>>> {
    let service = GuildService::new(state.service_context());
    let guilds = service.list_mine(auth.user_id).await?;
    Ok(Json(guilds))
}

/// Get guild by ID, paired with the caller's own membership
///
/// GET /guilds/{guild_id}
pub async fn get_guild(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<GuildIdPath>,
) -> ApiResult<Json<GuildWithMembershipResponse>> {
    let guild_id = path.guild_id()?;

    let service = GuildService::new(state.service_context());
    let response = service.get_guild_with_membership(guild_id, auth.user_id).await?;
    Ok(Json(response))
}

/// Update guild settings
///
/// PATCH /guilds/{guild_id}
pub async fn update_guild(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<GuildIdPath>,
    ValidatedJson(request): ValidatedJson<UpdateGuildRequest>,
) -> ApiResult<Json<GuildResponse>> {
    let guild_id = path.guild_id()?;

    let service = GuildService::new(state.service_context());
    let response = service.update_guild(guild_id, auth.user_id, request).await?;
    Ok(Json(response))
}

/// Transfer guild ownership to another member
///
/// PATCH /guilds/{guild_id}/owner
pub async fn transfer_ownership(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<GuildIdPath>,
    Json(request): Json<TransferGuildOwnershipRequest>,
) -> ApiResult<Json<GuildResponse>> {
    let guild_id = path.guild_id()?;

    let service = GuildService::new(state.service_context());
    let response = service
        .transfer_ownership(guild_id, auth.user_id, request.new_owner_id)
        .await?;
    Ok(Json(response))
}

/// Delete guild
///
/// DELETE /guilds/{guild_id}
pub async fn delete_guild(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<GuildIdPath>,
) -> ApiResult<NoContent> {
    let guild_id = path.guild_id()?;

    let service = GuildService::new(state.service_context());
    service.delete_guild(guild_id, auth.user_id).await?;
    Ok(NoContent)
}
