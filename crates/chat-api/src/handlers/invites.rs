//! Invite handlers
//!
//! Endpoints for guild invite management.

use axum::{
    extract::{Path, State},
    Json,
};
use chat_service::{CreateInviteRequest, InviteResponse, InviteService, MemberResponse, MembershipService};

use crate::extractors::{AuthUser, GuildIdPath, InviteCodePath};
use crate::response::{ApiResult, Created, NoContent};
use crate::state::AppState;

/// List invites outstanding for a guild
///
/// GET /guilds/{guild_id}/invites
pub async fn get_guild_invites(
    State(state): State<AppState>,
    _auth: AuthUser,
    Path(path): Path<GuildIdPath>,
) -> ApiResult<Json<Vec<InviteResponse>>> {
    let guild_id = path.guild_id()?;

    let service = InviteService::new(state.service_context());
    let invites = service.list_guild_invites(guild_id).await?;
    Ok(Json(invites))
}

/// Create a revocable invite for a guild
///
/// POST /guilds/{guild_id}/invites
pub async fn create_invite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<GuildIdPath>,
    body: Option<Json<CreateInviteRequest>>,
) -> ApiResult<Created<Json<InviteResponse>>> {
    let guild_id = path.guild_id()?;
    let request = body.map(|j| j.0).unwrap_or(CreateInviteRequest { max_age: None });

    let service = InviteService::new(state.service_context());
    let response = service.create_invite(guild_id, auth.user_id, request).await?;
    Ok(Created(Json(response)))
}

/// Resolve an invite by code (no auth required) before joining
///
/// GET /invites/{invite_code}
pub async fn get_invite(
    State(state): State<AppState>,
    Path(path): Path<InviteCodePath>,
) -> ApiResult<Json<InviteResponse>> {
    let service = InviteService::new(state.service_context());
    let response = service.resolve_invite(path.code()).await?;
    Ok(Json(response))
}

/// Accept an invite (join the guild it resolves to)
///
/// POST /invites/{invite_code}
pub async fn accept_invite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<InviteCodePath>,
) -> ApiResult<Json<MemberResponse>> {
    let service = MembershipService::new(state.service_context());
    let response = service.join_guild(auth.user_id, path.code()).await?;
    Ok(Json(response))
}

/// Revoke an invite
///
/// DELETE /invites/{invite_code}
pub async fn delete_invite(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<InviteCodePath>,
) -> ApiResult<NoContent> {
    let service = InviteService::new(state.service_context());
    service.revoke_invite(path.code(), auth.user_id).await?;
    Ok(NoContent)
}
