//! Message handlers
//!
//! Read-path history endpoints and the read-cursor ack (§6). Message
//! ingestion only happens over the WebSocket gateway's pipeline; there is no
//! REST endpoint to post a message.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chat_service::{
    AckMessagesRequest, MembershipService, MessageResponse, MessageService, MessagesHistoryQuery,
    PaginatedResponse,
};

use crate::extractors::{AuthUser, GuildIdPath};
use crate::response::{ApiResult, NoContent};
use crate::state::AppState;

/// `GET /guilds/{guild_id}/messages?after_seq=N&limit=L`
/// `GET /guilds/{guild_id}/messages?limit=L&offset=O`
pub async fn get_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<GuildIdPath>,
    Query(query): Query<MessagesHistoryQuery>,
) -> ApiResult<Json<PaginatedResponse<MessageResponse>>> {
    let guild_id = path.guild_id()?;
    let service = MessageService::new(state.service_context());

    let page = match query.after_seq {
        Some(after_seq) => service.messages_after(guild_id, auth.user_id, after_seq, query.limit).await?,
        None => service.recent_messages(guild_id, auth.user_id, query.limit, query.offset).await?,
    };

    Ok(Json(page))
}

/// `POST /guilds/{guild_id}/ack`
pub async fn ack_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(path): Path<GuildIdPath>,
    Json(request): Json<AckMessagesRequest>,
) -> ApiResult<NoContent> {
    let guild_id = path.guild_id()?;

    let service = MembershipService::new(state.service_context());
    service.ack_messages(guild_id, auth.user_id, request.sequence_id).await?;
    Ok(NoContent)
}
