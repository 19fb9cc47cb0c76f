//! WebSocket handler (§4.6, §6).
//!
//! One task pair per connection: a reader that drains inbound frames and
//! feeds the ingest half of the pipeline, and a writer that owns the sole
//! right to write to the transport, selecting over the outbound queue, the
//! ping ticker, and session close.

use std::sync::Arc;
use std::time::Duration;

use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::IntoResponse;
use chat_core::Snowflake;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use crate::connection::{Session, OUTBOUND_QUEUE_DEPTH};
use crate::pipeline;
use crate::protocol::{CloseCode, WSMessage};

use super::GatewayState;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: String,
    guild_id: Option<String>,
}

/// `GET /ws?token=<jwt>[&guild_id=<g>]` — 401 without a valid token,
/// otherwise upgrades and hands the socket to a new session.
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    Query(query): Query<WsQuery>,
    ws: WebSocketUpgrade,
) -> Result<impl IntoResponse, StatusCode> {
    let claims = state
        .service_context()
        .jwt_service()
        .validate_access_token(&query.token)
        .map_err(|_| StatusCode::UNAUTHORIZED)?;
    let user_id = claims.user_id().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let focused_guild_id = query
        .guild_id
        .as_deref()
        .and_then(|s| s.parse::<Snowflake>().ok());

    Ok(ws.on_upgrade(move |socket| handle_socket(state, socket, user_id, focused_guild_id)))
}

async fn handle_socket(
    state: GatewayState,
    socket: WebSocket,
    user_id: Snowflake,
    focused_guild_id: Option<Snowflake>,
) {
    let heartbeat_interval = Duration::from_secs(state.config().websocket.heartbeat_interval_s);
    let (tx, rx) = mpsc::channel::<WSMessage>(OUTBOUND_QUEUE_DEPTH);

    if !state.hub().owns_route(user_id) {
        tracing::warn!(
            user_id = %user_id,
            assigned_node = ?state.hub().route_for(user_id),
            this_node = %state.config().gateway.node_id,
            "connection accepted on a node the hash ring does not assign this user to"
        );
    }

    let session = state.conn_mgr().add(user_id, focused_guild_id, tx).await;
    if let Some(guild_id) = focused_guild_id {
        state.hub().join(guild_id, user_id).await;
    }
    tracing::info!(user_id = %user_id, guild_id = ?focused_guild_id, "session established");

    drain_inbox(&state, &session, user_id).await;

    let (ws_sink, ws_stream) = socket.split();
    let writer = tokio::spawn(run_writer(session.clone(), ws_sink, rx, heartbeat_interval));

    run_reader(&state, &session, user_id, focused_guild_id, ws_stream).await;

    session.close();
    let _ = writer.await;

    match focused_guild_id {
        Some(guild_id) => state.hub().leave(guild_id, user_id).await,
        None => state.hub().leave_all(user_id).await,
    }
    state.conn_mgr().remove(user_id).await;
    tracing::info!(user_id = %user_id, "session closed");
}

/// Replay a reconnecting user's offline backlog (§4.9, I3(b), S2): drain
/// `inbox:user:{u}` and push each entry onto the new session's outbound
/// queue, oldest-first, before the reader starts accepting new traffic.
async fn drain_inbox(state: &GatewayState, session: &Arc<Session>, user_id: Snowflake) {
    match state.service_context().inbox().drain_all(user_id).await {
        Ok(entries) => {
            for entry in &entries {
                session.write_frame(WSMessage::from(entry));
            }
            if !entries.is_empty() {
                tracing::debug!(user_id = %user_id, count = entries.len(), "replayed offline inbox");
            }
        }
        Err(e) => {
            tracing::warn!(user_id = %user_id, error = %e, "failed to drain offline inbox");
        }
    }
}

/// Writer task: the sole writer to the transport (§5). Exits on session
/// close, a dropped outbound channel, or a transport write failure.
async fn run_writer(
    session: Arc<Session>,
    mut ws_sink: futures_util::stream::SplitSink<WebSocket, Message>,
    mut rx: mpsc::Receiver<WSMessage>,
    heartbeat_interval: Duration,
) {
    let mut ping_ticker = tokio::time::interval(heartbeat_interval);
    ping_ticker.tick().await; // first tick fires immediately, skip it

    loop {
        tokio::select! {
            _ = session.closed() => break,
            _ = ping_ticker.tick() => {
                if ws_sink.send(Message::Ping(Vec::new())).await.is_err() {
                    break;
                }
            }
            frame = rx.recv() => {
                match frame {
                    Some(msg) => {
                        if ws_sink.send(Message::Binary(msg.encode_frame())).await.is_err() {
                            break;
                        }
                    }
                    None => break,
                }
            }
        }
    }
    let _ = ws_sink.send(Message::Close(None)).await;
}

/// Reader task (inline, not spawned): drains inbound frames until the
/// client disconnects or sends a frame that cannot be decoded at all.
async fn run_reader(
    state: &GatewayState,
    session: &Arc<Session>,
    user_id: Snowflake,
    focused_guild_id: Option<Snowflake>,
    mut ws_stream: futures_util::stream::SplitStream<WebSocket>,
) {
    while let Some(frame) = ws_stream.next().await {
        let frame = match frame {
            Ok(f) => f,
            Err(e) => {
                tracing::debug!(user_id = %user_id, error = %e, "transport read error");
                break;
            }
        };

        match frame {
            Message::Binary(bytes) => {
                session.touch_heartbeat();
                handle_inbound(state, session, user_id, focused_guild_id, &bytes).await;
            }
            Message::Text(text) => {
                session.touch_heartbeat();
                handle_inbound(state, session, user_id, focused_guild_id, text.as_bytes()).await;
            }
            Message::Pong(_) => {
                session.touch_heartbeat();
                state.conn_mgr().refresh_presence(user_id).await;
                state.hub().refresh_presence(user_id).await;
            }
            Message::Ping(_) | Message::Close(_) => break,
        }
    }
}

/// Decode, then run the ingest half of the pipeline. A frame that fails to
/// decode at all closes the connection; everything the pipeline itself
/// rejects is reported in-band as a `SYSTEM` frame (§6).
async fn handle_inbound(
    state: &GatewayState,
    session: &Arc<Session>,
    user_id: Snowflake,
    focused_guild_id: Option<Snowflake>,
    raw: &[u8],
) {
    let decoded = match WSMessage::decode_frame(raw) {
        Ok(msg) => msg,
        Err(e) => {
            tracing::debug!(user_id = %user_id, error = %e, close_code = %CloseCode::DecodeError, "undecodable frame");
            session.close();
            return;
        }
    };

    match pipeline::ingest(state.service_context(), state.producer(), user_id, focused_guild_id, decoded).await {
        Ok(echo) => {
            session.write_frame(echo);
        }
        Err(e) => {
            tracing::debug!(user_id = %user_id, error = %e, "frame rejected");
            session.write_frame(WSMessage::system(e.to_string()));
        }
    }
}
