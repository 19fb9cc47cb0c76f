//! Pipeline (§4.8): the two halves that turn an inbound WS frame into a
//! durable, sequenced, fanned-out message.
//!
//! Ingest runs inline on the connection's reader task. Consume runs as a
//! background task draining the durable queue; it is the single serial
//! point per guild that makes I1 (gap-free sequencing) hold even with
//! multiple gateway nodes producing concurrently.

use std::collections::HashSet;
use std::sync::Arc;

use chat_cache::{PubSubChannel, PubSubEvent};
use chat_common::error::AppError;
use chat_core::{Message, MessageType, Snowflake};
use chat_queue::{Consumer, HandleOutcome, Producer};
use chat_service::services::ServiceContext;
use tracing::{error, warn};

use crate::protocol::WSMessage;

/// Max `content` length accepted from a client frame (§3, §4.8 step 1, §A.3:
/// "content ≤ 2000 chars"). Distinct from the 2048-byte wire frame ceiling
/// in §6, which bounds the whole encoded frame, not just this field.
pub const MAX_CONTENT_BYTES: usize = 2000;

/// Ingest half: validate one already-decoded inbound frame and hand it to
/// the queue.
///
/// The caller is responsible for the decode step: a frame that fails to
/// parse as protobuf or JSON closes the connection (`CloseCode::DecodeError`)
/// rather than reaching here — everything this function rejects is instead
/// reported in-band as a `SYSTEM` frame, per the wire protocol (§6).
///
/// Returns the provisional frame (no `seq_id` yet) so the gateway can echo
/// it straight back to the sender; the authoritative, sequenced copy is
/// delivered to every member — sender included — once the consumer has
/// persisted it and published it on the Bus.
pub async fn ingest(
    ctx: &ServiceContext,
    producer: &Producer,
    user_id: Snowflake,
    focused_guild_id: Option<Snowflake>,
    mut msg: WSMessage,
) -> Result<WSMessage, AppError> {
    if msg.content.trim().is_empty() {
        return Err(AppError::Validation("message content is empty".into()));
    }
    if msg.content.len() > MAX_CONTENT_BYTES {
        return Err(AppError::Validation(format!(
            "message content exceeds {MAX_CONTENT_BYTES} bytes"
        )));
    }

    let guild_id = match focused_guild_id {
        Some(g) => g,
        None => msg
            .guild_id
            .parse::<Snowflake>()
            .map_err(|_| AppError::Validation("missing guild_id".into()))?,
    };

    if !ctx.membership_repo().is_member(guild_id, user_id).await? {
        return Err(AppError::InsufficientPermissions);
    }

    let message_id = ctx.generate_id()?;
    msg.message_id = message_id.to_string();
    msg.user_id = user_id.to_string();
    msg.guild_id = guild_id.to_string();
    msg.seq_id = 0;
    msg.timestamp_ms = chrono::Utc::now().timestamp_millis();

    producer
        .produce(&guild_id.to_string(), &msg)
        .await
        .map_err(|e| AppError::ProduceFailed(e.to_string()))?;

    Ok(msg)
}

/// Spawn the consume half: one task draining the durable queue for as long
/// as the process runs.
pub fn spawn_consumer(consumer: Arc<Consumer>, ctx: Arc<ServiceContext>) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        let outcome = consumer
            .run(move |key, frame: WSMessage, _attempt| {
                let ctx = ctx.clone();
                async move { handle_delivery(&ctx, &key, frame).await }
            })
            .await;
        if let Err(e) = outcome {
            error!(error = %e, "queue consumer loop exited");
        }
    })
}

async fn handle_delivery(ctx: &ServiceContext, key: &str, mut frame: WSMessage) -> HandleOutcome {
    let (Ok(guild_id), Ok(message_id), Ok(sender_id)) = (
        key.parse::<Snowflake>(),
        frame.message_id.parse::<Snowflake>(),
        frame.user_id.parse::<Snowflake>(),
    ) else {
        warn!(key, "dropping delivery with unparseable ids");
        return HandleOutcome::Ack;
    };

    let seq = match persist(ctx, message_id, guild_id, sender_id, &frame.content).await {
        Ok(seq) => seq,
        Err(reason) => return HandleOutcome::Retry(reason),
    };
    frame.seq_id = seq;

    let event = PubSubEvent::new("MESSAGE_CREATE", serde_json::json!(frame));
    if let Err(e) = ctx.publisher().publish(&PubSubChannel::guild(guild_id), &event).await {
        warn!(guild_id = %guild_id, error = %e, "bus publish failed, history still recoverable via messagesAfter");
    }

    match offline_recipients(ctx, guild_id, sender_id).await {
        Ok(recipients) => {
            let entry = Message::new(message_id, guild_id, sender_id, frame.content.clone(), MessageType::Text, seq);
            for user_id in recipients {
                if let Err(e) = ctx.inbox().push(user_id, &entry).await {
                    warn!(user_id = %user_id, error = %e, "failed to push offline inbox entry");
                }
            }
        }
        Err(e) => warn!(guild_id = %guild_id, error = %e, "failed to compute offline recipients"),
    }

    HandleOutcome::Ack
}

/// Dedup via idempotent insert on the message id (primary key); a
/// redelivery of an id already persisted re-reads its assigned sequence
/// instead of calling `SeqGen` a second time.
async fn persist(
    ctx: &ServiceContext,
    message_id: Snowflake,
    guild_id: Snowflake,
    sender_id: Snowflake,
    content: &str,
) -> Result<i64, String> {
    if let Some(existing) = ctx.message_repo().find_by_id(message_id).await.map_err(|e| e.to_string())? {
        return Ok(existing.sequence_id);
    }

    let seq = ctx.seq_gen().next(guild_id).await.map_err(|e| e.to_string())?;
    let message = Message::new(message_id, guild_id, sender_id, content.to_string(), MessageType::Text, seq);
    ctx.message_repo().insert_message(&message).await.map_err(|e| e.to_string())?;
    Ok(seq)
}

/// `members(guild) - online_in_guild(guild) - {sender}` (§4.8 step 4).
async fn offline_recipients(
    ctx: &ServiceContext,
    guild_id: Snowflake,
    sender_id: Snowflake,
) -> Result<Vec<Snowflake>, String> {
    let memberships = ctx
        .membership_repo()
        .find_by_guild(guild_id, i64::MAX, None)
        .await
        .map_err(|e| e.to_string())?;

    let online: HashSet<Snowflake> = ctx
        .presence_store()
        .guild_online_users(guild_id)
        .await
        .map_err(|e| e.to_string())?
        .into_iter()
        .collect();

    Ok(memberships
        .into_iter()
        .map(|m| m.user_id)
        .filter(|uid| *uid != sender_id && !online.contains(uid))
        .collect())
}
