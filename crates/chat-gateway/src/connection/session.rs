//! A single WebSocket session (§4.6).
//!
//! `ConnMgr` exclusively owns `Session` objects; `Hub` only ever looks one
//! up by key, never holds the last strong reference.

use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use chat_core::Snowflake;
use parking_lot::RwLock;
use tokio::sync::{mpsc, Notify};
use uuid::Uuid;

use crate::protocol::WSMessage;

/// Bounded outbound queue depth per session (§6).
pub const OUTBOUND_QUEUE_DEPTH: usize = 256;

pub fn generate_session_id() -> String {
    Uuid::new_v4().to_string()
}

/// A connection's session state. Immutable attributes (`user_id`,
/// `focused_guild_id`) never change after construction; `last_heartbeat`
/// and `closed` are the only mutable fields (§4.6).
pub struct Session {
    id: String,
    user_id: Snowflake,
    focused_guild_id: Option<Snowflake>,
    sender: mpsc::Sender<WSMessage>,
    last_heartbeat: RwLock<Instant>,
    closed: AtomicBool,
    close_notify: Notify,
    created_at: Instant,
}

impl Session {
    #[must_use]
    pub fn new(
        user_id: Snowflake,
        focused_guild_id: Option<Snowflake>,
        sender: mpsc::Sender<WSMessage>,
    ) -> Self {
        Self {
            id: generate_session_id(),
            user_id,
            focused_guild_id,
            sender,
            last_heartbeat: RwLock::new(Instant::now()),
            closed: AtomicBool::new(false),
            close_notify: Notify::new(),
            created_at: Instant::now(),
        }
    }

    #[must_use]
    pub fn id(&self) -> &str {
        &self.id
    }

    #[must_use]
    pub fn user_id(&self) -> Snowflake {
        self.user_id
    }

    #[must_use]
    pub fn focused_guild_id(&self) -> Option<Snowflake> {
        self.focused_guild_id
    }

    #[must_use]
    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    pub fn touch_heartbeat(&self) {
        *self.last_heartbeat.write() = Instant::now();
    }

    #[must_use]
    pub fn last_heartbeat(&self) -> Instant {
        *self.last_heartbeat.read()
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::Acquire)
    }

    /// Non-blocking write; a full queue signals the caller to evict this
    /// session rather than block the writer loop (§4.7 local-broadcast).
    #[must_use]
    pub fn write_frame(&self, msg: WSMessage) -> bool {
        if self.is_closed() {
            return false;
        }
        self.sender.try_send(msg).is_ok()
    }

    /// Idempotent close: the writer task observes this via `closed()` and
    /// `close_notify`, tears down the transport, and exits.
    pub fn close(&self) {
        if self.closed.swap(true, Ordering::AcqRel) {
            return;
        }
        self.close_notify.notify_waiters();
    }

    /// Resolves once `close()` has been called. Used by the writer task's
    /// `select!` alongside the outbound queue and the heartbeat ticker.
    pub async fn closed(&self) {
        if self.is_closed() {
            return;
        }
        self.close_notify.notified().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session() -> (Session, mpsc::Receiver<WSMessage>) {
        let (tx, rx) = mpsc::channel(OUTBOUND_QUEUE_DEPTH);
        (Session::new(Snowflake::new(1), Some(Snowflake::new(10)), tx), rx)
    }

    #[test]
    fn test_close_is_idempotent() {
        let (session, _rx) = session();
        assert!(!session.is_closed());
        session.close();
        session.close();
        assert!(session.is_closed());
    }

    #[test]
    fn test_write_frame_rejected_after_close() {
        let (session, _rx) = session();
        session.close();
        assert!(!session.write_frame(WSMessage::system("bye")));
    }

    #[tokio::test]
    async fn test_write_frame_then_receive() {
        let (session, mut rx) = session();
        assert!(session.write_frame(WSMessage::system("hi")));
        let received = rx.recv().await.unwrap();
        assert_eq!(received.content, "hi");
    }

    #[tokio::test]
    async fn test_closed_future_resolves() {
        let (session, _rx) = session();
        session.close();
        session.closed().await;
    }

    #[test]
    fn test_heartbeat_touch_advances_clock() {
        let (session, _rx) = session();
        let first = session.last_heartbeat();
        std::thread::sleep(std::time::Duration::from_millis(5));
        session.touch_heartbeat();
        assert!(session.last_heartbeat() > first);
    }
}
