//! `ConnMgr`: per-node registry of active sessions (§4.6).
//!
//! Exactly one entry per `user_id` — that is the enforcement point for I2.
//! A second successful `add()` for the same user closes the prior session
//! before the new one is inserted.

use std::sync::Arc;
use std::time::Duration;

use chat_cache::PresenceStore;
use chat_core::Snowflake;
use dashmap::DashMap;
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::hub::Hub;
use crate::protocol::WSMessage;

use super::session::Session;

/// Per-node registry of live sessions, keyed by user id.
pub struct ConnMgr {
    sessions: DashMap<Snowflake, Arc<Session>>,
    presence: PresenceStore,
    node_id: String,
    heartbeat_interval: Duration,
}

impl ConnMgr {
    #[must_use]
    pub fn new(presence: PresenceStore, node_id: impl Into<String>, heartbeat_interval: Duration) -> Self {
        Self {
            sessions: DashMap::new(),
            presence,
            node_id: node_id.into(),
            heartbeat_interval,
        }
    }

    #[must_use]
    pub fn new_shared(
        presence: PresenceStore,
        node_id: impl Into<String>,
        heartbeat_interval: Duration,
    ) -> Arc<Self> {
        Arc::new(Self::new(presence, node_id, heartbeat_interval))
    }

    /// Register a new session for `user_id`, closing any prior one first
    /// (I2). Presence writes are best-effort: a failure here degrades
    /// cross-node routing but must not fail the connection itself.
    pub async fn add(
        &self,
        user_id: Snowflake,
        focused_guild_id: Option<Snowflake>,
        sender: mpsc::Sender<WSMessage>,
    ) -> Arc<Session> {
        if let Some((_, prior)) = self.sessions.remove(&user_id) {
            prior.close();
            info!(user_id = %user_id, "closed prior session for single-session invariant");
        }

        let session = Arc::new(Session::new(user_id, focused_guild_id, sender));
        self.sessions.insert(user_id, session.clone());

        if let Err(e) = self.presence.set_user_online(user_id, self.presence_ttl_secs()).await {
            warn!(user_id = %user_id, error = %e, "failed to set global presence marker");
        }
        if let Err(e) = self.presence.set_connect_route(user_id, &self.node_id).await {
            warn!(user_id = %user_id, error = %e, "failed to set connection route");
        }

        session
    }

    /// Remove a session and clear its global presence/route entries.
    /// Idempotent.
    pub async fn remove(&self, user_id: Snowflake) {
        if let Some((_, session)) = self.sessions.remove(&user_id) {
            session.close();
        }
        if let Err(e) = self.presence.clear_user_online(user_id).await {
            warn!(user_id = %user_id, error = %e, "failed to clear global presence marker");
        }
        if let Err(e) = self.presence.clear_connect_route(user_id).await {
            warn!(user_id = %user_id, error = %e, "failed to clear connection route");
        }
    }

    /// Refresh the global presence marker and route key — called on pong.
    pub async fn refresh_presence(&self, user_id: Snowflake) {
        if let Some(session) = self.get(user_id) {
            session.touch_heartbeat();
        }
        let _ = self.presence.set_user_online(user_id, self.presence_ttl_secs()).await;
        let _ = self.presence.set_connect_route(user_id, &self.node_id).await;
    }

    #[must_use]
    pub fn get(&self, user_id: Snowflake) -> Option<Arc<Session>> {
        self.sessions.get(&user_id).map(|s| s.clone())
    }

    #[must_use]
    pub fn all(&self) -> Vec<Arc<Session>> {
        self.sessions.iter().map(|e| e.value().clone()).collect()
    }

    #[must_use]
    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }

    fn presence_ttl_secs(&self) -> u64 {
        2 * self.heartbeat_interval.as_secs()
    }

    /// Spawn the heartbeat monitor: every `heartbeat_interval`, evict
    /// sessions silent for `2 * heartbeat_interval` (I5), refreshing the
    /// rest. Eviction unregisters from `hub` first so no stale room entry
    /// survives the session (§5 shutdown propagation: Hub before ConnMgr).
    pub fn spawn_heartbeat_monitor(self: Arc<Self>, hub: Arc<Hub>) -> tokio::task::JoinHandle<()> {
        let interval = self.heartbeat_interval;
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;

                let now = std::time::Instant::now();
                let timeout = interval * 2;
                let mut dead = Vec::new();
                for entry in &self.sessions {
                    if now.duration_since(entry.value().last_heartbeat()) >= timeout {
                        dead.push(*entry.key());
                    }
                }

                for user_id in dead {
                    warn!(user_id = %user_id, "evicting session after heartbeat timeout");
                    hub.leave_all(user_id).await;
                    self.remove(user_id).await;
                }

                for entry in &self.sessions {
                    let user_id = *entry.key();
                    let _ = self.presence.set_user_online(user_id, self.presence_ttl_secs()).await;
                }
            }
        })
    }

    /// Close every session and clear the registry (server shutdown).
    pub async fn shutdown(&self) {
        let all: Vec<Snowflake> = self.sessions.iter().map(|e| *e.key()).collect();
        for user_id in all {
            self.remove(user_id).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_cache::{RedisPool, RedisPoolConfig};

    fn test_presence() -> PresenceStore {
        let pool = RedisPool::new(RedisPoolConfig {
            url: "redis://127.0.0.1:6399/0".into(),
            max_connections: 4,
        })
        .expect("pool construction does not connect eagerly");
        PresenceStore::new(pool)
    }

    #[tokio::test]
    async fn test_add_enforces_single_session() {
        let mgr = ConnMgr::new(test_presence(), "node-a", Duration::from_secs(30));
        let user_id = Snowflake::new(1);
        let (tx1, _rx1) = mpsc::channel(8);
        let (tx2, _rx2) = mpsc::channel(8);

        let first = mgr.add(user_id, None, tx1).await;
        assert!(!first.is_closed());

        let second = mgr.add(user_id, None, tx2).await;
        assert!(first.is_closed(), "prior session must close on re-add (I2)");
        assert!(!second.is_closed());
        assert_eq!(mgr.session_count(), 1);
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let mgr = ConnMgr::new(test_presence(), "node-a", Duration::from_secs(30));
        let user_id = Snowflake::new(1);
        let (tx, _rx) = mpsc::channel(8);
        mgr.add(user_id, None, tx).await;

        mgr.remove(user_id).await;
        mgr.remove(user_id).await;
        assert_eq!(mgr.session_count(), 0);
    }
}
