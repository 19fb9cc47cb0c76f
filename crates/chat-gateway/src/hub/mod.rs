//! `Hub`: per-node in-memory fan-out index (§4.7).
//!
//! Holds only keys into `ConnMgr` — never the last strong reference to a
//! `Session` — and serializes room mutation through the operations below
//! rather than holding a lock across the `ConnMgr` lookup + send.

use std::sync::Arc;

use chat_cache::{PresenceStore, PubSubChannel, ReceivedMessage, Subscriber};
use chat_core::{HashRing, Snowflake};
use dashmap::{DashMap, DashSet};
use tracing::{debug, warn};

use crate::connection::ConnMgr;
use crate::protocol::WSMessage;

/// Per-node room index: which local sessions care about which guilds.
///
/// `ring`/`node_id` are the routing state §4.7 lists on `Hub` — the
/// consistent hash ring that names which node a user's connection belongs
/// on (§1a, §4.3).
pub struct Hub {
    rooms: DashMap<Snowflake, DashSet<Snowflake>>,
    user_guilds: DashMap<Snowflake, DashSet<Snowflake>>,
    conn_mgr: Arc<ConnMgr>,
    presence: PresenceStore,
    subscriber: Arc<Subscriber>,
    ring: HashRing,
    node_id: String,
}

impl Hub {
    #[must_use]
    pub fn new(
        conn_mgr: Arc<ConnMgr>,
        presence: PresenceStore,
        subscriber: Arc<Subscriber>,
        ring: HashRing,
        node_id: impl Into<String>,
    ) -> Arc<Self> {
        Arc::new(Self {
            rooms: DashMap::new(),
            user_guilds: DashMap::new(),
            conn_mgr,
            presence,
            subscriber,
            ring,
            node_id: node_id.into(),
        })
    }

    /// The node the consistent hash ring assigns `user_id` to, or `None` if
    /// the ring has no nodes configured.
    #[must_use]
    pub fn route_for(&self, user_id: Snowflake) -> Option<&str> {
        self.ring.get(&user_id.to_string())
    }

    /// Whether this node is the one the ring assigns `user_id` to. There is
    /// no inter-node proxy in this deployment, so a connection that lands
    /// elsewhere is still served locally — this only drives the warning
    /// logged at connect time (§4.7) so a stale `GATEWAY_NODES` list is
    /// visible. An empty ring (no peers configured) always returns `true`.
    #[must_use]
    pub fn owns_route(&self, user_id: Snowflake) -> bool {
        self.route_for(user_id).map_or(true, |node| node == self.node_id)
    }

    /// Register a session into a guild room, subscribing the node to that
    /// guild's bus channel the first time any local session joins it.
    pub async fn join(&self, guild_id: Snowflake, user_id: Snowflake) {
        let is_first_local_member = {
            let room = self.rooms.entry(guild_id).or_default();
            let was_empty = room.is_empty();
            room.insert(user_id);
            was_empty
        };
        self.user_guilds.entry(user_id).or_default().insert(guild_id);

        if is_first_local_member {
            if let Err(e) = self.subscriber.subscribe(&[PubSubChannel::guild(guild_id)]).await {
                warn!(guild_id = %guild_id, error = %e, "failed to subscribe to guild bus channel");
            }
        }

        if let Err(e) = self.presence.mark_guild_online(guild_id, user_id).await {
            warn!(guild_id = %guild_id, user_id = %user_id, error = %e, "failed to mark guild presence online");
        }
    }

    /// Drop a session from one guild room, unsubscribing from the bus
    /// channel once no local session cares about it anymore.
    pub async fn leave(&self, guild_id: Snowflake, user_id: Snowflake) {
        let now_empty = if let Some(room) = self.rooms.get(&guild_id) {
            room.remove(&user_id);
            room.is_empty()
        } else {
            false
        };
        if now_empty {
            self.rooms.remove(&guild_id);
            if let Err(e) = self.subscriber.unsubscribe(&[PubSubChannel::guild(guild_id)]).await {
                warn!(guild_id = %guild_id, error = %e, "failed to unsubscribe from guild bus channel");
            }
        }
        if let Some(guilds) = self.user_guilds.get(&user_id) {
            guilds.remove(&guild_id);
        }

        if let Err(e) = self.presence.mark_guild_offline(guild_id, user_id).await {
            warn!(guild_id = %guild_id, user_id = %user_id, error = %e, "failed to mark guild presence offline");
        }
    }

    /// Drop a session from every room it was registered in — used on
    /// disconnect and heartbeat eviction.
    pub async fn leave_all(&self, user_id: Snowflake) {
        let guilds: Vec<Snowflake> = self
            .user_guilds
            .get(&user_id)
            .map(|g| g.iter().map(|e| *e).collect())
            .unwrap_or_default();
        for guild_id in guilds {
            self.leave(guild_id, user_id).await;
        }
        self.user_guilds.remove(&user_id);
    }

    /// Refresh per-guild presence for every room a user is registered in —
    /// called when a pong arrives (§4.9).
    pub async fn refresh_presence(&self, user_id: Snowflake) {
        let guilds: Vec<Snowflake> = self
            .user_guilds
            .get(&user_id)
            .map(|g| g.iter().map(|e| *e).collect())
            .unwrap_or_default();
        for guild_id in guilds {
            let _ = self.presence.mark_guild_online(guild_id, user_id).await;
        }
    }

    /// Non-blocking send to every local recipient of a guild room except
    /// `exclude`. A full outbound queue means the session is unhealthy;
    /// it is left for the heartbeat monitor to evict rather than evicted
    /// here, keeping this call lock-free and I/O-free (§5).
    pub fn broadcast_local(&self, guild_id: Snowflake, msg: &WSMessage, exclude: Option<Snowflake>) {
        let Some(room) = self.rooms.get(&guild_id) else {
            return;
        };
        for user_id in room.iter() {
            let user_id = *user_id;
            if Some(user_id) == exclude {
                continue;
            }
            if let Some(session) = self.conn_mgr.get(user_id) {
                if !session.write_frame(msg.clone()) {
                    warn!(guild_id = %guild_id, user_id = %user_id, "outbound queue full, dropping frame");
                }
            }
        }
    }

    /// Background task: drain the bus subscription and convert each
    /// `guild:{id}` event into a local broadcast (§4.7 bus-broadcast).
    pub fn spawn_bus_listener(self: Arc<Self>) -> tokio::task::JoinHandle<()> {
        let mut receiver = self.subscriber.receiver();
        tokio::spawn(async move {
            loop {
                let received = match receiver.recv().await {
                    Ok(msg) => msg,
                    Err(tokio::sync::broadcast::error::RecvError::Lagged(skipped)) => {
                        warn!(skipped, "bus listener lagged, some fan-out events were dropped");
                        continue;
                    }
                    Err(tokio::sync::broadcast::error::RecvError::Closed) => break,
                };
                self.handle_bus_message(received);
            }
        })
    }

    fn handle_bus_message(&self, received: ReceivedMessage) {
        let PubSubChannel::Guild(guild_id) = received.channel else {
            return;
        };
        let Some(event) = received.event else {
            return;
        };
        match serde_json::from_value::<WSMessage>(event.data) {
            Ok(ws_msg) => self.broadcast_local(guild_id, &ws_msg, None),
            Err(e) => debug!(guild_id = %guild_id, error = %e, "ignoring unparseable bus event"),
        }
    }

    #[must_use]
    pub fn room_size(&self, guild_id: Snowflake) -> usize {
        self.rooms.get(&guild_id).map_or(0, |r| r.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chat_cache::{RedisPool, RedisPoolConfig, SubscriberConfig};
    use std::time::Duration;

    async fn test_hub() -> Arc<Hub> {
        let pool = RedisPool::new(RedisPoolConfig {
            url: "redis://127.0.0.1:6399/0".into(),
            max_connections: 4,
        })
        .unwrap();
        let presence = PresenceStore::new(pool);
        let conn_mgr = ConnMgr::new_shared(presence.clone(), "node-a", Duration::from_secs(30));
        let subscriber = Arc::new(
            Subscriber::new(SubscriberConfig {
                redis_url: "redis://127.0.0.1:6399/0".into(),
                ..Default::default()
            })
            .await
            .unwrap(),
        );
        let ring = HashRing::from_nodes([("node-a".to_string(), 1)]);
        Hub::new(conn_mgr, presence, subscriber, ring, "node-a")
    }

    #[tokio::test]
    async fn test_join_and_leave_update_room_size() {
        let hub = test_hub().await;
        let guild_id = Snowflake::new(10);
        let user_id = Snowflake::new(1);

        hub.join(guild_id, user_id).await;
        assert_eq!(hub.room_size(guild_id), 1);

        hub.leave(guild_id, user_id).await;
        assert_eq!(hub.room_size(guild_id), 0);
    }

    #[tokio::test]
    async fn test_leave_all_clears_every_room() {
        let hub = test_hub().await;
        let user_id = Snowflake::new(1);
        hub.join(Snowflake::new(10), user_id).await;
        hub.join(Snowflake::new(11), user_id).await;

        hub.leave_all(user_id).await;

        assert_eq!(hub.room_size(Snowflake::new(10)), 0);
        assert_eq!(hub.room_size(Snowflake::new(11)), 0);
    }

    #[tokio::test]
    async fn test_single_node_ring_owns_every_route() {
        let hub = test_hub().await;
        assert!(hub.owns_route(Snowflake::new(1)));
        assert_eq!(hub.route_for(Snowflake::new(1)), Some("node-a"));
    }

    #[tokio::test]
    async fn test_owns_route_flags_keys_assigned_elsewhere() {
        let pool = RedisPool::new(RedisPoolConfig {
            url: "redis://127.0.0.1:6399/0".into(),
            max_connections: 4,
        })
        .unwrap();
        let presence = PresenceStore::new(pool);
        let conn_mgr = ConnMgr::new_shared(presence.clone(), "node-a", Duration::from_secs(30));
        let subscriber = Arc::new(
            Subscriber::new(SubscriberConfig {
                redis_url: "redis://127.0.0.1:6399/0".into(),
                ..Default::default()
            })
            .await
            .unwrap(),
        );
        let ring = HashRing::from_nodes([("node-a".to_string(), 1), ("node-b".to_string(), 1)]);
        let hub = Hub::new(conn_mgr, presence, subscriber, ring, "node-a");

        // At least one of these users must be owned by node-b given two
        // evenly weighted nodes on the ring.
        let owned_elsewhere = (0..50)
            .map(Snowflake::new)
            .any(|user_id| !hub.owns_route(user_id));
        assert!(owned_elsewhere);
    }
}
