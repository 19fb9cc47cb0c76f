//! User presence storage in Redis.
//!
//! Tracks per-guild online membership and the global connection routing
//! entries a gateway node needs to know which user is reachable where.

use crate::pool::{RedisPool, RedisResult};
use chat_core::Snowflake;
use redis::AsyncCommands;
use serde::{Deserialize, Serialize};

/// Key prefix for a guild's online-members sorted set
const GUILD_ONLINE_PREFIX: &str = "online_users:guild:";
/// Key prefix for a user's global online marker
const USER_ONLINE_PREFIX: &str = "user:";
/// Key suffix for a user's global online marker
const USER_ONLINE_SUFFIX: &str = ":online";
/// Key prefix for the gateway-node connection route
const CONNECT_ROUTE_PREFIX: &str = "User:Connect:";

/// How long a guild online-set membership entry stays valid if nobody
/// refreshes it (I5: absolute expiry, swept lazily on read).
const GUILD_ONLINE_TTL_SECS: i64 = 300;
/// TTL for the connection route entry; refreshed only on pong, never on
/// ordinary traffic, per the heartbeat contract.
const CONNECT_ROUTE_TTL_SECS: u64 = 300;

/// User online status
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    /// User is online and active
    Online,
    /// User is idle (away from keyboard)
    Idle,
    /// Do not disturb
    Dnd,
    /// User is offline (or invisible)
    Offline,
}

impl Default for UserStatus {
    fn default() -> Self {
        Self::Offline
    }
}

impl UserStatus {
    /// Check if this status should be visible to others
    #[must_use]
    pub fn is_visible(&self) -> bool {
        !matches!(self, Self::Offline)
    }
}

impl std::fmt::Display for UserStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Online => write!(f, "online"),
            Self::Idle => write!(f, "idle"),
            Self::Dnd => write!(f, "dnd"),
            Self::Offline => write!(f, "offline"),
        }
    }
}

impl std::str::FromStr for UserStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "online" => Ok(Self::Online),
            "idle" => Ok(Self::Idle),
            "dnd" => Ok(Self::Dnd),
            "offline" => Ok(Self::Offline),
            _ => Err(format!("Invalid status: {s}")),
        }
    }
}

/// Snapshot of a user's presence, returned to callers that need more than a
/// bare online/offline bit (e.g. the gateway's presence broadcast).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresenceData {
    /// User ID
    pub user_id: Snowflake,
    /// Current status
    pub status: UserStatus,
    /// Last update timestamp (unix seconds)
    pub updated_at: i64,
}

impl PresenceData {
    /// Create new presence data
    #[must_use]
    pub fn new(user_id: Snowflake, status: UserStatus) -> Self {
        Self {
            user_id,
            status,
            updated_at: chrono::Utc::now().timestamp(),
        }
    }
}

/// User presence store.
///
/// Two independent pieces of state live here:
///
/// - a per-guild sorted set (`online_users:guild:{g}`) whose score is the
///   absolute unix-second expiry of the membership, swept lazily with
///   `ZREMRANGEBYSCORE` before every read so a crashed node's members age
///   out instead of sticking around forever;
/// - a global `user:{u}:online` marker with a caller-supplied TTL (I5: the
///   gateway sets this to twice its heartbeat interval) and the
///   `User:Connect:{u}` route entry pointing at the gateway node holding the
///   user's connection, refreshed only when a pong arrives.
#[derive(Clone)]
pub struct PresenceStore {
    pool: RedisPool,
}

impl PresenceStore {
    /// Create a new presence store
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }

    fn guild_online_key(guild_id: Snowflake) -> String {
        format!("{GUILD_ONLINE_PREFIX}{guild_id}")
    }

    fn user_online_key(user_id: Snowflake) -> String {
        format!("{USER_ONLINE_PREFIX}{user_id}{USER_ONLINE_SUFFIX}")
    }

    fn connect_route_key(user_id: Snowflake) -> String {
        format!("{CONNECT_ROUTE_PREFIX}{user_id}")
    }

    /// Mark a user online in a guild's member set, refreshing its expiry.
    pub async fn mark_guild_online(&self, guild_id: Snowflake, user_id: Snowflake) -> RedisResult<()> {
        let key = Self::guild_online_key(guild_id);
        let expiry = chrono::Utc::now().timestamp() + GUILD_ONLINE_TTL_SECS;
        let mut conn = self.pool.get().await?;
        conn.zadd::<_, _, _, ()>(&key, user_id.to_string(), expiry)
            .await?;
        Ok(())
    }

    /// Remove a user from a guild's online set (explicit disconnect).
    pub async fn mark_guild_offline(&self, guild_id: Snowflake, user_id: Snowflake) -> RedisResult<()> {
        let key = Self::guild_online_key(guild_id);
        let mut conn = self.pool.get().await?;
        conn.zrem::<_, _, ()>(&key, user_id.to_string()).await?;
        Ok(())
    }

    /// Sweep expired members, then return the guild's online user IDs.
    pub async fn guild_online_users(&self, guild_id: Snowflake) -> RedisResult<Vec<Snowflake>> {
        let key = Self::guild_online_key(guild_id);
        let mut conn = self.pool.get().await?;
        let now = chrono::Utc::now().timestamp();
        conn.zrembyscore::<_, _, _, ()>(&key, 0, now).await?;

        let ids: Vec<String> = conn.zrange(&key, 0, -1).await?;
        Ok(ids
            .into_iter()
            .filter_map(|s| s.parse::<i64>().ok())
            .map(Snowflake::from)
            .collect())
    }

    /// Sweep expired members, then return the guild's online member count.
    pub async fn guild_online_count(&self, guild_id: Snowflake) -> RedisResult<u64> {
        let key = Self::guild_online_key(guild_id);
        let mut conn = self.pool.get().await?;
        let now = chrono::Utc::now().timestamp();
        conn.zrembyscore::<_, _, _, ()>(&key, 0, now).await?;
        let count: u64 = conn.zcard(&key).await?;
        Ok(count)
    }

    /// Check whether a user is currently a live member of a guild's online set.
    pub async fn is_guild_online(&self, guild_id: Snowflake, user_id: Snowflake) -> RedisResult<bool> {
        let key = Self::guild_online_key(guild_id);
        let mut conn = self.pool.get().await?;
        let now = chrono::Utc::now().timestamp();
        let score: Option<i64> = conn.zscore(&key, user_id.to_string()).await?;
        Ok(score.is_some_and(|s| s > now))
    }

    /// Set the global online marker for a user. `ttl_secs` is twice the
    /// heartbeat interval (I5); callers refresh this on every heartbeat.
    pub async fn set_user_online(&self, user_id: Snowflake, ttl_secs: u64) -> RedisResult<()> {
        let key = Self::user_online_key(user_id);
        let mut conn = self.pool.get().await?;
        conn.set_ex::<_, _, ()>(&key, 1, ttl_secs).await?;
        Ok(())
    }

    /// Clear the global online marker (explicit disconnect).
    pub async fn clear_user_online(&self, user_id: Snowflake) -> RedisResult<()> {
        let key = Self::user_online_key(user_id);
        self.pool.delete(&key).await?;
        Ok(())
    }

    /// Check the global online marker.
    pub async fn is_user_online(&self, user_id: Snowflake) -> RedisResult<bool> {
        let key = Self::user_online_key(user_id);
        self.pool.exists(&key).await
    }

    /// Record which gateway node currently holds a user's connection.
    /// Refreshed only on pong, not on ordinary frame traffic.
    pub async fn set_connect_route(&self, user_id: Snowflake, node_id: &str) -> RedisResult<()> {
        let key = Self::connect_route_key(user_id);
        let mut conn = self.pool.get().await?;
        conn.set_ex::<_, _, ()>(&key, node_id, CONNECT_ROUTE_TTL_SECS)
            .await?;
        Ok(())
    }

    /// Look up which gateway node holds a user's connection, if any.
    pub async fn get_connect_route(&self, user_id: Snowflake) -> RedisResult<Option<String>> {
        let key = Self::connect_route_key(user_id);
        self.pool.get_value(&key).await
    }

    /// Clear the connection route entry (explicit disconnect).
    pub async fn clear_connect_route(&self, user_id: Snowflake) -> RedisResult<()> {
        let key = Self::connect_route_key(user_id);
        self.pool.delete(&key).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_status_display() {
        assert_eq!(UserStatus::Online.to_string(), "online");
        assert_eq!(UserStatus::Idle.to_string(), "idle");
        assert_eq!(UserStatus::Dnd.to_string(), "dnd");
        assert_eq!(UserStatus::Offline.to_string(), "offline");
    }

    #[test]
    fn test_user_status_parse() {
        assert_eq!("online".parse::<UserStatus>().unwrap(), UserStatus::Online);
        assert_eq!("IDLE".parse::<UserStatus>().unwrap(), UserStatus::Idle);
        assert_eq!("DnD".parse::<UserStatus>().unwrap(), UserStatus::Dnd);
        assert!("invalid".parse::<UserStatus>().is_err());
    }

    #[test]
    fn test_user_status_visibility() {
        assert!(UserStatus::Online.is_visible());
        assert!(UserStatus::Idle.is_visible());
        assert!(UserStatus::Dnd.is_visible());
        assert!(!UserStatus::Offline.is_visible());
    }

    #[test]
    fn test_presence_data_creation() {
        let user_id = Snowflake::from(12345i64);
        let presence = PresenceData::new(user_id, UserStatus::Online);

        assert_eq!(presence.user_id, user_id);
        assert_eq!(presence.status, UserStatus::Online);
    }

    #[test]
    fn test_key_generation() {
        let user_id = Snowflake::from(12345i64);
        let guild_id = Snowflake::from(11111i64);

        assert_eq!(
            PresenceStore::guild_online_key(guild_id),
            format!("online_users:guild:{guild_id}")
        );
        assert_eq!(
            PresenceStore::user_online_key(user_id),
            format!("user:{user_id}:online")
        );
        assert_eq!(
            PresenceStore::connect_route_key(user_id),
            format!("User:Connect:{user_id}")
        );
    }
}
