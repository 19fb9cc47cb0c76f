//! # chat-cache
//!
//! Redis caching layer for sessions, presence, and pub/sub messaging.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Session Storage**: Refresh tokens and WebSocket session management
//! - **Presence**: Per-guild online membership and connection routing
//! - **Pub/Sub**: Real-time event distribution across server instances
//! - **Sequencing**: Gap-free per-guild message sequence numbers
//! - **Inbox**: Offline message delivery queue per user
//!
//! ## Example
//!
//! ```ignore
//! use chat_cache::{RedisPool, RedisPoolConfig, PresenceStore, Publisher};
//!
//! // Create Redis pool
//! let config = RedisPoolConfig::default();
//! let pool = RedisPool::new(config)?;
//!
//! // Create stores
//! let presence_store = PresenceStore::new(pool.clone());
//! let publisher = Publisher::new(pool.clone());
//!
//! // Mark a user online in a guild
//! presence_store.mark_guild_online(guild_id, user_id).await?;
//!
//! // Publish event
//! let event = PubSubEvent::new("PRESENCE_UPDATE", data);
//! publisher.publish(&PubSubChannel::guild(guild_id), &event).await?;
//! ```

pub mod inbox;
pub mod pool;
pub mod presence;
pub mod pubsub;
pub mod seqgen;
pub mod session;

// Re-export pool types
pub use pool::{
    create_shared_pool, RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, SharedRedisPool,
};

// Re-export session types
pub use session::{
    ClientProperties, RefreshTokenData, RefreshTokenStore, SessionEvent, SessionState,
    WebSocketSessionData, WebSocketSessionStore,
};

// Re-export presence types
pub use presence::{PresenceData, PresenceStore, UserStatus};

// Re-export sequence generator types
pub use seqgen::SeqGen;

// Re-export inbox types
pub use inbox::{Inbox, InboxEntry};

// Re-export pubsub types
pub use pubsub::{
    EventTarget, PubSubChannel, PubSubEvent, Publisher, ReceivedMessage, Subscriber,
    SubscriberBuilder, SubscriberConfig, SubscriberError, SubscriberResult, BROADCAST_CHANNEL,
    GUILD_CHANNEL_PREFIX, USER_CHANNEL_PREFIX,
};
