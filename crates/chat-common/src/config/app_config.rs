//! Application configuration structs
//!
//! Loads configuration from environment variables and config files.

use std::collections::HashMap;
use std::env;

use serde::Deserialize;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub api: ServerConfig,
    pub gateway: GatewayConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub jwt: JwtConfig,
    pub rate_limit: RateLimitConfig,
    pub cors: CorsConfig,
    pub snowflake: SnowflakeConfig,
    pub queue: QueueConfig,
    pub websocket: WebSocketConfig,
    pub worker_pool: WorkerPoolConfig,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }

    #[must_use]
    pub fn is_development(&self) -> bool {
        matches!(self, Self::Development)
    }
}

/// Server configuration (for both API and Gateway bind address)
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Gateway server configuration: its bind address plus the cluster routing
/// identity used by the consistent hash ring. `nodes` maps every known
/// gateway node id to its ring weight; a node not listed here defaults to
/// weight 1 once it announces itself.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    pub port: u16,
    pub node_id: String,
    #[serde(default)]
    pub nodes: HashMap<String, u32>,
}

impl GatewayConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Build the consistent hash ring (§4.3) this node routes users
    /// through. `nodes` is the configured weighted peer set; if `node_id`
    /// isn't in it, it's added at weight 1 so a freshly announced node is
    /// always represented on its own ring.
    #[must_use]
    pub fn hash_ring(&self) -> chat_core::HashRing {
        let mut weights = self.nodes.clone();
        weights.entry(self.node_id.clone()).or_insert(1);
        chat_core::HashRing::from_nodes(weights)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RedisConfig {
    pub url: String,
    #[serde(default = "default_redis_max_connections")]
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Debug, Clone, Deserialize)]
pub struct JwtConfig {
    pub secret: String,
    #[serde(default = "default_access_token_expiry")]
    pub access_token_expiry: i64,
    #[serde(default = "default_refresh_token_expiry")]
    pub refresh_token_expiry: i64,
}

/// Rate limiting configuration, broken out per sensitive action per the
/// abuse-control requirements (registration/login/message send/general API).
#[derive(Debug, Clone, Deserialize)]
pub struct RateLimitConfig {
    #[serde(default = "default_register_per_minute")]
    pub register_per_minute: u32,
    #[serde(default = "default_login_per_minute")]
    pub login_per_minute: u32,
    #[serde(default = "default_message_per_minute")]
    pub message_per_minute: u32,
    #[serde(default = "default_api_per_minute")]
    pub api_per_minute: u32,
    #[serde(default = "default_burst")]
    pub burst: u32,
}

/// CORS configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CorsConfig {
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

/// Snowflake ID generator configuration, mirroring `SnowflakeLayout`.
#[derive(Debug, Clone, Deserialize)]
pub struct SnowflakeConfig {
    #[serde(default = "default_datacenter_bits")]
    pub datacenter_bits: u8,
    #[serde(default = "default_worker_bits")]
    pub worker_bits: u8,
    #[serde(default = "default_sequence_bits")]
    pub sequence_bits: u8,
    #[serde(default)]
    pub datacenter_id: u16,
    #[serde(default)]
    pub worker_id: u16,
}

/// Durable queue configuration: brokers, topic names, and retry budgets for
/// the producer and consumer sides independently.
#[derive(Debug, Clone, Deserialize)]
pub struct QueueConfig {
    #[serde(default = "default_kafka_brokers")]
    pub brokers: Vec<String>,
    #[serde(default = "default_message_topic")]
    pub message_topic: String,
    #[serde(default = "default_dlq_topic")]
    pub dlq_topic: String,
    #[serde(default = "default_consumer_group")]
    pub consumer_group: String,
    #[serde(default = "default_producer_max_retries")]
    pub producer_max_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub producer_retry_backoff_ms: u64,
    #[serde(default = "default_consumer_max_retries")]
    pub consumer_max_retries: u32,
    #[serde(default = "default_retry_backoff_ms")]
    pub consumer_retry_backoff_ms: u64,
}

/// WebSocket transport tuning: buffer sizes and the heartbeat contract used
/// to detect and evict dead connections.
#[derive(Debug, Clone, Deserialize)]
pub struct WebSocketConfig {
    #[serde(default = "default_read_buffer_size")]
    pub read_buffer_size: usize,
    #[serde(default = "default_write_buffer_size")]
    pub write_buffer_size: usize,
    #[serde(default = "default_heartbeat_interval_s")]
    pub heartbeat_interval_s: u64,
    #[serde(default = "default_connection_timeout_s")]
    pub connection_timeout_s: u64,
}

impl WebSocketConfig {
    /// Presence TTL is defined as twice the heartbeat interval (I5).
    #[must_use]
    pub fn presence_ttl_s(&self) -> u64 {
        self.heartbeat_interval_s * 2
    }
}

/// Sizing for the bounded worker pool that drives queue consumption.
#[derive(Debug, Clone, Deserialize)]
pub struct WorkerPoolConfig {
    #[serde(default = "default_worker_pool_size")]
    pub size: usize,
    #[serde(default = "default_worker_queue_size")]
    pub queue_size: usize,
}

// Default value functions
fn default_app_name() -> String {
    "chat-server".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_max_connections() -> u32 {
    20
}

fn default_min_connections() -> u32 {
    5
}

fn default_redis_max_connections() -> u32 {
    10
}

fn default_access_token_expiry() -> i64 {
    900 // 15 minutes
}

fn default_refresh_token_expiry() -> i64 {
    604_800 // 7 days
}

fn default_register_per_minute() -> u32 {
    5
}

fn default_login_per_minute() -> u32 {
    10
}

fn default_message_per_minute() -> u32 {
    60
}

fn default_api_per_minute() -> u32 {
    300
}

fn default_burst() -> u32 {
    50
}

fn default_datacenter_bits() -> u8 {
    0
}

fn default_worker_bits() -> u8 {
    10
}

fn default_sequence_bits() -> u8 {
    12
}

fn default_kafka_brokers() -> Vec<String> {
    vec!["127.0.0.1:9092".to_string()]
}

fn default_message_topic() -> String {
    "chat.messages".to_string()
}

fn default_dlq_topic() -> String {
    "chat.messages.dlq".to_string()
}

fn default_consumer_group() -> String {
    "chat-message-consumers".to_string()
}

fn default_producer_max_retries() -> u32 {
    3
}

fn default_consumer_max_retries() -> u32 {
    5
}

fn default_retry_backoff_ms() -> u64 {
    200
}

fn default_read_buffer_size() -> usize {
    4096
}

fn default_write_buffer_size() -> usize {
    4096
}

fn default_heartbeat_interval_s() -> u64 {
    30
}

fn default_connection_timeout_s() -> u64 {
    10
}

fn default_worker_pool_size() -> usize {
    8
}

fn default_worker_queue_size() -> usize {
    1024
}

fn parse_node_weights(raw: &str) -> HashMap<String, u32> {
    raw.split(',')
        .filter_map(|entry| {
            let mut parts = entry.splitn(2, '=');
            let node = parts.next()?.trim();
            if node.is_empty() {
                return None;
            }
            let weight = parts
                .next()
                .and_then(|w| w.trim().parse().ok())
                .unwrap_or(1);
            Some((node.to_string(), weight))
        })
        .collect()
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();

        Ok(Self {
            app: AppSettings {
                name: env::var("APP_NAME").unwrap_or_else(|_| default_app_name()),
                env: env::var("APP_ENV")
                    .ok()
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            api: ServerConfig {
                host: env::var("API_HOST").unwrap_or_else(|_| default_host()),
                port: env::var("API_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .ok_or(ConfigError::MissingVar("API_PORT"))?,
            },
            gateway: GatewayConfig {
                host: env::var("GATEWAY_HOST").unwrap_or_else(|_| default_host()),
                port: env::var("GATEWAY_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .ok_or(ConfigError::MissingVar("GATEWAY_PORT"))?,
                node_id: env::var("GATEWAY_NODE_ID")
                    .map_err(|_| ConfigError::MissingVar("GATEWAY_NODE_ID"))?,
                nodes: env::var("GATEWAY_NODES")
                    .ok()
                    .map(|s| parse_node_weights(&s))
                    .unwrap_or_default(),
            },
            database: DatabaseConfig {
                url: env::var("DATABASE_URL").map_err(|_| ConfigError::MissingVar("DATABASE_URL"))?,
                max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_max_connections),
                min_connections: env::var("DATABASE_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_min_connections),
            },
            redis: RedisConfig {
                url: env::var("REDIS_URL").map_err(|_| ConfigError::MissingVar("REDIS_URL"))?,
                max_connections: env::var("REDIS_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_redis_max_connections),
            },
            jwt: JwtConfig {
                secret: env::var("JWT_SECRET").map_err(|_| ConfigError::MissingVar("JWT_SECRET"))?,
                access_token_expiry: env::var("JWT_ACCESS_TOKEN_EXPIRY")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_access_token_expiry),
                refresh_token_expiry: env::var("JWT_REFRESH_TOKEN_EXPIRY")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_refresh_token_expiry),
            },
            rate_limit: RateLimitConfig {
                register_per_minute: env::var("RATE_LIMIT_REGISTER_PER_MINUTE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_register_per_minute),
                login_per_minute: env::var("RATE_LIMIT_LOGIN_PER_MINUTE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_login_per_minute),
                message_per_minute: env::var("RATE_LIMIT_MESSAGE_PER_MINUTE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_message_per_minute),
                api_per_minute: env::var("RATE_LIMIT_API_PER_MINUTE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_api_per_minute),
                burst: env::var("RATE_LIMIT_BURST")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_burst),
            },
            cors: CorsConfig {
                allowed_origins: env::var("CORS_ALLOWED_ORIGINS")
                    .ok()
                    .map(|s| s.split(',').map(str::trim).map(String::from).collect())
                    .unwrap_or_default(),
            },
            snowflake: SnowflakeConfig {
                datacenter_bits: env::var("SNOWFLAKE_DATACENTER_BITS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_datacenter_bits),
                worker_bits: env::var("SNOWFLAKE_WORKER_BITS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_worker_bits),
                sequence_bits: env::var("SNOWFLAKE_SEQUENCE_BITS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_sequence_bits),
                datacenter_id: env::var("SNOWFLAKE_DATACENTER_ID")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0),
                worker_id: env::var("WORKER_ID")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(0),
            },
            queue: QueueConfig {
                brokers: env::var("KAFKA_BROKERS")
                    .ok()
                    .map(|s| s.split(',').map(str::trim).map(String::from).collect())
                    .unwrap_or_else(default_kafka_brokers),
                message_topic: env::var("KAFKA_MESSAGE_TOPIC")
                    .unwrap_or_else(|_| default_message_topic()),
                dlq_topic: env::var("KAFKA_DLQ_TOPIC").unwrap_or_else(|_| default_dlq_topic()),
                consumer_group: env::var("KAFKA_CONSUMER_GROUP")
                    .unwrap_or_else(|_| default_consumer_group()),
                producer_max_retries: env::var("KAFKA_PRODUCER_MAX_RETRIES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_producer_max_retries),
                producer_retry_backoff_ms: env::var("KAFKA_PRODUCER_RETRY_BACKOFF_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_retry_backoff_ms),
                consumer_max_retries: env::var("KAFKA_CONSUMER_MAX_RETRIES")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_consumer_max_retries),
                consumer_retry_backoff_ms: env::var("KAFKA_CONSUMER_RETRY_BACKOFF_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_retry_backoff_ms),
            },
            websocket: WebSocketConfig {
                read_buffer_size: env::var("WS_READ_BUFFER_SIZE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_read_buffer_size),
                write_buffer_size: env::var("WS_WRITE_BUFFER_SIZE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_write_buffer_size),
                heartbeat_interval_s: env::var("WS_HEARTBEAT_INTERVAL_S")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_heartbeat_interval_s),
                connection_timeout_s: env::var("WS_CONNECTION_TIMEOUT_S")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_connection_timeout_s),
            },
            worker_pool: WorkerPoolConfig {
                size: env::var("WORKER_POOL_SIZE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_worker_pool_size),
                queue_size: env::var("WORKER_POOL_QUEUE_SIZE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or_else(default_worker_queue_size),
            },
        })
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_is_production() {
        assert!(!Environment::Development.is_production());
        assert!(!Environment::Staging.is_production());
        assert!(Environment::Production.is_production());
    }

    #[test]
    fn test_environment_is_development() {
        assert!(Environment::Development.is_development());
        assert!(!Environment::Staging.is_development());
        assert!(!Environment::Production.is_development());
    }

    #[test]
    fn test_server_address() {
        let config = ServerConfig {
            host: "0.0.0.0".to_string(),
            port: 8080,
        };
        assert_eq!(config.address(), "0.0.0.0:8080");
    }

    #[test]
    fn test_gateway_address() {
        let config = GatewayConfig {
            host: "0.0.0.0".to_string(),
            port: 9000,
            node_id: "node-1".to_string(),
            nodes: HashMap::new(),
        };
        assert_eq!(config.address(), "0.0.0.0:9000");
    }

    #[test]
    fn test_hash_ring_includes_self_when_unlisted() {
        let config = GatewayConfig {
            host: "0.0.0.0".to_string(),
            port: 9000,
            node_id: "node-1".to_string(),
            nodes: HashMap::new(),
        };
        let ring = config.hash_ring();
        assert_eq!(ring.node_count(), 1);
        assert_eq!(ring.get("user:42"), Some("node-1"));
    }

    #[test]
    fn test_hash_ring_honors_configured_peers() {
        let mut nodes = HashMap::new();
        nodes.insert("node-1".to_string(), 1);
        nodes.insert("node-2".to_string(), 1);
        let config = GatewayConfig {
            host: "0.0.0.0".to_string(),
            port: 9000,
            node_id: "node-1".to_string(),
            nodes,
        };
        assert_eq!(config.hash_ring().node_count(), 2);
    }

    #[test]
    fn test_presence_ttl_is_twice_heartbeat() {
        let config = WebSocketConfig {
            read_buffer_size: 4096,
            write_buffer_size: 4096,
            heartbeat_interval_s: 30,
            connection_timeout_s: 10,
        };
        assert_eq!(config.presence_ttl_s(), 60);
    }

    #[test]
    fn test_default_values() {
        assert_eq!(default_app_name(), "chat-server");
        assert_eq!(default_host(), "127.0.0.1");
        assert_eq!(default_max_connections(), 20);
        assert_eq!(default_access_token_expiry(), 900);
        assert_eq!(default_refresh_token_expiry(), 604_800);
    }

    #[test]
    fn test_parse_node_weights() {
        let weights = parse_node_weights("node-a=3,node-b=1,node-c");
        assert_eq!(weights.get("node-a"), Some(&3));
        assert_eq!(weights.get("node-b"), Some(&1));
        assert_eq!(weights.get("node-c"), Some(&1));
    }
}
