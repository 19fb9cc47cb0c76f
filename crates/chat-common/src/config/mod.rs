//! Configuration structs

mod app_config;

pub use app_config::{
    AppConfig, AppSettings, ConfigError, CorsConfig, DatabaseConfig, Environment, GatewayConfig,
    JwtConfig, QueueConfig, RateLimitConfig, RedisConfig, ServerConfig, SnowflakeConfig,
    WebSocketConfig, WorkerPoolConfig,
};
