//! Gateway server setup (§4.6-§4.9).
//!
//! Wires `ConnMgr`, `Hub`, the durable queue's producer/consumer, and the
//! WebSocket upgrade route into a running node.

mod handler;
mod state;

pub use handler::{gateway_handler, WsQuery};
pub use state::GatewayState;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{routing::get, Router};
use chat_cache::{PresenceStore, RedisPool, RedisPoolConfig};
use chat_common::{AppConfig, AppError};
use chat_queue::{Consumer, ConsumerConfig, Producer, ProducerConfig};
use chat_service::services::{ServiceContext, ServiceContextBuilder};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;

use crate::connection::ConnMgr;
use crate::hub::Hub;
use crate::pipeline;

/// Create the gateway router.
pub fn create_router() -> Router<GatewayState> {
    Router::new()
        .route("/ws", get(gateway_handler))
        .route("/health", get(health_check))
}

async fn health_check() -> &'static str {
    "OK"
}

/// Build the complete application.
pub fn create_app(state: GatewayState) -> Router {
    create_router().layer(TraceLayer::new_for_http()).with_state(state)
}

/// Initialize all dependencies, start the consumer and heartbeat monitor,
/// and return the resulting `GatewayState`.
pub async fn create_gateway_state(config: AppConfig) -> Result<GatewayState, AppError> {
    tracing::info!("Connecting to PostgreSQL...");
    let db_config = chat_db::DatabaseConfig {
        url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        min_connections: config.database.min_connections,
        ..Default::default()
    };
    let pool = chat_db::create_pool(&db_config)
        .await
        .map_err(|e| AppError::Database(e.to_string()))?;
    tracing::info!("PostgreSQL connection established");

    chat_db::run_migrations(&pool)
        .await
        .map_err(|e| AppError::Migration(e.to_string()))?;
    tracing::info!("database migrations applied");

    tracing::info!("Connecting to Redis...");
    let redis_config = RedisPoolConfig::from(&config.redis);
    let redis_pool = RedisPool::new(redis_config).map_err(|e| AppError::Cache(e.to_string()))?;
    let shared_redis = Arc::new(redis_pool);
    tracing::info!("Redis connection established");

    let jwt_service = Arc::new(chat_common::JwtService::new(
        &config.jwt.secret,
        config.jwt.access_token_expiry,
        config.jwt.refresh_token_expiry,
    ));

    let snowflake_generator = Arc::new(chat_core::SnowflakeGenerator::new(config.snowflake.worker_id));

    let user_repo = Arc::new(chat_db::PgUserRepository::new(pool.clone()));
    let guild_repo = Arc::new(chat_db::PgGuildRepository::new(pool.clone()));
    let membership_repo = Arc::new(chat_db::PgMembershipRepository::new(pool.clone()));
    let message_repo = Arc::new(chat_db::PgMessageRepository::new(pool.clone()));
    let invite_repo = Arc::new(chat_db::PgInviteRepository::new(pool.clone()));

    let service_context = Arc::new(
        ServiceContextBuilder::new()
            .pool(pool)
            .redis_pool(shared_redis.clone())
            .user_repo(user_repo)
            .guild_repo(guild_repo)
            .membership_repo(membership_repo)
            .message_repo(message_repo)
            .invite_repo(invite_repo)
            .jwt_service(jwt_service)
            .snowflake_generator(snowflake_generator)
            .build()
            .map_err(|e| AppError::Config(e.to_string()))?,
    );

    let producer = Arc::new(
        Producer::new(&ProducerConfig {
            brokers: config.queue.brokers.clone(),
            topic: config.queue.message_topic.clone(),
            max_retries: config.queue.producer_max_retries,
            retry_backoff_ms: config.queue.producer_retry_backoff_ms,
        })
        .map_err(|e| AppError::ProduceFailed(e.to_string()))?,
    );

    let consumer = Arc::new(
        Consumer::new(&ConsumerConfig {
            brokers: config.queue.brokers.clone(),
            topic: config.queue.message_topic.clone(),
            dlq_topic: config.queue.dlq_topic.clone(),
            consumer_group: config.queue.consumer_group.clone(),
            max_retries: config.queue.consumer_max_retries,
            retry_backoff_ms: config.queue.consumer_retry_backoff_ms,
        })
        .map_err(|e| AppError::ProduceFailed(e.to_string()))?,
    );
    pipeline::spawn_consumer(consumer, service_context.clone());

    let presence = PresenceStore::new((*shared_redis).clone());
    let heartbeat_interval = Duration::from_secs(config.websocket.heartbeat_interval_s);
    let conn_mgr = ConnMgr::new_shared(presence.clone(), config.gateway.node_id.clone(), heartbeat_interval);

    let subscriber = Arc::new(
        chat_cache::Subscriber::new(chat_cache::SubscriberConfig {
            redis_url: config.redis.url.clone(),
            ..Default::default()
        })
        .await
        .map_err(|e| AppError::Cache(e.to_string()))?,
    );
    let ring = config.gateway.hash_ring();
    let hub = Hub::new(conn_mgr.clone(), presence, subscriber, ring, config.gateway.node_id.clone());
    hub.clone().spawn_bus_listener();
    conn_mgr.clone().spawn_heartbeat_monitor(hub.clone());

    Ok(GatewayState::new(
        service_context,
        conn_mgr,
        hub,
        producer,
        Arc::new(config),
    ))
}

/// Run the gateway server.
pub async fn run_server(app: Router, addr: SocketAddr) -> Result<(), AppError> {
    tracing::info!(%addr, "starting gateway server");

    let listener = TcpListener::bind(addr)
        .await
        .map_err(|e| AppError::Config(format!("failed to bind to {addr}: {e}")))?;

    tracing::info!("gateway listening on ws://{addr}/ws");

    axum::serve(listener, app)
        .await
        .map_err(|e| AppError::Config(format!("server error: {e}")))?;

    Ok(())
}

/// Run the complete gateway server with configuration.
pub async fn run(config: AppConfig) -> Result<(), AppError> {
    let addr = SocketAddr::from(([0, 0, 0, 0], config.gateway.port));
    let state = create_gateway_state(config).await?;
    let app = create_app(state);
    run_server(app, addr).await
}
