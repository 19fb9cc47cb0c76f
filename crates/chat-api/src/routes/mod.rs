//! Route definitions
//!
//! All API routes organized by domain and mounted under /api/v1.

use axum::{
    routing::{delete, get, patch, post},
    Router,
};

use crate::handlers::{auth, guilds, health, invites, members, messages, users};
use crate::state::AppState;

/// Create the main API router with all routes (excluding health for separate middleware handling)
pub fn create_router() -> Router<AppState> {
    Router::new()
        // API v1 endpoints
        .nest("/api/v1", api_v1_routes())
}

/// Health check routes (exported separately to bypass rate limiting)
pub fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health_check))
        .route("/health/ready", get(health::readiness_check))
}

/// API v1 routes
fn api_v1_routes() -> Router<AppState> {
    Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(guild_routes())
        .merge(invite_routes())
}

/// Authentication routes
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/refresh", post(auth::refresh_token))
        .route("/auth/logout", post(auth::logout))
}

/// User routes
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/@me", get(users::get_current_user))
        .route("/users/@me", patch(users::update_current_user))
        .route("/users/:user_id", get(users::get_user))
}

/// Guild routes
fn guild_routes() -> Router<AppState> {
    Router::new()
        // Guild CRUD
        .route("/guilds", post(guilds::create_guild))
        .route("/guilds/mine", get(guilds::list_mine))
        .route("/guilds/:guild_id", get(guilds::get_guild))
        .route("/guilds/:guild_id", patch(guilds::update_guild))
        .route("/guilds/:guild_id", delete(guilds::delete_guild))
        .route("/guilds/:guild_id/owner", patch(guilds::transfer_ownership))
        // Guild members
        .route("/guilds/:guild_id/members", get(members::get_guild_members))
        .route("/guilds/:guild_id/members/:user_id", get(members::get_guild_member))
        .route("/guilds/:guild_id/members/:user_id", patch(members::update_guild_member))
        .route("/guilds/:guild_id/members/:user_id", delete(members::remove_guild_member))
        .route("/guilds/:guild_id/members/@me", delete(members::leave_guild))
        // Guild invites
        .route("/guilds/:guild_id/invites", get(invites::get_guild_invites))
        .route("/guilds/:guild_id/invites", post(invites::create_invite))
        // Incremental/paged message history and read-cursor ack
        .route("/guilds/:guild_id/messages", get(messages::get_messages))
        .route("/guilds/:guild_id/ack", post(messages::ack_messages))
}

/// Invite routes
fn invite_routes() -> Router<AppState> {
    Router::new()
        .route("/invites/:invite_code", get(invites::get_invite))
        .route("/invites/:invite_code", post(invites::accept_invite))
        .route("/invites/:invite_code", delete(invites::delete_invite))
}
