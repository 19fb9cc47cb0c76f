//! End-to-end tests against the REST API
//!
//! Each test spins up a real `AppState` (Postgres + Redis) and drives it
//! through `reqwest`. Skipped when `DATABASE_URL`/`REDIS_URL` aren't set.

use integration_tests::{
    fixtures::*, assert_json, assert_status, check_test_env, TestServer,
};
use reqwest::StatusCode;

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_check() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let response = server.get("/health").await.expect("request");
    let health: HealthResponse = assert_json(response, StatusCode::OK).await.expect("body");
    assert_eq!(health.status, "healthy");
}

#[tokio::test]
async fn test_health_ready() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let response = server.get("/health/ready").await.expect("request");
    let status = response.status();
    let ready: ReadinessResponse = response.json().await.expect("body");
    assert!(status == StatusCode::OK || status == StatusCode::SERVICE_UNAVAILABLE);
    assert!(ready.status == "ready" || ready.status == "not_ready");
}

// ============================================================================
// Auth
// ============================================================================

#[tokio::test]
async fn test_register_user() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let register = RegisterRequest::unique();

    let response = server
        .post("/api/v1/auth/register", &register)
        .await
        .expect("request");
    let auth: AuthResponse = assert_json(response, StatusCode::CREATED).await.expect("body");

    assert_eq!(auth.user.username, register.username);
    assert_eq!(auth.user.email, register.email);
    assert_eq!(auth.token_type, "Bearer");
    assert!(!auth.access_token.is_empty());
    assert!(!auth.refresh_token.is_empty());
}

#[tokio::test]
async fn test_register_duplicate_email() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let register = RegisterRequest::unique();

    let first = server.post("/api/v1/auth/register", &register).await.expect("request");
    assert_status(first, StatusCode::CREATED).await.expect("first register");

    let second = server.post("/api/v1/auth/register", &register).await.expect("request");
    let status = second.status();
    assert!(status == StatusCode::CONFLICT || status == StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_login() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let register = RegisterRequest::unique();
    let registered = server.post("/api/v1/auth/register", &register).await.expect("request");
    assert_status(registered, StatusCode::CREATED).await.expect("register");

    let login = LoginRequest::from_register(&register);
    let response = server.post("/api/v1/auth/login", &login).await.expect("request");
    let auth: AuthResponse = assert_json(response, StatusCode::OK).await.expect("body");
    assert_eq!(auth.user.email, register.email);
}

#[tokio::test]
async fn test_login_invalid_credentials() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let login = LoginRequest {
        email: "nobody@example.com".to_string(),
        password: "wrong-password".to_string(),
    };

    let response = server.post("/api/v1/auth/login", &login).await.expect("request");
    assert_status(response, StatusCode::UNAUTHORIZED).await.expect("rejected");
}

#[tokio::test]
async fn test_refresh_token() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let register = RegisterRequest::unique();
    let registered = server.post("/api/v1/auth/register", &register).await.expect("request");
    let auth: AuthResponse = assert_json(registered, StatusCode::CREATED).await.expect("body");

    let refresh = RefreshTokenRequest {
        refresh_token: auth.refresh_token,
    };
    let response = server.post("/api/v1/auth/refresh", &refresh).await.expect("request");
    let refreshed: AuthResponse = assert_json(response, StatusCode::OK).await.expect("body");
    assert!(!refreshed.access_token.is_empty());
}

#[tokio::test]
async fn test_logout() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let register = RegisterRequest::unique();
    let registered = server.post("/api/v1/auth/register", &register).await.expect("request");
    let auth: AuthResponse = assert_json(registered, StatusCode::CREATED).await.expect("body");

    let response = server
        .post_auth("/api/v1/auth/logout", &auth.access_token, &())
        .await
        .expect("request");
    assert_status(response, StatusCode::NO_CONTENT).await.expect("logout");
}

// ============================================================================
// Users
// ============================================================================

#[tokio::test]
async fn test_get_current_user() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let register = RegisterRequest::unique();
    let registered = server.post("/api/v1/auth/register", &register).await.expect("request");
    let auth: AuthResponse = assert_json(registered, StatusCode::CREATED).await.expect("body");

    let response = server
        .get_auth("/api/v1/users/@me", &auth.access_token)
        .await
        .expect("request");
    let me: CurrentUserResponse = assert_json(response, StatusCode::OK).await.expect("body");
    assert_eq!(me.username, register.username);
}

#[tokio::test]
async fn test_get_current_user_unauthorized() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let response = server.get("/api/v1/users/@me").await.expect("request");
    assert_status(response, StatusCode::UNAUTHORIZED).await.expect("rejected");
}

#[tokio::test]
async fn test_update_current_user() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let register = RegisterRequest::unique();
    let registered = server.post("/api/v1/auth/register", &register).await.expect("request");
    let auth: AuthResponse = assert_json(registered, StatusCode::CREATED).await.expect("body");

    let update = UpdateUserRequest {
        display_name: Some("A New Display Name".to_string()),
        ..Default::default()
    };
    let response = server
        .patch_auth("/api/v1/users/@me", &auth.access_token, &update)
        .await
        .expect("request");
    let updated: CurrentUserResponse = assert_json(response, StatusCode::OK).await.expect("body");
    assert_eq!(updated.display_name, "A New Display Name");
}

#[tokio::test]
async fn test_get_user_public_profile() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let register = RegisterRequest::unique();
    let registered = server.post("/api/v1/auth/register", &register).await.expect("request");
    let auth: AuthResponse = assert_json(registered, StatusCode::CREATED).await.expect("body");

    let path = format!("/api/v1/users/{}", auth.user.id);
    let response = server.get_auth(&path, &auth.access_token).await.expect("request");
    let profile: UserResponse = assert_json(response, StatusCode::OK).await.expect("body");
    assert_eq!(profile.id, auth.user.id);
    assert_eq!(profile.username, register.username);
}

// ============================================================================
// Guilds
// ============================================================================

#[tokio::test]
async fn test_create_guild() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let register = RegisterRequest::unique();
    let registered = server.post("/api/v1/auth/register", &register).await.expect("request");
    let auth: AuthResponse = assert_json(registered, StatusCode::CREATED).await.expect("body");

    let guild_request = CreateGuildRequest::unique();
    let response = server
        .post_auth("/api/v1/guilds", &auth.access_token, &guild_request)
        .await
        .expect("request");
    let guild: GuildResponse = assert_json(response, StatusCode::CREATED).await.expect("body");

    assert_eq!(guild.name, guild_request.name);
    assert_eq!(guild.owner_id, auth.user.id);
    assert!(!guild.invite_code.is_empty());
}

#[tokio::test]
async fn test_get_guild() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let register = RegisterRequest::unique();
    let registered = server.post("/api/v1/auth/register", &register).await.expect("request");
    let auth: AuthResponse = assert_json(registered, StatusCode::CREATED).await.expect("body");

    let guild_request = CreateGuildRequest::unique();
    let created = server
        .post_auth("/api/v1/guilds", &auth.access_token, &guild_request)
        .await
        .expect("request");
    let guild: GuildResponse = assert_json(created, StatusCode::CREATED).await.expect("body");

    let path = format!("/api/v1/guilds/{}", guild.id);
    let response = server.get_auth(&path, &auth.access_token).await.expect("request");
    let fetched: GuildWithMembershipResponse = assert_json(response, StatusCode::OK).await.expect("body");

    assert_eq!(fetched.id, guild.id);
    assert_eq!(fetched.role, "owner");
    assert_eq!(fetched.member_count, 1);
}

#[tokio::test]
async fn test_list_my_guilds() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let register = RegisterRequest::unique();
    let registered = server.post("/api/v1/auth/register", &register).await.expect("request");
    let auth: AuthResponse = assert_json(registered, StatusCode::CREATED).await.expect("body");

    let guild_request = CreateGuildRequest::unique();
    let created = server
        .post_auth("/api/v1/guilds", &auth.access_token, &guild_request)
        .await
        .expect("request");
    let guild: GuildResponse = assert_json(created, StatusCode::CREATED).await.expect("body");

    let response = server
        .get_auth("/api/v1/guilds/mine", &auth.access_token)
        .await
        .expect("request");
    let guilds: Vec<GuildWithMembershipResponse> = assert_json(response, StatusCode::OK).await.expect("body");

    assert!(guilds.iter().any(|g| g.id == guild.id));
}

#[tokio::test]
async fn test_update_guild() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let register = RegisterRequest::unique();
    let registered = server.post("/api/v1/auth/register", &register).await.expect("request");
    let auth: AuthResponse = assert_json(registered, StatusCode::CREATED).await.expect("body");

    let guild_request = CreateGuildRequest::unique();
    let created = server
        .post_auth("/api/v1/guilds", &auth.access_token, &guild_request)
        .await
        .expect("request");
    let guild: GuildResponse = assert_json(created, StatusCode::CREATED).await.expect("body");

    let update = UpdateGuildRequest {
        name: Some("Renamed Guild".to_string()),
    };
    let path = format!("/api/v1/guilds/{}", guild.id);
    let response = server
        .patch_auth(&path, &auth.access_token, &update)
        .await
        .expect("request");
    let updated: GuildResponse = assert_json(response, StatusCode::OK).await.expect("body");
    assert_eq!(updated.name, "Renamed Guild");
}

#[tokio::test]
async fn test_delete_guild() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let register = RegisterRequest::unique();
    let registered = server.post("/api/v1/auth/register", &register).await.expect("request");
    let auth: AuthResponse = assert_json(registered, StatusCode::CREATED).await.expect("body");

    let guild_request = CreateGuildRequest::unique();
    let created = server
        .post_auth("/api/v1/guilds", &auth.access_token, &guild_request)
        .await
        .expect("request");
    let guild: GuildResponse = assert_json(created, StatusCode::CREATED).await.expect("body");

    let path = format!("/api/v1/guilds/{}", guild.id);
    let deleted = server.delete_auth(&path, &auth.access_token).await.expect("request");
    assert_status(deleted, StatusCode::NO_CONTENT).await.expect("delete");

    let refetch = server.get_auth(&path, &auth.access_token).await.expect("request");
    assert_status(refetch, StatusCode::NOT_FOUND).await.expect("gone");
}

#[tokio::test]
async fn test_transfer_guild_ownership() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let owner_register = RegisterRequest::unique();
    let owner_auth: AuthResponse = assert_json(
        server.post("/api/v1/auth/register", &owner_register).await.expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    let member_register = RegisterRequest::unique();
    let member_auth: AuthResponse = assert_json(
        server.post("/api/v1/auth/register", &member_register).await.expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    let guild_request = CreateGuildRequest::unique();
    let guild: GuildResponse = assert_json(
        server
            .post_auth("/api/v1/guilds", &owner_auth.access_token, &guild_request)
            .await
            .expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    let invite_path = format!("/api/v1/invites/{}", guild.invite_code);
    assert_status(
        server.post_auth(&invite_path, &member_auth.access_token, &()).await.expect("request"),
        StatusCode::OK,
    )
    .await
    .expect("join");

    let transfer = TransferGuildOwnershipRequest {
        new_owner_id: member_auth.user.id.clone(),
    };
    let owner_path = format!("/api/v1/guilds/{}/owner", guild.id);
    let response = server
        .patch_auth(&owner_path, &owner_auth.access_token, &transfer)
        .await
        .expect("request");
    let transferred: GuildResponse = assert_json(response, StatusCode::OK).await.expect("body");
    assert_eq!(transferred.owner_id, member_auth.user.id);
}

// ============================================================================
// Members
// ============================================================================

#[tokio::test]
async fn test_get_guild_members() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let register = RegisterRequest::unique();
    let auth: AuthResponse = assert_json(
        server.post("/api/v1/auth/register", &register).await.expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    let guild_request = CreateGuildRequest::unique();
    let guild: GuildResponse = assert_json(
        server
            .post_auth("/api/v1/guilds", &auth.access_token, &guild_request)
            .await
            .expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    let path = format!("/api/v1/guilds/{}/members", guild.id);
    let response = server.get_auth(&path, &auth.access_token).await.expect("request");
    let members: Vec<MemberResponse> = assert_json(response, StatusCode::OK).await.expect("body");

    assert_eq!(members.len(), 1);
    assert_eq!(members[0].role, "owner");
}

#[tokio::test]
async fn test_leave_guild_as_owner_is_forbidden() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let register = RegisterRequest::unique();
    let auth: AuthResponse = assert_json(
        server.post("/api/v1/auth/register", &register).await.expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    let guild_request = CreateGuildRequest::unique();
    let guild: GuildResponse = assert_json(
        server
            .post_auth("/api/v1/guilds", &auth.access_token, &guild_request)
            .await
            .expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    let path = format!("/api/v1/guilds/{}/members/@me", guild.id);
    let response = server.delete_auth(&path, &auth.access_token).await.expect("request");
    assert_status(response, StatusCode::CONFLICT).await.expect("owner cannot leave");
}

#[tokio::test]
async fn test_member_joins_and_leaves_guild() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let owner_register = RegisterRequest::unique();
    let owner_auth: AuthResponse = assert_json(
        server.post("/api/v1/auth/register", &owner_register).await.expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    let member_register = RegisterRequest::unique();
    let member_auth: AuthResponse = assert_json(
        server.post("/api/v1/auth/register", &member_register).await.expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    let guild_request = CreateGuildRequest::unique();
    let guild: GuildResponse = assert_json(
        server
            .post_auth("/api/v1/guilds", &owner_auth.access_token, &guild_request)
            .await
            .expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    let invite_path = format!("/api/v1/invites/{}", guild.invite_code);
    let joined: MemberResponse = assert_json(
        server.post_auth(&invite_path, &member_auth.access_token, &()).await.expect("request"),
        StatusCode::OK,
    )
    .await
    .expect("body");
    assert_eq!(joined.role, "member");

    let members_path = format!("/api/v1/guilds/{}/members", guild.id);
    let members: Vec<MemberResponse> = assert_json(
        server.get_auth(&members_path, &owner_auth.access_token).await.expect("request"),
        StatusCode::OK,
    )
    .await
    .expect("body");
    assert_eq!(members.len(), 2);

    let leave_path = format!("/api/v1/guilds/{}/members/@me", guild.id);
    let left = server.delete_auth(&leave_path, &member_auth.access_token).await.expect("request");
    assert_status(left, StatusCode::NO_CONTENT).await.expect("leave");
}

#[tokio::test]
async fn test_update_member_role() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let owner_register = RegisterRequest::unique();
    let owner_auth: AuthResponse = assert_json(
        server.post("/api/v1/auth/register", &owner_register).await.expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    let member_register = RegisterRequest::unique();
    let member_auth: AuthResponse = assert_json(
        server.post("/api/v1/auth/register", &member_register).await.expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    let guild_request = CreateGuildRequest::unique();
    let guild: GuildResponse = assert_json(
        server
            .post_auth("/api/v1/guilds", &owner_auth.access_token, &guild_request)
            .await
            .expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    let invite_path = format!("/api/v1/invites/{}", guild.invite_code);
    assert_status(
        server.post_auth(&invite_path, &member_auth.access_token, &()).await.expect("request"),
        StatusCode::OK,
    )
    .await
    .expect("join");

    let role_update = UpdateMemberRoleRequest { role: "admin".to_string() };
    let member_path = format!("/api/v1/guilds/{}/members/{}", guild.id, member_auth.user.id);
    let response = server
        .patch_auth(&member_path, &owner_auth.access_token, &role_update)
        .await
        .expect("request");
    let updated: MemberResponse = assert_json(response, StatusCode::OK).await.expect("body");
    assert_eq!(updated.role, "admin");
}

// ============================================================================
// Invites
// ============================================================================

#[tokio::test]
async fn test_create_invite_and_resolve() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let register = RegisterRequest::unique();
    let auth: AuthResponse = assert_json(
        server.post("/api/v1/auth/register", &register).await.expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    let guild_request = CreateGuildRequest::unique();
    let guild: GuildResponse = assert_json(
        server
            .post_auth("/api/v1/guilds", &auth.access_token, &guild_request)
            .await
            .expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    let create_path = format!("/api/v1/guilds/{}/invites", guild.id);
    let create_request = CreateInviteRequest { max_age: Some(3600) };
    let invite: InviteResponse = assert_json(
        server
            .post_auth(&create_path, &auth.access_token, &create_request)
            .await
            .expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    assert_eq!(invite.guild.id, guild.id);

    let resolve_path = format!("/api/v1/invites/{}", invite.code);
    let resolved: InviteResponse = assert_json(
        server.get_auth(&resolve_path, &auth.access_token).await.expect("request"),
        StatusCode::OK,
    )
    .await
    .expect("body");
    assert_eq!(resolved.code, invite.code);
}

#[tokio::test]
async fn test_accept_invite_joins_guild() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let owner_register = RegisterRequest::unique();
    let owner_auth: AuthResponse = assert_json(
        server.post("/api/v1/auth/register", &owner_register).await.expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    let member_register = RegisterRequest::unique();
    let member_auth: AuthResponse = assert_json(
        server.post("/api/v1/auth/register", &member_register).await.expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    let guild_request = CreateGuildRequest::unique();
    let guild: GuildResponse = assert_json(
        server
            .post_auth("/api/v1/guilds", &owner_auth.access_token, &guild_request)
            .await
            .expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    let create_path = format!("/api/v1/guilds/{}/invites", guild.id);
    let invite: InviteResponse = assert_json(
        server
            .post_auth(&create_path, &owner_auth.access_token, &CreateInviteRequest::default())
            .await
            .expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    let accept_path = format!("/api/v1/invites/{}", invite.code);
    let joined: MemberResponse = assert_json(
        server.post_auth(&accept_path, &member_auth.access_token, &()).await.expect("request"),
        StatusCode::OK,
    )
    .await
    .expect("body");
    assert_eq!(joined.user.id, member_auth.user.id);

    let members_path = format!("/api/v1/guilds/{}/members", guild.id);
    let members: Vec<MemberResponse> = assert_json(
        server.get_auth(&members_path, &owner_auth.access_token).await.expect("request"),
        StatusCode::OK,
    )
    .await
    .expect("body");
    assert_eq!(members.len(), 2);
}

#[tokio::test]
async fn test_revoke_invite() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let register = RegisterRequest::unique();
    let auth: AuthResponse = assert_json(
        server.post("/api/v1/auth/register", &register).await.expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    let guild_request = CreateGuildRequest::unique();
    let guild: GuildResponse = assert_json(
        server
            .post_auth("/api/v1/guilds", &auth.access_token, &guild_request)
            .await
            .expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    let create_path = format!("/api/v1/guilds/{}/invites", guild.id);
    let invite: InviteResponse = assert_json(
        server
            .post_auth(&create_path, &auth.access_token, &CreateInviteRequest::default())
            .await
            .expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    let invite_path = format!("/api/v1/invites/{}", invite.code);
    let revoked = server.delete_auth(&invite_path, &auth.access_token).await.expect("request");
    assert_status(revoked, StatusCode::NO_CONTENT).await.expect("revoke");

    let refetch = server.get_auth(&invite_path, &auth.access_token).await.expect("request");
    assert_status(refetch, StatusCode::NOT_FOUND).await.expect("gone");
}

// ============================================================================
// Messages (read path only; ingestion happens over the gateway)
// ============================================================================

#[tokio::test]
async fn test_get_messages_empty_history() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let register = RegisterRequest::unique();
    let auth: AuthResponse = assert_json(
        server.post("/api/v1/auth/register", &register).await.expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    let guild_request = CreateGuildRequest::unique();
    let guild: GuildResponse = assert_json(
        server
            .post_auth("/api/v1/guilds", &auth.access_token, &guild_request)
            .await
            .expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    let path = format!("/api/v1/guilds/{}/messages", guild.id);
    let response = server.get_auth(&path, &auth.access_token).await.expect("request");
    let page: PaginatedMessages = assert_json(response, StatusCode::OK).await.expect("body");

    assert!(page.data.is_empty());
    assert!(!page.pagination.has_more);
}

#[tokio::test]
async fn test_ack_messages_on_empty_guild() {
    if !check_test_env().await {
        return;
    }

    let server = TestServer::start().await.expect("server start");
    let register = RegisterRequest::unique();
    let auth: AuthResponse = assert_json(
        server.post("/api/v1/auth/register", &register).await.expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    let guild_request = CreateGuildRequest::unique();
    let guild: GuildResponse = assert_json(
        server
            .post_auth("/api/v1/guilds", &auth.access_token, &guild_request)
            .await
            .expect("request"),
        StatusCode::CREATED,
    )
    .await
    .expect("body");

    let path = format!("/api/v1/guilds/{}/ack", guild.id);
    let ack = AckMessagesRequest { sequence_id: 0 };
    let response = server.post_auth(&path, &auth.access_token, &ack).await.expect("request");
    assert_status(response, StatusCode::NO_CONTENT).await.expect("ack");
}
