//! User service
//!
//! Handles user profile lookup and updates.

use chat_core::entities::User;
use chat_core::Snowflake;
use tracing::{info, instrument};

use crate::dto::{CurrentUserResponse, UpdateUserRequest, UserResponse};

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// User service
pub struct UserService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> UserService<'a> {
    /// Create a new UserService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Get a user's public profile by ID
    #[instrument(skip(self))]
    pub async fn get_user(&self, user_id: Snowflake) -> ServiceResult<UserResponse> {
        let user = self.get_user_entity(user_id).await?;
        Ok(UserResponse::from(&user))
    }

    /// Get the current authenticated user's own profile (includes email)
    #[instrument(skip(self))]
    pub async fn get_current_user(&self, user_id: Snowflake) -> ServiceResult<CurrentUserResponse> {
        let user = self.get_user_entity(user_id).await?;
        Ok(CurrentUserResponse::from(&user))
    }

    /// Get a user entity by ID
    #[instrument(skip(self))]
    pub async fn get_user_entity(&self, user_id: Snowflake) -> ServiceResult<User> {
        self.ctx
            .user_repo()
            .find_by_id(user_id)
            .await?
            .filter(|u| !u.is_deleted())
            .ok_or_else(|| ServiceError::not_found("User", user_id.to_string()))
    }

    /// Update the current user's profile (username, display name, avatar)
    #[instrument(skip(self, request))]
    pub async fn update_user(
        &self,
        user_id: Snowflake,
        request: UpdateUserRequest,
    ) -> ServiceResult<CurrentUserResponse> {
        let mut user = self.get_user_entity(user_id).await?;

        if let Some(username) = request.username {
            if username != user.username && self.ctx.user_repo().username_exists(&username).await? {
                return Err(ServiceError::conflict("Username already taken"));
            }
            if !chat_core::entities::is_valid_username(&username) {
                return Err(ServiceError::validation("Invalid username"));
            }
            user.username = username;
        }

        if let Some(display_name) = request.display_name {
            user.set_display_name(if display_name.is_empty() { None } else { Some(display_name) });
        }

        if let Some(avatar_url) = request.avatar_url {
            user.avatar_url = if avatar_url.is_empty() { None } else { Some(avatar_url) };
        }

        self.ctx.user_repo().update(&user).await?;

        info!(user_id = %user_id, "User profile updated");

        Ok(CurrentUserResponse::from(&user))
    }

    /// Soft delete a user's own account
    #[instrument(skip(self))]
    pub async fn delete_user(&self, user_id: Snowflake) -> ServiceResult<()> {
        self.ctx.user_repo().delete(user_id).await?;
        info!(user_id = %user_id, "User account deleted");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    // Integration tests would go here with mocked dependencies
}
