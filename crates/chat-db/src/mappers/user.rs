//! User entity <-> model mapper

use chat_core::entities::{User, UserStatus};
use chat_core::value_objects::Snowflake;

use crate::models::UserModel;

/// Convert UserModel to User entity
impl From<UserModel> for User {
    fn from(model: UserModel) -> Self {
        User {
            id: Snowflake::new(model.id),
            username: model.username,
            email: model.email,
            password_hash: model.password_hash,
            display_name: model.display_name,
            avatar_url: model.avatar_url,
            status: model.status.parse().unwrap_or(UserStatus::Offline),
            bound_node_id: model.bound_node_id,
            created_at: model.created_at,
            updated_at: model.updated_at,
            deleted_at: model.deleted_at,
        }
    }
}

/// Convert a User entity reference to values for database insertion
pub struct UserInsert<'a> {
    pub id: i64,
    pub username: &'a str,
    pub email: &'a str,
    pub password_hash: &'a str,
    pub display_name: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
    pub status: String,
    pub bound_node_id: Option<&'a str>,
}

impl<'a> UserInsert<'a> {
    pub fn new(user: &'a User) -> Self {
        Self {
            id: user.id.into_inner(),
            username: &user.username,
            email: &user.email,
            password_hash: &user.password_hash,
            display_name: user.display_name.as_deref(),
            avatar_url: user.avatar_url.as_deref(),
            status: user.status.to_string(),
            bound_node_id: user.bound_node_id.as_deref(),
        }
    }
}

/// Convert a User entity reference to values for database update
pub struct UserUpdate<'a> {
    pub id: i64,
    pub display_name: Option<&'a str>,
    pub avatar_url: Option<&'a str>,
    pub status: String,
    pub bound_node_id: Option<&'a str>,
}

impl<'a> UserUpdate<'a> {
    pub fn new(user: &'a User) -> Self {
        Self {
            id: user.id.into_inner(),
            display_name: user.display_name.as_deref(),
            avatar_url: user.avatar_url.as_deref(),
            status: user.status.to_string(),
            bound_node_id: user.bound_node_id.as_deref(),
        }
    }
}
