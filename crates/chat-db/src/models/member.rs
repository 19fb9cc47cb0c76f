//! Membership database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for guild_members table
#[derive(Debug, Clone, FromRow)]
pub struct MembershipModel {
    pub guild_id: i64,
    pub user_id: i64,
    pub role: String,
    pub last_read_seq: i64,
    pub joined_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
