//! PostgreSQL implementation of MembershipRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use chat_core::entities::Membership;
use chat_core::error::DomainError;
use chat_core::traits::{MembershipRepository, RepoResult};
use chat_core::value_objects::Snowflake;

use crate::mappers::{MembershipInsert, MembershipUpdate};
use crate::models::MembershipModel;

use super::error::{map_db_error, map_unique_violation, member_not_found};

const SELECT_COLUMNS: &str = "guild_id, user_id, role, last_read_seq, joined_at, updated_at";

/// PostgreSQL implementation of `MembershipRepository`
#[derive(Clone)]
pub struct PgMembershipRepository {
    pool: PgPool,
}

impl PgMembershipRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipRepository for PgMembershipRepository {
    #[instrument(skip(self))]
    async fn find(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<Option<Membership>> {
        let result = sqlx::query_as::<_, MembershipModel>(&format!(
            "SELECT {SELECT_COLUMNS} FROM guild_members WHERE guild_id = $1 AND user_id = $2"
        ))
        .bind(guild_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Membership::from))
    }

    #[instrument(skip(self))]
    async fn find_by_guild(
        &self,
        guild_id: Snowflake,
        limit: i64,
        after: Option<Snowflake>,
    ) -> RepoResult<Vec<Membership>> {
        let limit = limit.clamp(1, 1000);

        let results = match after {
            Some(after_id) => {
                sqlx::query_as::<_, MembershipModel>(&format!(
                    "SELECT {SELECT_COLUMNS} FROM guild_members \
                     WHERE guild_id = $1 AND user_id > $2 ORDER BY user_id LIMIT $3"
                ))
                .bind(guild_id.into_inner())
                .bind(after_id.into_inner())
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query_as::<_, MembershipModel>(&format!(
                    "SELECT {SELECT_COLUMNS} FROM guild_members \
                     WHERE guild_id = $1 ORDER BY user_id LIMIT $2"
                ))
                .bind(guild_id.into_inner())
                .bind(limit)
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Membership::from).collect())
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Membership>> {
        let results = sqlx::query_as::<_, MembershipModel>(&format!(
            "SELECT {SELECT_COLUMNS} FROM guild_members WHERE user_id = $1 ORDER BY joined_at DESC"
        ))
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Membership::from).collect())
    }

    #[instrument(skip(self))]
    async fn is_member(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM guild_members WHERE guild_id = $1 AND user_id = $2)",
        )
        .bind(guild_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)
    }

    #[instrument(skip(self))]
    async fn create(&self, member: &Membership) -> RepoResult<()> {
        let values = MembershipInsert::new(member);
        sqlx::query(
            r"
            INSERT INTO guild_members (guild_id, user_id, role, last_read_seq, joined_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            ",
        )
        .bind(values.guild_id)
        .bind(values.user_id)
        .bind(values.role)
        .bind(values.last_read_seq)
        .bind(member.joined_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::AlreadyMember))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn update(&self, member: &Membership) -> RepoResult<()> {
        let values = MembershipUpdate::new(member);
        let result = sqlx::query(
            r"
            UPDATE guild_members
            SET role = $3, last_read_seq = $4, updated_at = NOW()
            WHERE guild_id = $1 AND user_id = $2
            ",
        )
        .bind(values.guild_id)
        .bind(values.user_id)
        .bind(values.role)
        .bind(values.last_read_seq)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(member_not_found());
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn mark_read(&self, guild_id: Snowflake, user_id: Snowflake, seq: i64) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE guild_members
            SET last_read_seq = $3, updated_at = NOW()
            WHERE guild_id = $1 AND user_id = $2 AND last_read_seq < $3
            ",
        )
        .bind(guild_id.into_inner())
        .bind(user_id.into_inner())
        .bind(seq)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 && !self.is_member(guild_id, user_id).await? {
            return Err(member_not_found());
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM guild_members WHERE guild_id = $1 AND user_id = $2")
            .bind(guild_id.into_inner())
            .bind(user_id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(member_not_found());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgMembershipRepository>();
    }
}
