//! PostgreSQL implementation of GuildRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use chat_core::entities::{Guild, Membership};
use chat_core::error::DomainError;
use chat_core::traits::{GuildRepository, RepoResult};
use chat_core::value_objects::Snowflake;

use crate::mappers::{GuildInsert, GuildUpdate, MembershipInsert};
use crate::models::GuildModel;

use super::error::map_db_error;

const SELECT_COLUMNS: &str = "id, name, owner_id, invite_code, created_at, updated_at";

/// PostgreSQL implementation of `GuildRepository`
#[derive(Clone)]
pub struct PgGuildRepository {
    pool: PgPool,
}

impl PgGuildRepository {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl GuildRepository for PgGuildRepository {
    #[instrument(skip(self))]
    async fn find_by_id(&self, id: Snowflake) -> RepoResult<Option<Guild>> {
        let result = sqlx::query_as::<_, GuildModel>(&format!(
            "SELECT {SELECT_COLUMNS} FROM guilds WHERE id = $1"
        ))
        .bind(id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Guild::from))
    }

    #[instrument(skip(self))]
    async fn find_by_invite_code(&self, invite_code: &str) -> RepoResult<Option<Guild>> {
        let result = sqlx::query_as::<_, GuildModel>(&format!(
            "SELECT {SELECT_COLUMNS} FROM guilds WHERE invite_code = $1"
        ))
        .bind(invite_code)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.map(Guild::from))
    }

    #[instrument(skip(self))]
    async fn find_by_user(&self, user_id: Snowflake) -> RepoResult<Vec<Guild>> {
        let results = sqlx::query_as::<_, GuildModel>(&format!(
            r"
            SELECT g.id, g.name, g.owner_id, g.invite_code, g.created_at, g.updated_at
            FROM guilds g
            JOIN guild_members gm ON gm.guild_id = g.id
            WHERE gm.user_id = $1
            ORDER BY gm.joined_at DESC
            "
        ))
        .bind(user_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(Guild::from).collect())
    }

    #[instrument(skip(self))]
    async fn create_with_owner(&self, guild: &Guild, owner_membership: &Membership) -> RepoResult<()> {
        let guild_values = GuildInsert::new(guild);
        let member_values = MembershipInsert::new(owner_membership);

        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        sqlx::query(
            r"
            INSERT INTO guilds (id, name, owner_id, invite_code, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            ",
        )
        .bind(guild_values.id)
        .bind(guild_values.name)
        .bind(guild_values.owner_id)
        .bind(guild_values.invite_code)
        .bind(guild.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if e.as_database_error().is_some_and(sqlx::error::DatabaseError::is_unique_violation) {
                DomainError::InviteCodeExists
            } else {
                DomainError::DatabaseError(e.to_string())
            }
        })?;

        sqlx::query(
            r"
            INSERT INTO guild_members (guild_id, user_id, role, last_read_seq, joined_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $5)
            ",
        )
        .bind(member_values.guild_id)
        .bind(member_values.user_id)
        .bind(member_values.role)
        .bind(member_values.last_read_seq)
        .bind(owner_membership.joined_at)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn update(&self, guild: &Guild) -> RepoResult<()> {
        let values = GuildUpdate::new(guild);
        let result = sqlx::query(
            "UPDATE guilds SET name = $2, owner_id = $3, invite_code = $4, updated_at = NOW() WHERE id = $1",
        )
        .bind(values.id)
        .bind(values.name)
        .bind(values.owner_id)
        .bind(values.invite_code)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::GuildNotFound(guild.id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query("DELETE FROM guilds WHERE id = $1")
            .bind(id.into_inner())
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(DomainError::GuildNotFound(id));
        }
        Ok(())
    }

    #[instrument(skip(self))]
    async fn member_count(&self, guild_id: Snowflake) -> RepoResult<i64> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM guild_members WHERE guild_id = $1")
            .bind(guild_id.into_inner())
            .fetch_one(&self.pool)
            .await
            .map_err(map_db_error)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgGuildRepository>();
    }
}
