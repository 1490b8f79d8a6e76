//! PostgreSQL implementation of WhitelistRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use warden_core::entities::WhitelistEntry;
use warden_core::traits::{RepoResult, WhitelistRepository};
use warden_core::value_objects::Snowflake;

use crate::models::WhitelistModel;

use super::error::{map_db_error, map_unique_violation, whitelist_entry_not_found};

/// PostgreSQL implementation of WhitelistRepository
#[derive(Clone)]
pub struct PgWhitelistRepository {
    pool: PgPool,
}

impl PgWhitelistRepository {
    /// Create a new PgWhitelistRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl From<WhitelistModel> for WhitelistEntry {
    fn from(model: WhitelistModel) -> Self {
        WhitelistEntry {
            guild_id: Snowflake::new(model.guild_id),
            user_id: Snowflake::new(model.user_id),
            added_by: Snowflake::new(model.added_by),
            created_at: model.created_at,
        }
    }
}

#[async_trait]
impl WhitelistRepository for PgWhitelistRepository {
    #[instrument(skip(self))]
    async fn contains(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<bool> {
        let result = sqlx::query_scalar::<_, bool>(
            r"
            SELECT EXISTS(SELECT 1 FROM protection_whitelist WHERE guild_id = $1 AND user_id = $2)
            ",
        )
        .bind(guild_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_one(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result)
    }

    #[instrument(skip(self))]
    async fn find_by_guild(&self, guild_id: Snowflake) -> RepoResult<Vec<WhitelistEntry>> {
        let results = sqlx::query_as::<_, WhitelistModel>(
            r"
            SELECT guild_id, user_id, added_by, created_at
            FROM protection_whitelist
            WHERE guild_id = $1
            ORDER BY created_at DESC
            ",
        )
        .bind(guild_id.into_inner())
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(results.into_iter().map(WhitelistEntry::from).collect())
    }

    #[instrument(skip(self, entry))]
    async fn create(&self, entry: &WhitelistEntry) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO protection_whitelist (guild_id, user_id, added_by, created_at)
            VALUES ($1, $2, $3, $4)
            ",
        )
        .bind(entry.guild_id.into_inner())
        .bind(entry.user_id.into_inner())
        .bind(entry.added_by.into_inner())
        .bind(entry.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| {
            map_unique_violation(e, || warden_core::DomainError::AlreadyWhitelisted)
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            DELETE FROM protection_whitelist WHERE guild_id = $1 AND user_id = $2
            ",
        )
        .bind(guild_id.into_inner())
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(whitelist_entry_not_found());
        }

        Ok(())
    }
}
