//! PostgreSQL implementation of QuarantineRepository

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use warden_core::entities::QuarantineRecord;
use warden_core::traits::{QuarantineRepository, RepoResult};
use warden_core::value_objects::Snowflake;
use warden_core::DomainError;

use crate::models::QuarantineModel;

use super::error::{corrupt_column, map_db_error, map_unique_violation, quarantine_not_found};

/// PostgreSQL implementation of QuarantineRepository
#[derive(Clone)]
pub struct PgQuarantineRepository {
    pool: PgPool,
}

impl PgQuarantineRepository {
    /// Create a new PgQuarantineRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TryFrom<QuarantineModel> for QuarantineRecord {
    type Error = DomainError;

    fn try_from(model: QuarantineModel) -> Result<Self, Self::Error> {
        let source = model
            .source
            .parse()
            .map_err(|_| corrupt_column("source", &model.source))?;

        Ok(QuarantineRecord {
            guild_id: Snowflake::new(model.guild_id),
            user_id: Snowflake::new(model.user_id),
            role_ids: model.role_ids.into_iter().map(Snowflake::new).collect(),
            moderator_id: model.moderator_id.map(Snowflake::new),
            reason: model.reason,
            source,
            created_at: model.created_at,
        })
    }
}

#[async_trait]
impl QuarantineRepository for PgQuarantineRepository {
    #[instrument(skip(self))]
    async fn find(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<QuarantineRecord>> {
        let result = sqlx::query_as::<_, QuarantineModel>(
            r"
            SELECT guild_id, user_id, role_ids, moderator_id, reason, source, created_at
            FROM quarantine_records
            WHERE guild_id = $1 AND user_id = $2
            ",
        )
        .bind(guild_id.into_inner())
        .bind(user_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(QuarantineRecord::try_from).transpose()
    }

    #[instrument(skip(self, record))]
    async fn create(&self, record: &QuarantineRecord) -> RepoResult<()> {
        let role_ids: Vec<i64> = record.role_ids.iter().map(|id| id.into_inner()).collect();

        sqlx::query(
            r"
            INSERT INTO quarantine_records
                (guild_id, user_id, role_ids, moderator_id, reason, source, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ",
        )
        .bind(record.guild_id.into_inner())
        .bind(record.user_id.into_inner())
        .bind(role_ids)
        .bind(record.moderator_id.map(Snowflake::into_inner))
        .bind(&record.reason)
        .bind(record.source.to_string())
        .bind(record.created_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, || DomainError::AlreadyQuarantined))?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            DELETE FROM quarantine_records WHERE guild_id = $1 AND user_id = $2
            ",
        )
        .bind(guild_id.into_inner())
        .bind(user_id.into_inner())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(quarantine_not_found());
        }

        Ok(())
    }
}
