//! PostgreSQL implementation of CaseRepository
//!
//! Case ids come from an atomic per-guild sequence row updated inside the
//! same transaction as the insert, so concurrent writers can never observe
//! a gap or a duplicate.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use warden_core::entities::{CaseAction, ModerationCase, NewCase};
use warden_core::traits::{CaseRepository, RepoResult};
use warden_core::value_objects::Snowflake;
use warden_core::DomainError;

use crate::models::CaseModel;

use super::error::{case_not_found, corrupt_column, map_db_error};

/// PostgreSQL implementation of CaseRepository
#[derive(Clone)]
pub struct PgCaseRepository {
    pool: PgPool,
}

impl PgCaseRepository {
    /// Create a new PgCaseRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TryFrom<CaseModel> for ModerationCase {
    type Error = DomainError;

    fn try_from(model: CaseModel) -> Result<Self, Self::Error> {
        let action: CaseAction = model
            .action
            .parse()
            .map_err(|_| corrupt_column("action", &model.action))?;

        Ok(ModerationCase {
            guild_id: Snowflake::new(model.guild_id),
            case_id: model.case_id,
            target_id: Snowflake::new(model.target_id),
            moderator_id: model.moderator_id.map(Snowflake::new),
            action,
            reason: model.reason,
            edited_by: model.edited_by.map(Snowflake::new),
            edited_at: model.edited_at,
            duration_seconds: model.duration_seconds,
            expires_at: model.expires_at,
            created_at: model.created_at,
        })
    }
}

#[async_trait]
impl CaseRepository for PgCaseRepository {
    #[instrument(skip(self, new_case))]
    async fn create(&self, new_case: &NewCase) -> RepoResult<ModerationCase> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let case_id = sqlx::query_scalar::<_, i64>(
            r"
            INSERT INTO case_sequences (guild_id, last_id)
            VALUES ($1, 1)
            ON CONFLICT (guild_id) DO UPDATE SET last_id = case_sequences.last_id + 1
            RETURNING last_id
            ",
        )
        .bind(new_case.guild_id.into_inner())
        .fetch_one(&mut *tx)
        .await
        .map_err(map_db_error)?;

        let now = Utc::now();
        let expires_at = new_case
            .duration_seconds
            .map(|secs| now + chrono::Duration::seconds(secs));

        sqlx::query(
            r"
            INSERT INTO moderation_cases
                (guild_id, case_id, target_id, moderator_id, action, reason,
                 duration_seconds, expires_at, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            ",
        )
        .bind(new_case.guild_id.into_inner())
        .bind(case_id)
        .bind(new_case.target_id.into_inner())
        .bind(new_case.moderator_id.map(Snowflake::into_inner))
        .bind(new_case.action.as_str())
        .bind(&new_case.reason)
        .bind(new_case.duration_seconds)
        .bind(expires_at)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        Ok(ModerationCase {
            guild_id: new_case.guild_id,
            case_id,
            target_id: new_case.target_id,
            moderator_id: new_case.moderator_id,
            action: new_case.action,
            reason: new_case.reason.clone(),
            edited_by: None,
            edited_at: None,
            duration_seconds: new_case.duration_seconds,
            expires_at,
            created_at: now,
        })
    }

    #[instrument(skip(self))]
    async fn find(&self, guild_id: Snowflake, case_id: i64) -> RepoResult<Option<ModerationCase>> {
        let result = sqlx::query_as::<_, CaseModel>(
            r"
            SELECT guild_id, case_id, target_id, moderator_id, action, reason,
                   edited_by, edited_at, duration_seconds, expires_at, created_at
            FROM moderation_cases
            WHERE guild_id = $1 AND case_id = $2
            ",
        )
        .bind(guild_id.into_inner())
        .bind(case_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(ModerationCase::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_latest(
        &self,
        guild_id: Snowflake,
        target_id: Snowflake,
        action: CaseAction,
    ) -> RepoResult<Option<ModerationCase>> {
        let result = sqlx::query_as::<_, CaseModel>(
            r"
            SELECT guild_id, case_id, target_id, moderator_id, action, reason,
                   edited_by, edited_at, duration_seconds, expires_at, created_at
            FROM moderation_cases
            WHERE guild_id = $1 AND target_id = $2 AND action = $3
            ORDER BY case_id DESC
            LIMIT 1
            ",
        )
        .bind(guild_id.into_inner())
        .bind(target_id.into_inner())
        .bind(action.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(ModerationCase::try_from).transpose()
    }

    #[instrument(skip(self))]
    async fn find_by_target(
        &self,
        guild_id: Snowflake,
        target_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<ModerationCase>> {
        let results = sqlx::query_as::<_, CaseModel>(
            r"
            SELECT guild_id, case_id, target_id, moderator_id, action, reason,
                   edited_by, edited_at, duration_seconds, expires_at, created_at
            FROM moderation_cases
            WHERE guild_id = $1 AND target_id = $2
            ORDER BY case_id DESC
            LIMIT $3
            ",
        )
        .bind(guild_id.into_inner())
        .bind(target_id.into_inner())
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results.into_iter().map(ModerationCase::try_from).collect()
    }

    #[instrument(skip(self, reason))]
    async fn update_reason(
        &self,
        guild_id: Snowflake,
        case_id: i64,
        reason: &str,
        edited_by: Snowflake,
        edited_at: DateTime<Utc>,
    ) -> RepoResult<()> {
        let result = sqlx::query(
            r"
            UPDATE moderation_cases
            SET reason = $3, edited_by = $4, edited_at = $5
            WHERE guild_id = $1 AND case_id = $2
            ",
        )
        .bind(guild_id.into_inner())
        .bind(case_id)
        .bind(reason)
        .bind(edited_by.into_inner())
        .bind(edited_at)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(case_not_found(guild_id, case_id));
        }

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete(&self, guild_id: Snowflake, case_id: i64) -> RepoResult<()> {
        // The sequence row is untouched: deleted ids are never reused
        let result = sqlx::query(
            r"
            DELETE FROM moderation_cases WHERE guild_id = $1 AND case_id = $2
            ",
        )
        .bind(guild_id.into_inner())
        .bind(case_id)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(case_not_found(guild_id, case_id));
        }

        Ok(())
    }
}
