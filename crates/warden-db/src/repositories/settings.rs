//! PostgreSQL implementations of the settings repositories

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use warden_core::entities::{
    AccountAgePolicy, AntinukeSettings, AntiraidSettings, MassJoinPolicy,
};
use warden_core::traits::{RepoResult, SettingsRepository};
use warden_core::value_objects::Snowflake;
use warden_core::DomainError;

use crate::models::{AntinukeSettingsModel, AntiraidSettingsModel};

use super::error::{corrupt_column, map_db_error};

/// PostgreSQL implementation of `SettingsRepository<AntinukeSettings>`
#[derive(Clone)]
pub struct PgAntinukeSettingsRepository {
    pool: PgPool,
}

impl PgAntinukeSettingsRepository {
    /// Create a new repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TryFrom<AntinukeSettingsModel> for AntinukeSettings {
    type Error = DomainError;

    fn try_from(model: AntinukeSettingsModel) -> Result<Self, Self::Error> {
        let punishment = model
            .punishment
            .parse()
            .map_err(|_| corrupt_column("punishment", &model.punishment))?;
        let policies = serde_json::from_value(model.policies)
            .map_err(|e| DomainError::DatabaseError(format!("Unparseable policies: {e}")))?;

        Ok(AntinukeSettings {
            guild_id: Snowflake::new(model.guild_id),
            enabled: model.enabled,
            punishment,
            policies,
            log_channel_id: model.log_channel_id.map(Snowflake::new),
            alert_role_id: model.alert_role_id.map(Snowflake::new),
            quarantine_role_id: model.quarantine_role_id.map(Snowflake::new),
            mute_role_id: model.mute_role_id.map(Snowflake::new),
            revert_changes: model.revert_changes,
            trusted_operators: model
                .trusted_operators
                .into_iter()
                .map(Snowflake::new)
                .collect(),
            updated_at: model.updated_at,
        })
    }
}

#[async_trait]
impl SettingsRepository<AntinukeSettings> for PgAntinukeSettingsRepository {
    #[instrument(skip(self))]
    async fn find(&self, guild_id: Snowflake) -> RepoResult<Option<AntinukeSettings>> {
        let result = sqlx::query_as::<_, AntinukeSettingsModel>(
            r"
            SELECT guild_id, enabled, punishment, policies, log_channel_id, alert_role_id,
                   quarantine_role_id, mute_role_id, revert_changes, trusted_operators, updated_at
            FROM antinuke_settings
            WHERE guild_id = $1
            ",
        )
        .bind(guild_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(AntinukeSettings::try_from).transpose()
    }

    #[instrument(skip(self, settings))]
    async fn upsert(&self, settings: &AntinukeSettings) -> RepoResult<()> {
        let policies = serde_json::to_value(&settings.policies)
            .map_err(|e| DomainError::InternalError(format!("Serialize policies: {e}")))?;
        let trusted: Vec<i64> = settings
            .trusted_operators
            .iter()
            .map(|id| id.into_inner())
            .collect();

        sqlx::query(
            r"
            INSERT INTO antinuke_settings
                (guild_id, enabled, punishment, policies, log_channel_id, alert_role_id,
                 quarantine_role_id, mute_role_id, revert_changes, trusted_operators, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, NOW())
            ON CONFLICT (guild_id) DO UPDATE SET
                enabled = $2, punishment = $3, policies = $4, log_channel_id = $5,
                alert_role_id = $6, quarantine_role_id = $7, mute_role_id = $8,
                revert_changes = $9, trusted_operators = $10, updated_at = NOW()
            ",
        )
        .bind(settings.guild_id.into_inner())
        .bind(settings.enabled)
        .bind(settings.punishment.to_string())
        .bind(policies)
        .bind(settings.log_channel_id.map(Snowflake::into_inner))
        .bind(settings.alert_role_id.map(Snowflake::into_inner))
        .bind(settings.quarantine_role_id.map(Snowflake::into_inner))
        .bind(settings.mute_role_id.map(Snowflake::into_inner))
        .bind(settings.revert_changes)
        .bind(trusted)
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_enabled(&self) -> RepoResult<Vec<AntinukeSettings>> {
        let results = sqlx::query_as::<_, AntinukeSettingsModel>(
            r"
            SELECT guild_id, enabled, punishment, policies, log_channel_id, alert_role_id,
                   quarantine_role_id, mute_role_id, revert_changes, trusted_operators, updated_at
            FROM antinuke_settings
            WHERE enabled = TRUE
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results
            .into_iter()
            .map(AntinukeSettings::try_from)
            .collect()
    }
}

/// PostgreSQL implementation of `SettingsRepository<AntiraidSettings>`
#[derive(Clone)]
pub struct PgAntiraidSettingsRepository {
    pool: PgPool,
}

impl PgAntiraidSettingsRepository {
    /// Create a new repository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

impl TryFrom<AntiraidSettingsModel> for AntiraidSettings {
    type Error = DomainError;

    fn try_from(model: AntiraidSettingsModel) -> Result<Self, Self::Error> {
        let punishment = model
            .punishment
            .parse()
            .map_err(|_| corrupt_column("punishment", &model.punishment))?;

        Ok(AntiraidSettings {
            guild_id: Snowflake::new(model.guild_id),
            enabled: model.enabled,
            punishment,
            mass_join: MassJoinPolicy {
                enabled: model.mass_join_enabled,
                threshold: model.mass_join_threshold as u32,
                window_seconds: model.mass_join_window_seconds as u32,
            },
            account_age: AccountAgePolicy {
                enabled: model.account_age_enabled,
                min_age_seconds: model.account_age_min_seconds,
            },
            no_avatar_enabled: model.no_avatar_enabled,
            log_channel_id: model.log_channel_id.map(Snowflake::new),
            alert_role_id: model.alert_role_id.map(Snowflake::new),
            updated_at: model.updated_at,
        })
    }
}

#[async_trait]
impl SettingsRepository<AntiraidSettings> for PgAntiraidSettingsRepository {
    #[instrument(skip(self))]
    async fn find(&self, guild_id: Snowflake) -> RepoResult<Option<AntiraidSettings>> {
        let result = sqlx::query_as::<_, AntiraidSettingsModel>(
            r"
            SELECT guild_id, enabled, punishment, mass_join_enabled, mass_join_threshold,
                   mass_join_window_seconds, account_age_enabled, account_age_min_seconds,
                   no_avatar_enabled, log_channel_id, alert_role_id, updated_at
            FROM antiraid_settings
            WHERE guild_id = $1
            ",
        )
        .bind(guild_id.into_inner())
        .fetch_optional(&self.pool)
        .await
        .map_err(map_db_error)?;

        result.map(AntiraidSettings::try_from).transpose()
    }

    #[instrument(skip(self, settings))]
    async fn upsert(&self, settings: &AntiraidSettings) -> RepoResult<()> {
        sqlx::query(
            r"
            INSERT INTO antiraid_settings
                (guild_id, enabled, punishment, mass_join_enabled, mass_join_threshold,
                 mass_join_window_seconds, account_age_enabled, account_age_min_seconds,
                 no_avatar_enabled, log_channel_id, alert_role_id, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, NOW())
            ON CONFLICT (guild_id) DO UPDATE SET
                enabled = $2, punishment = $3, mass_join_enabled = $4,
                mass_join_threshold = $5, mass_join_window_seconds = $6,
                account_age_enabled = $7, account_age_min_seconds = $8,
                no_avatar_enabled = $9, log_channel_id = $10, alert_role_id = $11,
                updated_at = NOW()
            ",
        )
        .bind(settings.guild_id.into_inner())
        .bind(settings.enabled)
        .bind(settings.punishment.to_string())
        .bind(settings.mass_join.enabled)
        .bind(settings.mass_join.threshold as i32)
        .bind(settings.mass_join.window_seconds as i32)
        .bind(settings.account_age.enabled)
        .bind(settings.account_age.min_age_seconds)
        .bind(settings.no_avatar_enabled)
        .bind(settings.log_channel_id.map(Snowflake::into_inner))
        .bind(settings.alert_role_id.map(Snowflake::into_inner))
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn find_enabled(&self) -> RepoResult<Vec<AntiraidSettings>> {
        let results = sqlx::query_as::<_, AntiraidSettingsModel>(
            r"
            SELECT guild_id, enabled, punishment, mass_join_enabled, mass_join_threshold,
                   mass_join_window_seconds, account_age_enabled, account_age_min_seconds,
                   no_avatar_enabled, log_channel_id, alert_role_id, updated_at
            FROM antiraid_settings
            WHERE enabled = TRUE
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        results
            .into_iter()
            .map(AntiraidSettings::try_from)
            .collect()
    }
}
