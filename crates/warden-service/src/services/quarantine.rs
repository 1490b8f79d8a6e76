//! Quarantine service
//!
//! Reversible isolation: snapshot a member's roles, persist the snapshot,
//! then strip everything and assign the quarantine role. Release restores
//! every snapshotted role that still exists and is hierarchy-eligible;
//! partial restoration is a success. The snapshot is persisted before any
//! platform mutation so a mid-operation crash never loses role data.

use chrono::Utc;
use tracing::{info, instrument, warn};

use warden_core::entities::{QuarantineRecord, QuarantineSource};
use warden_core::value_objects::Snowflake;
use warden_core::DomainError;

use super::context::EngineContext;
use super::error::{ServiceError, ServiceResult};

/// Quarantine service
pub struct QuarantineService<'a> {
    ctx: &'a EngineContext,
}

impl<'a> QuarantineService<'a> {
    /// Create a new QuarantineService
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    /// Isolate a member: snapshot roles, persist, strip, add the quarantine
    /// role. Rejected if an active record already exists.
    #[instrument(skip(self, reason))]
    pub async fn isolate(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        moderator_id: Option<Snowflake>,
        reason: Option<String>,
        source: QuarantineSource,
    ) -> ServiceResult<QuarantineRecord> {
        if self
            .ctx
            .quarantine_repo()
            .find(guild_id, user_id)
            .await?
            .is_some()
        {
            return Err(ServiceError::from(DomainError::AlreadyQuarantined));
        }

        let settings = self.ctx.antinuke_resolver().get(guild_id).await;
        let quarantine_role = settings
            .quarantine_role_id
            .ok_or(ServiceError::Domain(DomainError::QuarantineRoleMissing))?;

        let held_roles = self
            .ctx
            .platform()
            .member_role_ids(guild_id, user_id)
            .await?;
        let snapshot: Vec<Snowflake> = held_roles
            .into_iter()
            .filter(|&role| role != quarantine_role)
            .collect();

        let record = QuarantineRecord {
            guild_id,
            user_id,
            role_ids: snapshot,
            moderator_id,
            reason,
            source,
            created_at: Utc::now(),
        };

        // Snapshot must be durable before the member is touched
        self.ctx.quarantine_repo().create(&record).await?;

        if let Err(e) = self
            .ctx
            .platform()
            .set_member_roles(guild_id, user_id, &[quarantine_role])
            .await
        {
            // The member was never mutated; drop the record again
            if let Err(cleanup) = self.ctx.quarantine_repo().delete(guild_id, user_id).await {
                warn!(
                    guild_id = %guild_id,
                    user_id = %user_id,
                    error = %cleanup,
                    "Failed to roll back quarantine record"
                );
            }
            return Err(ServiceError::Platform(e));
        }

        info!(
            guild_id = %guild_id,
            user_id = %user_id,
            source = %record.source,
            roles = record.role_ids.len(),
            "Member quarantined"
        );

        Ok(record)
    }

    /// Release a member: remove the quarantine role, restore the snapshot
    /// best-effort, destroy the record. Roles deleted meanwhile or now
    /// above the engine's reach are silently skipped.
    #[instrument(skip(self))]
    pub async fn release(&self, guild_id: Snowflake, user_id: Snowflake) -> ServiceResult<()> {
        let record = self
            .ctx
            .quarantine_repo()
            .find(guild_id, user_id)
            .await?
            .ok_or(ServiceError::Domain(DomainError::QuarantineNotFound))?;

        let restorable: Vec<Snowflake> = match self
            .ctx
            .platform()
            .manageable_role_ids(guild_id)
            .await
        {
            Ok(manageable) => record
                .role_ids
                .iter()
                .copied()
                .filter(|role| manageable.contains(role))
                .collect(),
            Err(e) => {
                warn!(
                    guild_id = %guild_id,
                    error = %e,
                    "Could not list manageable roles, releasing without restore"
                );
                Vec::new()
            }
        };

        self.ctx
            .platform()
            .set_member_roles(guild_id, user_id, &restorable)
            .await?;

        self.ctx.quarantine_repo().delete(guild_id, user_id).await?;

        info!(
            guild_id = %guild_id,
            user_id = %user_id,
            restored = restorable.len(),
            snapshotted = record.role_ids.len(),
            "Member released from quarantine"
        );

        Ok(())
    }

    /// On every join: if an active record exists for the joining member,
    /// strip and re-add the quarantine role without creating a new record
    /// or case, and tell the member that leaving does not lift the
    /// sanction. Returns whether a record existed.
    #[instrument(skip(self))]
    pub async fn reapply_if_persisted(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<bool> {
        let Some(record) = self.ctx.quarantine_repo().find(guild_id, user_id).await? else {
            return Ok(false);
        };

        let settings = self.ctx.antinuke_resolver().get(guild_id).await;
        // Role gone from config: the sanction still holds as a bare strip
        let roles: Vec<Snowflake> = settings.quarantine_role_id.into_iter().collect();

        if let Err(e) = self
            .ctx
            .platform()
            .set_member_roles(guild_id, user_id, &roles)
            .await
        {
            warn!(
                guild_id = %guild_id,
                user_id = %user_id,
                error = %e,
                "Failed to reapply quarantine on rejoin"
            );
        } else {
            info!(
                guild_id = %guild_id,
                user_id = %user_id,
                source = %record.source,
                "Quarantine reapplied on rejoin"
            );
        }

        if let Err(e) = self
            .ctx
            .platform()
            .direct_message(
                user_id,
                "You are quarantined in this server. Leaving and rejoining does not lift the sanction.",
            )
            .await
        {
            tracing::debug!(user_id = %user_id, error = %e, "Rejoin notice DM failed");
        }

        Ok(true)
    }
}
