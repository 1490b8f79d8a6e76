//! Punishment executor
//!
//! Applies a punishment independent of which detector asked for it,
//! dispatching on the closed `PunishmentKind` variant. A best-effort direct
//! message goes out before the mutation; its failure never blocks the
//! punishment. Owner/whitelist exemption is the caller's responsibility.
//! Returns `false`, without raising, when the platform refuses — the caller
//! logs the failure.

use tracing::{instrument, warn};

use warden_core::entities::{PunishmentKind, QuarantineSource};
use warden_core::value_objects::Snowflake;
use warden_core::DomainError;

use super::context::EngineContext;
use super::error::{ServiceError, ServiceResult};
use super::quarantine::QuarantineService;

/// Punishment executor
pub struct PunishmentExecutor<'a> {
    ctx: &'a EngineContext,
}

impl<'a> PunishmentExecutor<'a> {
    /// Create a new PunishmentExecutor
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    /// Apply a punishment. Returns whether the sanction is in place.
    #[instrument(skip(self, reason))]
    pub async fn execute(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        punishment: PunishmentKind,
        reason: &str,
        source: QuarantineSource,
    ) -> bool {
        // Best-effort notice before the mutation cuts the member off
        if let Err(e) = self
            .ctx
            .platform()
            .direct_message(
                user_id,
                &format!("A protection measure was applied to you: {punishment}. Reason: {reason}"),
            )
            .await
        {
            tracing::debug!(user_id = %user_id, error = %e, "Punishment notice DM failed");
        }

        match self
            .try_execute(guild_id, user_id, punishment, reason, source)
            .await
        {
            Ok(()) => true,
            Err(ServiceError::Domain(DomainError::AlreadyQuarantined)) => {
                // The sanction is already in place
                true
            }
            Err(e) => {
                warn!(
                    guild_id = %guild_id,
                    user_id = %user_id,
                    punishment = %punishment,
                    error = %e,
                    "Punishment failed"
                );
                false
            }
        }
    }

    async fn try_execute(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        punishment: PunishmentKind,
        reason: &str,
        source: QuarantineSource,
    ) -> ServiceResult<()> {
        match punishment {
            PunishmentKind::Ban => {
                self.ctx
                    .platform()
                    .ban_member(guild_id, user_id, reason)
                    .await?;
            }
            PunishmentKind::Kick => {
                self.ctx
                    .platform()
                    .kick_member(guild_id, user_id, reason)
                    .await?;
            }
            PunishmentKind::Strip => {
                self.strip_roles(guild_id, user_id).await?;
            }
            PunishmentKind::Quarantine => {
                if self.quarantine_role_usable(guild_id).await {
                    QuarantineService::new(self.ctx)
                        .isolate(guild_id, user_id, None, Some(reason.to_string()), source)
                        .await?;
                } else {
                    // No usable quarantine role: fall back to a bare strip
                    tracing::debug!(
                        guild_id = %guild_id,
                        "Quarantine role missing, falling back to strip"
                    );
                    self.strip_roles(guild_id, user_id).await?;
                }
            }
        }
        Ok(())
    }

    async fn strip_roles(&self, guild_id: Snowflake, user_id: Snowflake) -> ServiceResult<()> {
        self.ctx
            .platform()
            .set_member_roles(guild_id, user_id, &[])
            .await?;
        Ok(())
    }

    /// Whether the configured quarantine role still exists on the platform
    async fn quarantine_role_usable(&self, guild_id: Snowflake) -> bool {
        let settings = self.ctx.antinuke_resolver().get(guild_id).await;
        let Some(role_id) = settings.quarantine_role_id else {
            return false;
        };

        match self.ctx.platform().manageable_role_ids(guild_id).await {
            Ok(roles) => roles.contains(&role_id),
            Err(e) => {
                tracing::debug!(guild_id = %guild_id, error = %e, "Could not verify quarantine role");
                false
            }
        }
    }
}
