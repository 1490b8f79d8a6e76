//! Antiraid engine
//!
//! Per-guild state machine over join events. An active raid mode punishes
//! the joiner immediately. Otherwise the join is recorded and exactly one
//! check fires, first match wins: mass-join threshold (activates raid mode,
//! punishes the whole recent-join set, clears the tracker), minimum account
//! age, then the no-avatar check.

use tracing::{error, info, instrument, warn};

use warden_core::entities::{AntiraidSettings, NewCase, QuarantineSource};
use warden_core::events::ProtectionEvent;
use warden_core::value_objects::Snowflake;

use super::cases::CaseService;
use super::context::EngineContext;
use super::error::ServiceResult;
use super::executor::PunishmentExecutor;
use super::notifier::ModLogNotifier;
use super::quarantine::QuarantineService;

/// Raid mode duration once a flood is detected
const RAID_MODE_SECS: u32 = 60;

/// Antiraid engine
pub struct AntiraidEngine<'a> {
    ctx: &'a EngineContext,
}

impl<'a> AntiraidEngine<'a> {
    /// Create a new AntiraidEngine
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    /// Entry point for every platform event; only non-bot joins are
    /// relevant here. Never propagates.
    pub async fn handle(&self, event: &ProtectionEvent) {
        let ProtectionEvent::MemberJoined {
            guild_id,
            user_id,
            is_bot: false,
            has_avatar,
        } = *event
        else {
            return;
        };

        if let Err(e) = self.on_member_join(guild_id, user_id, has_avatar).await {
            error!(
                guild_id = %guild_id,
                user_id = %user_id,
                error = %e,
                "Antiraid event processing failed"
            );
        }
    }

    #[instrument(skip(self))]
    async fn on_member_join(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        has_avatar: bool,
    ) -> ServiceResult<()> {
        // A quarantined member rejoining is re-isolated before anything else
        if QuarantineService::new(self.ctx)
            .reapply_if_persisted(guild_id, user_id)
            .await?
        {
            return Ok(());
        }

        let settings = self.ctx.antiraid_resolver().get(guild_id).await;
        if !settings.enabled {
            return Ok(());
        }

        if self.is_exempt(guild_id, user_id).await {
            return Ok(());
        }

        // Active raid mode short-circuits every other check
        match self.ctx.join_tracker().is_raid_mode(guild_id).await {
            Ok(true) => {
                info!(guild_id = %guild_id, user_id = %user_id, "Join during active raid mode");
                self.punish(guild_id, &settings, user_id, "Joined during an active raid")
                    .await;
                return Ok(());
            }
            Ok(false) => {}
            Err(e) => {
                warn!(guild_id = %guild_id, error = %e, "Raid-mode flag unreadable, continuing");
            }
        }

        if let Err(e) = self.ctx.join_tracker().record_join(guild_id, user_id).await {
            warn!(guild_id = %guild_id, error = %e, "Failed to record join");
        }

        // Checks are mutually exclusive per join; first match wins
        if settings.mass_join.enabled {
            match self
                .ctx
                .join_tracker()
                .recent_joins(guild_id, settings.mass_join.window_seconds)
                .await
            {
                Ok(recent) if recent.len() as u32 >= settings.mass_join.threshold => {
                    self.mitigate_raid(guild_id, &settings, &recent).await;
                    return Ok(());
                }
                Ok(_) => {}
                Err(e) => {
                    warn!(guild_id = %guild_id, error = %e, "Join window unreadable, skipping mass-join check");
                }
            }
        }

        if settings.account_age.enabled {
            let age = self.ctx.clock().now() - user_id.created_at();
            if age.num_seconds() < settings.account_age.min_age_seconds {
                self.punish(
                    guild_id,
                    &settings,
                    user_id,
                    &format!(
                        "Account younger than the configured minimum ({}s old)",
                        age.num_seconds().max(0)
                    ),
                )
                .await;
                return Ok(());
            }
        }

        if settings.no_avatar_enabled && !has_avatar {
            self.punish(guild_id, &settings, user_id, "Account has no avatar")
                .await;
        }

        Ok(())
    }

    /// Mass-join threshold reached: raid mode on, log, punish the whole
    /// recent-join set, clear the tracker
    async fn mitigate_raid(
        &self,
        guild_id: Snowflake,
        settings: &AntiraidSettings,
        recent: &[Snowflake],
    ) {
        if let Err(e) = self
            .ctx
            .join_tracker()
            .set_raid_mode(guild_id, RAID_MODE_SECS)
            .await
        {
            warn!(guild_id = %guild_id, error = %e, "Failed to activate raid-mode flag");
        }

        info!(
            guild_id = %guild_id,
            joined = recent.len(),
            threshold = settings.mass_join.threshold,
            "Raid detected"
        );
        ModLogNotifier::new(self.ctx)
            .alert(
                guild_id,
                settings.log_channel_id,
                settings.alert_role_id,
                &format!(
                    "Raid detected: {} joins within {}s. Mitigating.",
                    recent.len(),
                    settings.mass_join.window_seconds
                ),
            )
            .await;

        for &member in recent {
            if self.is_exempt(guild_id, member).await {
                continue;
            }
            self.punish(guild_id, settings, member, "Raid participant")
                .await;
        }

        if let Err(e) = self.ctx.join_tracker().clear(guild_id).await {
            warn!(guild_id = %guild_id, error = %e, "Failed to clear join tracker");
        }
    }

    /// Punish one joiner, write the case, log the outcome
    async fn punish(
        &self,
        guild_id: Snowflake,
        settings: &AntiraidSettings,
        user_id: Snowflake,
        reason: &str,
    ) {
        let punished = PunishmentExecutor::new(self.ctx)
            .execute(
                guild_id,
                user_id,
                settings.punishment,
                reason,
                QuarantineSource::Antiraid,
            )
            .await;

        let notifier = ModLogNotifier::new(self.ctx);
        if punished {
            match CaseService::new(self.ctx)
                .create(NewCase::automated(
                    guild_id,
                    user_id,
                    settings.punishment.case_action(),
                    reason,
                ))
                .await
            {
                Ok(case) => {
                    notifier
                        .case_logged(
                            guild_id,
                            settings.log_channel_id,
                            settings.alert_role_id,
                            &case,
                        )
                        .await;
                }
                Err(e) => {
                    warn!(guild_id = %guild_id, user_id = %user_id, error = %e, "Failed to write case");
                }
            }
        } else {
            notifier
                .could_not_act(
                    guild_id,
                    settings.log_channel_id,
                    settings.alert_role_id,
                    user_id,
                    reason,
                )
                .await;
        }
    }

    /// Owner and whitelisted members are never punished; an unreadable
    /// signal means "do not punish"
    async fn is_exempt(&self, guild_id: Snowflake, user_id: Snowflake) -> bool {
        if user_id == self.ctx.platform().bot_user_id() {
            return true;
        }

        match self.ctx.platform().guild_owner(guild_id).await {
            Ok(owner) if owner == user_id => return true,
            Ok(_) => {}
            Err(e) => {
                warn!(guild_id = %guild_id, error = %e, "Owner lookup failed, not punishing");
                return true;
            }
        }

        match self.ctx.whitelist_repo().contains(guild_id, user_id).await {
            Ok(listed) => listed,
            Err(e) => {
                warn!(guild_id = %guild_id, error = %e, "Whitelist lookup failed, not punishing");
                true
            }
        }
    }
}
