//! Antinuke engine
//!
//! Watches administrative-permission abuse: mass bans/kicks, channel/role
//! churn, webhook creation, mass-mention spam, unauthorized bot additions.
//! Per (guild, actor, action-kind): a qualifying event is attributed,
//! exemptions are checked, the windowed counter is incremented, and
//! reaching the limit punishes the actor, writes a case, logs, and — when
//! revert is enabled — undoes the structural change. The counter is not
//! reset on punishment, so a repeat offender in the same window is punished
//! again on the very next qualifying event.

use tracing::{error, info, instrument};

use warden_core::entities::{
    AntinukeSettings, CaseAction, MonitoredAction, NewCase, QuarantineSource,
};
use warden_core::events::ProtectionEvent;
use warden_core::traits::AuditAction;
use warden_core::value_objects::Snowflake;

use super::cases::CaseService;
use super::context::EngineContext;
use super::correlator::AuditCorrelator;
use super::dedup::DedupGuard;
use super::error::ServiceResult;
use super::executor::PunishmentExecutor;
use super::notifier::ModLogNotifier;

/// Distinct mentions in one message before it counts as a mass-mention
/// qualifying event
const MENTION_FLOOD_MIN: u32 = 5;

/// Best-effort undo of the structural change that tripped the limit
#[derive(Debug, Clone, Copy)]
enum Revert {
    None,
    DeleteChannel(Snowflake),
    DeleteRole(Snowflake),
    DeleteWebhook(Snowflake),
    /// Bot removal is not gated by the revert flag: an unauthorized bot is
    /// always removed
    RemoveBot(Snowflake),
}

impl Revert {
    fn gated_by_settings(&self) -> bool {
        !matches!(self, Self::None | Self::RemoveBot(_))
    }
}

/// Antinuke engine
pub struct AntinukeEngine<'a> {
    ctx: &'a EngineContext,
}

impl<'a> AntinukeEngine<'a> {
    /// Create a new AntinukeEngine
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    /// Entry point for every platform event. Never propagates: a fault in
    /// one event must not halt the event loop.
    pub async fn handle(&self, event: &ProtectionEvent) {
        if let Err(e) = self.process(event).await {
            error!(
                guild_id = %event.guild_id(),
                error = %e,
                "Antinuke event processing failed"
            );
        }
    }

    async fn process(&self, event: &ProtectionEvent) -> ServiceResult<()> {
        match *event {
            ProtectionEvent::MemberBanned { guild_id, user_id } => {
                self.on_member_banned(guild_id, user_id).await
            }
            ProtectionEvent::MemberUnbanned { guild_id, user_id } => {
                self.on_member_unbanned(guild_id, user_id).await
            }
            ProtectionEvent::MemberRemoved { guild_id, user_id } => {
                self.on_member_removed(guild_id, user_id).await
            }
            ProtectionEvent::ChannelCreated {
                guild_id,
                channel_id,
            } => {
                self.on_structural(
                    guild_id,
                    MonitoredAction::CreateChannels,
                    AuditAction::ChannelCreate,
                    channel_id,
                    Revert::DeleteChannel(channel_id),
                )
                .await
            }
            ProtectionEvent::ChannelDeleted {
                guild_id,
                channel_id,
            } => {
                self.on_structural(
                    guild_id,
                    MonitoredAction::DeleteChannels,
                    AuditAction::ChannelDelete,
                    channel_id,
                    Revert::None,
                )
                .await
            }
            ProtectionEvent::RoleCreated { guild_id, role_id } => {
                self.on_structural(
                    guild_id,
                    MonitoredAction::CreateRoles,
                    AuditAction::RoleCreate,
                    role_id,
                    Revert::DeleteRole(role_id),
                )
                .await
            }
            ProtectionEvent::RoleDeleted { guild_id, role_id } => {
                self.on_structural(
                    guild_id,
                    MonitoredAction::DeleteRoles,
                    AuditAction::RoleDelete,
                    role_id,
                    Revert::None,
                )
                .await
            }
            ProtectionEvent::WebhookCreated {
                guild_id,
                webhook_id,
                ..
            } => {
                self.on_structural(
                    guild_id,
                    MonitoredAction::CreateWebhooks,
                    AuditAction::WebhookCreate,
                    webhook_id,
                    Revert::DeleteWebhook(webhook_id),
                )
                .await
            }
            ProtectionEvent::MessageCreated {
                guild_id,
                author_id,
                mention_count,
                ..
            } => {
                if mention_count < MENTION_FLOOD_MIN {
                    return Ok(());
                }
                let settings = self.ctx.antinuke_resolver().get(guild_id).await;
                if !settings.enabled {
                    return Ok(());
                }
                self.count_and_punish(
                    guild_id,
                    &settings,
                    author_id,
                    MonitoredAction::MassMention,
                    Revert::None,
                )
                .await
            }
            ProtectionEvent::MemberJoined {
                guild_id,
                user_id,
                is_bot: true,
                ..
            } => self.on_bot_added(guild_id, user_id).await,
            // Non-bot joins belong to the antiraid engine
            ProtectionEvent::MemberJoined { .. } => Ok(()),
        }
    }

    /// Generic ban notification: suppress our own/manual duplicates, record
    /// external bans in the ledger, count towards the actor's window
    #[instrument(skip(self))]
    async fn on_member_banned(
        &self,
        guild_id: Snowflake,
        target_id: Snowflake,
    ) -> ServiceResult<()> {
        if DedupGuard::new(self.ctx)
            .is_duplicate_of_recent_case(guild_id, target_id, CaseAction::Ban)
            .await
        {
            return Ok(());
        }

        let settings = self.ctx.antinuke_resolver().get(guild_id).await;
        if !settings.enabled {
            return Ok(());
        }

        let Some(actor) = AuditCorrelator::new(self.ctx)
            .attribute(guild_id, AuditAction::MemberBan, target_id)
            .await
        else {
            return Ok(());
        };
        if actor == self.ctx.platform().bot_user_id() {
            return Ok(());
        }

        // Ledger entry for a ban performed outside the command surface
        let case = CaseService::new(self.ctx)
            .create(NewCase {
                guild_id,
                target_id,
                moderator_id: Some(actor),
                action: CaseAction::Ban,
                reason: Some("Banned directly on the platform".to_string()),
                duration_seconds: None,
            })
            .await?;
        ModLogNotifier::new(self.ctx)
            .case_logged(
                guild_id,
                settings.log_channel_id,
                settings.alert_role_id,
                &case,
            )
            .await;

        self.count_and_punish(
            guild_id,
            &settings,
            actor,
            MonitoredAction::BanMembers,
            Revert::None,
        )
        .await
    }

    /// Unban notifications are only deduplicated; unbans are not a
    /// monitored abuse signal
    async fn on_member_unbanned(
        &self,
        guild_id: Snowflake,
        target_id: Snowflake,
    ) -> ServiceResult<()> {
        if !DedupGuard::new(self.ctx)
            .is_duplicate_of_recent_case(guild_id, target_id, CaseAction::Unban)
            .await
        {
            info!(guild_id = %guild_id, target_id = %target_id, "External unban observed");
        }
        Ok(())
    }

    /// Member-removed fires for leaves and kicks alike; only an audit entry
    /// naming this member as kick target makes it a qualifying event
    #[instrument(skip(self))]
    async fn on_member_removed(
        &self,
        guild_id: Snowflake,
        target_id: Snowflake,
    ) -> ServiceResult<()> {
        let settings = self.ctx.antinuke_resolver().get(guild_id).await;
        if !settings.enabled {
            return Ok(());
        }

        let Some(actor) = AuditCorrelator::new(self.ctx)
            .attribute(guild_id, AuditAction::MemberKick, target_id)
            .await
        else {
            // Voluntary leave
            return Ok(());
        };
        if actor == self.ctx.platform().bot_user_id() {
            return Ok(());
        }

        if DedupGuard::new(self.ctx)
            .is_duplicate_of_recent_case(guild_id, target_id, CaseAction::Kick)
            .await
        {
            return Ok(());
        }

        let case = CaseService::new(self.ctx)
            .create(NewCase {
                guild_id,
                target_id,
                moderator_id: Some(actor),
                action: CaseAction::Kick,
                reason: Some("Kicked directly on the platform".to_string()),
                duration_seconds: None,
            })
            .await?;
        ModLogNotifier::new(self.ctx)
            .case_logged(
                guild_id,
                settings.log_channel_id,
                settings.alert_role_id,
                &case,
            )
            .await;

        self.count_and_punish(
            guild_id,
            &settings,
            actor,
            MonitoredAction::KickMembers,
            Revert::None,
        )
        .await
    }

    /// Structural change: attribute, then count towards the actor's window
    #[instrument(skip(self))]
    async fn on_structural(
        &self,
        guild_id: Snowflake,
        action: MonitoredAction,
        audit_action: AuditAction,
        target_id: Snowflake,
        revert: Revert,
    ) -> ServiceResult<()> {
        let settings = self.ctx.antinuke_resolver().get(guild_id).await;
        if !settings.enabled || !settings.policy(action).enabled {
            return Ok(());
        }

        let Some(actor) = AuditCorrelator::new(self.ctx)
            .attribute(guild_id, audit_action, target_id)
            .await
        else {
            // Fail-open on attribution, fail-closed on punishment
            return Ok(());
        };

        self.count_and_punish(guild_id, &settings, actor, action, revert)
            .await
    }

    /// Unauthorized bot addition: fixed limit of 1, and the bot itself is
    /// removed regardless of the revert flag
    #[instrument(skip(self))]
    async fn on_bot_added(&self, guild_id: Snowflake, bot_id: Snowflake) -> ServiceResult<()> {
        let settings = self.ctx.antinuke_resolver().get(guild_id).await;
        if !settings.enabled || !settings.policy(MonitoredAction::AddBot).enabled {
            return Ok(());
        }

        let Some(actor) = AuditCorrelator::new(self.ctx)
            .attribute(guild_id, AuditAction::BotAdd, bot_id)
            .await
        else {
            return Ok(());
        };

        self.count_and_punish(
            guild_id,
            &settings,
            actor,
            MonitoredAction::AddBot,
            Revert::RemoveBot(bot_id),
        )
        .await
    }

    /// The shared Normal → Punishing transition
    async fn count_and_punish(
        &self,
        guild_id: Snowflake,
        settings: &AntinukeSettings,
        actor_id: Snowflake,
        action: MonitoredAction,
        revert: Revert,
    ) -> ServiceResult<()> {
        let policy = settings.policy(action);
        if !policy.enabled {
            return Ok(());
        }
        if actor_id == self.ctx.platform().bot_user_id() {
            return Ok(());
        }
        if self.is_exempt(guild_id, actor_id).await {
            return Ok(());
        }

        let count = self
            .ctx
            .counter()
            .increment(guild_id, actor_id, action)
            .await;
        if count < u64::from(policy.limit) {
            return Ok(());
        }

        info!(
            guild_id = %guild_id,
            actor_id = %actor_id,
            action = %action,
            count,
            limit = policy.limit,
            "Antinuke limit reached, punishing"
        );

        let reason = format!(
            "{action} limit reached ({count} within the detection window)"
        );
        let punished = PunishmentExecutor::new(self.ctx)
            .execute(
                guild_id,
                actor_id,
                settings.punishment,
                &reason,
                QuarantineSource::Antinuke,
            )
            .await;

        let notifier = ModLogNotifier::new(self.ctx);
        if punished {
            let case = CaseService::new(self.ctx)
                .create(NewCase::automated(
                    guild_id,
                    actor_id,
                    settings.punishment.case_action(),
                    reason,
                ))
                .await?;
            notifier
                .case_logged(
                    guild_id,
                    settings.log_channel_id,
                    settings.alert_role_id,
                    &case,
                )
                .await;
        } else {
            notifier
                .could_not_act(
                    guild_id,
                    settings.log_channel_id,
                    settings.alert_role_id,
                    actor_id,
                    &reason,
                )
                .await;
        }

        self.apply_revert(guild_id, settings, revert).await;

        Ok(())
    }

    /// Exemptions checked before counting: guild owner and whitelist. An
    /// unreadable signal means "do not punish".
    async fn is_exempt(&self, guild_id: Snowflake, actor_id: Snowflake) -> bool {
        match self.ctx.platform().guild_owner(guild_id).await {
            Ok(owner) if owner == actor_id => return true,
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(guild_id = %guild_id, error = %e, "Owner lookup failed, not punishing");
                return true;
            }
        }

        match self
            .ctx
            .whitelist_repo()
            .contains(guild_id, actor_id)
            .await
        {
            Ok(listed) => listed,
            Err(e) => {
                tracing::warn!(guild_id = %guild_id, error = %e, "Whitelist lookup failed, not punishing");
                true
            }
        }
    }

    /// Best-effort undo of the offending structural change
    async fn apply_revert(
        &self,
        guild_id: Snowflake,
        settings: &AntinukeSettings,
        revert: Revert,
    ) {
        if revert.gated_by_settings() && !settings.revert_changes {
            return;
        }

        let result = match revert {
            Revert::None => return,
            Revert::DeleteChannel(id) => self.ctx.platform().delete_channel(guild_id, id).await,
            Revert::DeleteRole(id) => self.ctx.platform().delete_role(guild_id, id).await,
            Revert::DeleteWebhook(id) => self.ctx.platform().delete_webhook(guild_id, id).await,
            Revert::RemoveBot(id) => {
                self.ctx
                    .platform()
                    .kick_member(guild_id, id, "Unauthorized bot addition")
                    .await
            }
        };

        if let Err(e) = result {
            tracing::warn!(
                guild_id = %guild_id,
                revert = ?revert,
                error = %e,
                "Revert of malicious change failed"
            );
        }
    }
}
