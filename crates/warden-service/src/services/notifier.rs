//! Mod-log notifier
//!
//! Delivers structured log notifications and plain alerts to a guild's log
//! channel, optionally mentioning the alert role. Delivery is
//! fire-and-forget: a failed notification is logged locally and never
//! interrupts the event that produced it.

use warden_core::entities::ModerationCase;
use warden_core::traits::LogNotification;
use warden_core::value_objects::Snowflake;

use super::context::EngineContext;

/// Mod-log notifier
pub struct ModLogNotifier<'a> {
    ctx: &'a EngineContext,
}

impl<'a> ModLogNotifier<'a> {
    /// Create a new ModLogNotifier
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    /// Deliver the structured notification for a ledger entry
    pub async fn case_logged(
        &self,
        guild_id: Snowflake,
        log_channel_id: Option<Snowflake>,
        alert_role_id: Option<Snowflake>,
        case: &ModerationCase,
    ) {
        let Some(channel_id) = log_channel_id else {
            tracing::debug!(guild_id = %guild_id, "No log channel configured, skipping notification");
            return;
        };

        let notification = LogNotification::from_case(case);
        if let Err(e) = self
            .ctx
            .platform()
            .send_log(guild_id, channel_id, &notification, alert_role_id)
            .await
        {
            tracing::warn!(
                guild_id = %guild_id,
                channel_id = %channel_id,
                case_id = case.case_id,
                error = %e,
                "Failed to deliver log notification"
            );
        }
    }

    /// Deliver a plain alert line (raid detected, detection without action)
    pub async fn alert(
        &self,
        guild_id: Snowflake,
        log_channel_id: Option<Snowflake>,
        alert_role_id: Option<Snowflake>,
        content: &str,
    ) {
        let Some(channel_id) = log_channel_id else {
            tracing::debug!(guild_id = %guild_id, "No log channel configured, skipping alert");
            return;
        };

        if let Err(e) = self
            .ctx
            .platform()
            .send_alert(guild_id, channel_id, content, alert_role_id)
            .await
        {
            tracing::warn!(
                guild_id = %guild_id,
                channel_id = %channel_id,
                error = %e,
                "Failed to deliver alert"
            );
        }
    }

    /// A detection the engine could not act on must still reach a human
    pub async fn could_not_act(
        &self,
        guild_id: Snowflake,
        log_channel_id: Option<Snowflake>,
        alert_role_id: Option<Snowflake>,
        target_id: Snowflake,
        detail: &str,
    ) {
        self.alert(
            guild_id,
            log_channel_id,
            alert_role_id,
            &format!("Threat detected on {target_id}, but could not act: {detail}"),
        )
        .await;
    }
}
