//! Protection configuration surface
//!
//! The operations the command surface and dashboard call to shape a guild's
//! protection. Every write persists to the durable store, invalidates the
//! resolver's top two tiers, and publishes a settings-sync notification so
//! other instances invalidate too. Trusted-operator management is
//! owner-only; permission parsing for everything else lives in the command
//! dispatcher, not here.

use chrono::Utc;
use tracing::{info, instrument};

use warden_core::entities::{
    ActionPolicy, AntinukeSettings, AntiraidSettings, MonitoredAction, PunishmentKind,
    WhitelistEntry,
};
use warden_core::traits::ProtectionFamily;
use warden_core::value_objects::Snowflake;
use warden_core::DomainError;

use super::context::EngineContext;
use super::error::{ServiceError, ServiceResult};

/// Protection configuration service
pub struct SettingsService<'a> {
    ctx: &'a EngineContext,
}

impl<'a> SettingsService<'a> {
    /// Create a new SettingsService
    pub fn new(ctx: &'a EngineContext) -> Self {
        Self { ctx }
    }

    // ========================================================================
    // Exposed read surface
    // ========================================================================

    /// Resolve a guild's antinuke settings
    pub async fn get_antinuke(&self, guild_id: Snowflake) -> AntinukeSettings {
        self.ctx.antinuke_resolver().get(guild_id).await
    }

    /// Resolve a guild's antiraid settings
    pub async fn get_antiraid(&self, guild_id: Snowflake) -> AntiraidSettings {
        self.ctx.antiraid_resolver().get(guild_id).await
    }

    /// Whether a member is exempt from automated punishment. The guild
    /// owner is implicitly whitelisted.
    pub async fn is_whitelisted(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<bool> {
        if let Ok(owner) = self.ctx.platform().guild_owner(guild_id).await {
            if owner == user_id {
                return Ok(true);
            }
        }
        Ok(self.ctx.whitelist_repo().contains(guild_id, user_id).await?)
    }

    /// Whether a member may configure protection settings (owner or
    /// trusted operator)
    pub async fn is_trusted(&self, guild_id: Snowflake, user_id: Snowflake) -> ServiceResult<bool> {
        if let Ok(owner) = self.ctx.platform().guild_owner(guild_id).await {
            if owner == user_id {
                return Ok(true);
            }
        }
        let settings = self.get_antinuke(guild_id).await;
        Ok(settings.is_trusted(user_id))
    }

    // ========================================================================
    // Antinuke configuration
    // ========================================================================

    /// Enable or disable antinuke protection
    #[instrument(skip(self))]
    pub async fn set_antinuke_enabled(
        &self,
        guild_id: Snowflake,
        enabled: bool,
    ) -> ServiceResult<()> {
        self.update_antinuke(guild_id, |settings| settings.enabled = enabled)
            .await
    }

    /// Set the antinuke punishment kind
    #[instrument(skip(self))]
    pub async fn set_antinuke_punishment(
        &self,
        guild_id: Snowflake,
        punishment: PunishmentKind,
    ) -> ServiceResult<()> {
        self.update_antinuke(guild_id, |settings| settings.punishment = punishment)
            .await
    }

    /// Set one monitored action's policy
    #[instrument(skip(self))]
    pub async fn set_action_policy(
        &self,
        guild_id: Snowflake,
        action: MonitoredAction,
        policy: ActionPolicy,
    ) -> ServiceResult<()> {
        self.update_antinuke(guild_id, |settings| settings.set_policy(action, policy))
            .await
    }

    /// Set the antinuke log channel
    #[instrument(skip(self))]
    pub async fn set_antinuke_log_channel(
        &self,
        guild_id: Snowflake,
        channel_id: Option<Snowflake>,
    ) -> ServiceResult<()> {
        self.update_antinuke(guild_id, |settings| settings.log_channel_id = channel_id)
            .await
    }

    /// Set the antinuke alert role
    #[instrument(skip(self))]
    pub async fn set_antinuke_alert_role(
        &self,
        guild_id: Snowflake,
        role_id: Option<Snowflake>,
    ) -> ServiceResult<()> {
        self.update_antinuke(guild_id, |settings| settings.alert_role_id = role_id)
            .await
    }

    /// Toggle reverting malicious structural changes
    #[instrument(skip(self))]
    pub async fn set_revert_changes(
        &self,
        guild_id: Snowflake,
        revert: bool,
    ) -> ServiceResult<()> {
        self.update_antinuke(guild_id, |settings| settings.revert_changes = revert)
            .await
    }

    /// Point the settings at an existing quarantine role
    #[instrument(skip(self))]
    pub async fn set_quarantine_role(
        &self,
        guild_id: Snowflake,
        role_id: Option<Snowflake>,
    ) -> ServiceResult<()> {
        self.update_antinuke(guild_id, |settings| settings.quarantine_role_id = role_id)
            .await
    }

    /// Point the settings at an existing mute role
    #[instrument(skip(self))]
    pub async fn set_mute_role(
        &self,
        guild_id: Snowflake,
        role_id: Option<Snowflake>,
    ) -> ServiceResult<()> {
        self.update_antinuke(guild_id, |settings| settings.mute_role_id = role_id)
            .await
    }

    /// Create a fresh quarantine role, deny it in every channel, and store
    /// it in the settings
    #[instrument(skip(self))]
    pub async fn provision_quarantine_role(&self, guild_id: Snowflake) -> ServiceResult<Snowflake> {
        let role_id = self
            .ctx
            .platform()
            .create_role(guild_id, "Quarantined")
            .await?;
        self.ctx
            .platform()
            .deny_role_in_all_channels(guild_id, role_id)
            .await?;

        self.update_antinuke(guild_id, |settings| {
            settings.quarantine_role_id = Some(role_id);
        })
        .await?;

        info!(guild_id = %guild_id, role_id = %role_id, "Quarantine role provisioned");

        Ok(role_id)
    }

    /// Create a fresh mute role, deny it in every channel, and store it in
    /// the settings
    #[instrument(skip(self))]
    pub async fn provision_mute_role(&self, guild_id: Snowflake) -> ServiceResult<Snowflake> {
        let role_id = self.ctx.platform().create_role(guild_id, "Muted").await?;
        self.ctx
            .platform()
            .deny_role_in_all_channels(guild_id, role_id)
            .await?;

        self.update_antinuke(guild_id, |settings| {
            settings.mute_role_id = Some(role_id);
        })
        .await?;

        info!(guild_id = %guild_id, role_id = %role_id, "Mute role provisioned");

        Ok(role_id)
    }

    /// Add a trusted operator. Owner-only.
    #[instrument(skip(self))]
    pub async fn add_trusted_operator(
        &self,
        guild_id: Snowflake,
        caller_id: Snowflake,
        operator_id: Snowflake,
    ) -> ServiceResult<()> {
        self.require_owner(guild_id, caller_id).await?;
        self.update_antinuke(guild_id, |settings| settings.add_trusted(operator_id))
            .await
    }

    /// Remove a trusted operator. Owner-only.
    #[instrument(skip(self))]
    pub async fn remove_trusted_operator(
        &self,
        guild_id: Snowflake,
        caller_id: Snowflake,
        operator_id: Snowflake,
    ) -> ServiceResult<()> {
        self.require_owner(guild_id, caller_id).await?;
        self.update_antinuke(guild_id, |settings| settings.remove_trusted(operator_id))
            .await
    }

    // ========================================================================
    // Antiraid configuration
    // ========================================================================

    /// Enable or disable antiraid protection
    #[instrument(skip(self))]
    pub async fn set_antiraid_enabled(
        &self,
        guild_id: Snowflake,
        enabled: bool,
    ) -> ServiceResult<()> {
        self.update_antiraid(guild_id, |settings| settings.enabled = enabled)
            .await
    }

    /// Set the antiraid punishment kind
    #[instrument(skip(self))]
    pub async fn set_antiraid_punishment(
        &self,
        guild_id: Snowflake,
        punishment: PunishmentKind,
    ) -> ServiceResult<()> {
        self.update_antiraid(guild_id, |settings| settings.punishment = punishment)
            .await
    }

    /// Configure mass-join detection. The window must stay inside the
    /// tracker's retention.
    #[instrument(skip(self))]
    pub async fn set_mass_join(
        &self,
        guild_id: Snowflake,
        enabled: bool,
        threshold: u32,
        window_seconds: u32,
    ) -> ServiceResult<()> {
        if enabled && (threshold == 0 || window_seconds == 0 || window_seconds > 60) {
            return Err(ServiceError::validation(
                "Mass-join policy requires threshold > 0 and 1-60s window",
            ));
        }
        self.update_antiraid(guild_id, |settings| {
            settings.mass_join.enabled = enabled;
            settings.mass_join.threshold = threshold;
            settings.mass_join.window_seconds = window_seconds;
        })
        .await
    }

    /// Configure the minimum-account-age check
    #[instrument(skip(self))]
    pub async fn set_account_age(
        &self,
        guild_id: Snowflake,
        enabled: bool,
        min_age_seconds: i64,
    ) -> ServiceResult<()> {
        if enabled && min_age_seconds <= 0 {
            return Err(ServiceError::validation(
                "Account-age policy requires a positive minimum age",
            ));
        }
        self.update_antiraid(guild_id, |settings| {
            settings.account_age.enabled = enabled;
            settings.account_age.min_age_seconds = min_age_seconds;
        })
        .await
    }

    /// Toggle the no-avatar check
    #[instrument(skip(self))]
    pub async fn set_no_avatar(&self, guild_id: Snowflake, enabled: bool) -> ServiceResult<()> {
        self.update_antiraid(guild_id, |settings| settings.no_avatar_enabled = enabled)
            .await
    }

    /// Set the antiraid log channel
    #[instrument(skip(self))]
    pub async fn set_antiraid_log_channel(
        &self,
        guild_id: Snowflake,
        channel_id: Option<Snowflake>,
    ) -> ServiceResult<()> {
        self.update_antiraid(guild_id, |settings| settings.log_channel_id = channel_id)
            .await
    }

    // ========================================================================
    // Whitelist
    // ========================================================================

    /// Add a member to the whitelist
    #[instrument(skip(self))]
    pub async fn add_whitelist(
        &self,
        guild_id: Snowflake,
        caller_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<()> {
        // The owner is implicitly exempt; storing them is redundant
        if let Ok(owner) = self.ctx.platform().guild_owner(guild_id).await {
            if owner == user_id {
                return Err(ServiceError::conflict("The guild owner is always exempt"));
            }
        }

        let entry = WhitelistEntry::new(guild_id, user_id, caller_id);
        self.ctx.whitelist_repo().create(&entry).await?;

        info!(guild_id = %guild_id, user_id = %user_id, added_by = %caller_id, "Member whitelisted");

        Ok(())
    }

    /// Remove a member from the whitelist
    #[instrument(skip(self))]
    pub async fn remove_whitelist(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> ServiceResult<()> {
        self.ctx.whitelist_repo().delete(guild_id, user_id).await?;

        info!(guild_id = %guild_id, user_id = %user_id, "Member removed from whitelist");

        Ok(())
    }

    /// List a guild's whitelist
    #[instrument(skip(self))]
    pub async fn list_whitelist(&self, guild_id: Snowflake) -> ServiceResult<Vec<WhitelistEntry>> {
        Ok(self.ctx.whitelist_repo().find_by_guild(guild_id).await?)
    }

    // ========================================================================
    // Internals
    // ========================================================================

    async fn require_owner(&self, guild_id: Snowflake, caller_id: Snowflake) -> ServiceResult<()> {
        let owner = self.ctx.platform().guild_owner(guild_id).await?;
        if owner != caller_id {
            return Err(ServiceError::Domain(DomainError::NotGuildOwner));
        }
        Ok(())
    }

    async fn update_antinuke<F>(&self, guild_id: Snowflake, mutate: F) -> ServiceResult<()>
    where
        F: FnOnce(&mut AntinukeSettings),
    {
        let mut settings = self
            .ctx
            .antinuke_repo()
            .find(guild_id)
            .await?
            .unwrap_or_else(|| AntinukeSettings::default_disabled(guild_id));

        mutate(&mut settings);
        settings.updated_at = Utc::now();

        self.ctx.antinuke_repo().upsert(&settings).await?;
        self.after_write(guild_id, ProtectionFamily::Antinuke).await;

        Ok(())
    }

    async fn update_antiraid<F>(&self, guild_id: Snowflake, mutate: F) -> ServiceResult<()>
    where
        F: FnOnce(&mut AntiraidSettings),
    {
        let mut settings = self
            .ctx
            .antiraid_repo()
            .find(guild_id)
            .await?
            .unwrap_or_else(|| AntiraidSettings::default_disabled(guild_id));

        mutate(&mut settings);
        settings.updated_at = Utc::now();

        self.ctx.antiraid_repo().upsert(&settings).await?;
        self.after_write(guild_id, ProtectionFamily::Antiraid).await;

        Ok(())
    }

    /// Every write path invalidates, then announces the write on the sync
    /// channel
    async fn after_write(&self, guild_id: Snowflake, family: ProtectionFamily) {
        match family {
            ProtectionFamily::Antinuke => {
                self.ctx.antinuke_resolver().invalidate(guild_id).await;
            }
            ProtectionFamily::Antiraid => {
                self.ctx.antiraid_resolver().invalidate(guild_id).await;
            }
        }

        if let Err(e) = self.ctx.sync_publisher().publish(guild_id, family).await {
            tracing::warn!(
                guild_id = %guild_id,
                family = %family,
                error = %e,
                "Failed to publish settings-sync notification"
            );
        }
    }
}
