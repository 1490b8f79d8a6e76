//! Tiered settings resolver
//!
//! Resolves a guild's protection settings through three tiers: process-local
//! map, shared cache, durable store. Every value resolved from a lower tier
//! is written back upward. A guild with no stored document materializes the
//! default-disabled value; the resolver never errors — an unreachable tier
//! degrades to the next one down.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use warden_cache::SettingsSyncEvent;
use warden_core::entities::{AntinukeSettings, AntiraidSettings};
use warden_core::traits::{
    ProtectionFamily, SettingsCacheTier, SettingsFamily, SettingsRepository,
};
use warden_core::value_objects::Snowflake;

/// Tiered resolver for one settings family
pub struct SettingsResolver<T: SettingsFamily> {
    local: DashMap<Snowflake, T>,
    cache: Arc<dyn SettingsCacheTier>,
    repo: Arc<dyn SettingsRepository<T>>,
}

impl<T: SettingsFamily> SettingsResolver<T> {
    /// Create a resolver over the shared cache tier and the durable store
    pub fn new(cache: Arc<dyn SettingsCacheTier>, repo: Arc<dyn SettingsRepository<T>>) -> Self {
        Self {
            local: DashMap::new(),
            cache,
            repo,
        }
    }

    /// Resolve a guild's settings. Infallible: unreachable tiers are logged
    /// and skipped, a full miss materializes the default-disabled value.
    pub async fn get(&self, guild_id: Snowflake) -> T {
        if let Some(settings) = self.local.get(&guild_id) {
            return settings.clone();
        }

        match self.cache.read(T::FAMILY, guild_id).await {
            Ok(Some(value)) => match serde_json::from_value::<T>(value) {
                Ok(settings) => {
                    self.local.insert(guild_id, settings.clone());
                    return settings;
                }
                Err(e) => {
                    tracing::warn!(
                        guild_id = %guild_id,
                        family = %T::FAMILY,
                        error = %e,
                        "Discarding unparseable cached settings"
                    );
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(
                    guild_id = %guild_id,
                    family = %T::FAMILY,
                    error = %e,
                    "Shared settings tier unreachable"
                );
            }
        }

        match self.repo.find(guild_id).await {
            Ok(Some(settings)) => {
                self.write_back(guild_id, &settings).await;
                settings
            }
            Ok(None) => {
                // Materialize the default; cached upward but never persisted
                let settings = T::default_disabled(guild_id);
                self.write_back(guild_id, &settings).await;
                settings
            }
            Err(e) => {
                tracing::warn!(
                    guild_id = %guild_id,
                    family = %T::FAMILY,
                    error = %e,
                    "Durable settings tier unreachable, resolving default-disabled"
                );
                T::default_disabled(guild_id)
            }
        }
    }

    /// Clear the top two tiers for a guild. Must follow every write path;
    /// the durable store is untouched.
    pub async fn invalidate(&self, guild_id: Snowflake) {
        self.local.remove(&guild_id);
        if let Err(e) = self.cache.remove(T::FAMILY, guild_id).await {
            tracing::warn!(
                guild_id = %guild_id,
                family = %T::FAMILY,
                error = %e,
                "Failed to invalidate shared settings tier"
            );
        }
    }

    /// Spawn the background refresh task: periodically re-pulls all enabled
    /// settings into the process-local tier to bound staleness even without
    /// an invalidation signal. Cancels cleanly on shutdown.
    pub fn spawn_refresh(
        self: &Arc<Self>,
        interval: Duration,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        let resolver = Arc::clone(self);
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        resolver.refresh_enabled().await;
                    }
                    _ = shutdown.changed() => {
                        tracing::debug!(family = %T::FAMILY, "Settings refresh task shutting down");
                        break;
                    }
                }
            }
        })
    }

    /// One refresh pass over every enabled guild
    async fn refresh_enabled(&self) {
        match self.repo.find_enabled().await {
            Ok(settings_list) => {
                let count = settings_list.len();
                for settings in settings_list {
                    self.local.insert(settings.guild_id(), settings);
                }
                tracing::debug!(family = %T::FAMILY, count, "Refreshed enabled settings");
            }
            Err(e) => {
                tracing::warn!(
                    family = %T::FAMILY,
                    error = %e,
                    "Settings refresh pass failed"
                );
            }
        }
    }

    async fn write_back(&self, guild_id: Snowflake, settings: &T) {
        match serde_json::to_value(settings) {
            Ok(value) => {
                if let Err(e) = self.cache.write(T::FAMILY, guild_id, &value).await {
                    tracing::warn!(
                        guild_id = %guild_id,
                        family = %T::FAMILY,
                        error = %e,
                        "Failed to write settings back to shared tier"
                    );
                }
            }
            Err(e) => {
                tracing::warn!(guild_id = %guild_id, error = %e, "Failed to serialize settings");
            }
        }
        self.local.insert(guild_id, settings.clone());
    }
}

/// Wire the settings-sync channel to the resolvers: each received event
/// invalidates the named family for the named guild. Runs until the event
/// channel closes.
pub fn spawn_sync_invalidation(
    antinuke: Arc<SettingsResolver<AntinukeSettings>>,
    antiraid: Arc<SettingsResolver<AntiraidSettings>>,
    mut events: mpsc::Receiver<SettingsSyncEvent>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event.family() {
                Some(ProtectionFamily::Antinuke) => {
                    antinuke.invalidate(event.guild_id).await;
                }
                Some(ProtectionFamily::Antiraid) => {
                    antiraid.invalidate(event.guild_id).await;
                }
                None => {
                    tracing::debug!(family = %event.family, "Ignoring sync event for unknown family");
                }
            }
        }
        tracing::info!("Settings-sync invalidation task shutting down");
    })
}
