//! Engine context - dependency container for the protection services
//!
//! Holds the storage ports, signal stores, the platform collaborator, and
//! the two long-lived settings resolvers.

use std::sync::Arc;

use warden_core::entities::{AntinukeSettings, AntiraidSettings};
use warden_core::traits::{
    ActionCounter, CaseRepository, JoinTracker, PlatformClient, QuarantineRepository,
    SettingsCacheTier, SettingsRepository, SettingsSyncPublisher, WhitelistRepository,
};
use warden_core::value_objects::Clock;

use super::resolver::SettingsResolver;

/// Engine context containing all dependencies
///
/// This is the dependency container passed to every service. It provides
/// access to:
/// - Storage ports (settings, whitelist, quarantine, cases)
/// - Signal stores (action counter, join tracker)
/// - The platform collaborator
/// - The clock and the settings-sync publisher
/// - The two tiered settings resolvers
#[derive(Clone)]
pub struct EngineContext {
    antinuke_repo: Arc<dyn SettingsRepository<AntinukeSettings>>,
    antiraid_repo: Arc<dyn SettingsRepository<AntiraidSettings>>,
    whitelist_repo: Arc<dyn WhitelistRepository>,
    quarantine_repo: Arc<dyn QuarantineRepository>,
    case_repo: Arc<dyn CaseRepository>,
    counter: Arc<dyn ActionCounter>,
    join_tracker: Arc<dyn JoinTracker>,
    platform: Arc<dyn PlatformClient>,
    sync_publisher: Arc<dyn SettingsSyncPublisher>,
    clock: Arc<dyn Clock>,
    antinuke_resolver: Arc<SettingsResolver<AntinukeSettings>>,
    antiraid_resolver: Arc<SettingsResolver<AntiraidSettings>>,
}

impl EngineContext {
    /// Create a new engine context with all dependencies
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        antinuke_repo: Arc<dyn SettingsRepository<AntinukeSettings>>,
        antiraid_repo: Arc<dyn SettingsRepository<AntiraidSettings>>,
        settings_cache: Arc<dyn SettingsCacheTier>,
        whitelist_repo: Arc<dyn WhitelistRepository>,
        quarantine_repo: Arc<dyn QuarantineRepository>,
        case_repo: Arc<dyn CaseRepository>,
        counter: Arc<dyn ActionCounter>,
        join_tracker: Arc<dyn JoinTracker>,
        platform: Arc<dyn PlatformClient>,
        sync_publisher: Arc<dyn SettingsSyncPublisher>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let antinuke_resolver = Arc::new(SettingsResolver::new(
            Arc::clone(&settings_cache),
            Arc::clone(&antinuke_repo),
        ));
        let antiraid_resolver = Arc::new(SettingsResolver::new(
            settings_cache,
            Arc::clone(&antiraid_repo),
        ));

        Self {
            antinuke_repo,
            antiraid_repo,
            whitelist_repo,
            quarantine_repo,
            case_repo,
            counter,
            join_tracker,
            platform,
            sync_publisher,
            clock,
            antinuke_resolver,
            antiraid_resolver,
        }
    }

    // === Storage ports ===

    /// Get the antinuke settings repository
    pub fn antinuke_repo(&self) -> &dyn SettingsRepository<AntinukeSettings> {
        self.antinuke_repo.as_ref()
    }

    /// Get the antiraid settings repository
    pub fn antiraid_repo(&self) -> &dyn SettingsRepository<AntiraidSettings> {
        self.antiraid_repo.as_ref()
    }

    /// Get the whitelist repository
    pub fn whitelist_repo(&self) -> &dyn WhitelistRepository {
        self.whitelist_repo.as_ref()
    }

    /// Get the quarantine repository
    pub fn quarantine_repo(&self) -> &dyn QuarantineRepository {
        self.quarantine_repo.as_ref()
    }

    /// Get the case repository
    pub fn case_repo(&self) -> &dyn CaseRepository {
        self.case_repo.as_ref()
    }

    // === Signal stores ===

    /// Get the windowed action counter
    pub fn counter(&self) -> &dyn ActionCounter {
        self.counter.as_ref()
    }

    /// Get the join-flood tracker
    pub fn join_tracker(&self) -> &dyn JoinTracker {
        self.join_tracker.as_ref()
    }

    // === Collaborators ===

    /// Get the platform client
    pub fn platform(&self) -> &dyn PlatformClient {
        self.platform.as_ref()
    }

    /// Get the settings-sync publisher
    pub fn sync_publisher(&self) -> &dyn SettingsSyncPublisher {
        self.sync_publisher.as_ref()
    }

    /// Get the clock
    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    // === Resolvers ===

    /// Get the antinuke settings resolver
    pub fn antinuke_resolver(&self) -> &Arc<SettingsResolver<AntinukeSettings>> {
        &self.antinuke_resolver
    }

    /// Get the antiraid settings resolver
    pub fn antiraid_resolver(&self) -> &Arc<SettingsResolver<AntiraidSettings>> {
        &self.antiraid_resolver
    }
}

impl std::fmt::Debug for EngineContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EngineContext")
            .field("repositories", &"...")
            .field("signal_stores", &"...")
            .field("platform", &"PlatformClient")
            .finish()
    }
}
