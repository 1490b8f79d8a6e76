//! Signal-store traits (ports) - the ephemeral detection state
//!
//! Counters and the join tracker live in the shared cache tier; these ports
//! exist so the engines never touch a concrete cache and tests can inject
//! in-memory stores with a fake clock.

use async_trait::async_trait;

use crate::entities::MonitoredAction;
use crate::traits::repositories::{ProtectionFamily, RepoResult};
use crate::value_objects::Snowflake;

/// Distributed windowed counter keyed by (guild, actor, action-kind).
///
/// The window is fixed (first touch opens it, expiry closes it), not
/// sliding. The returned count is "at least this many since the window
/// opened".
#[async_trait]
pub trait ActionCounter: Send + Sync {
    /// Atomically increment and return the new count. Never errors: on
    /// distributed-tier failure implementations degrade to a process-local
    /// counter.
    async fn increment(
        &self,
        guild_id: Snowflake,
        actor_id: Snowflake,
        action: MonitoredAction,
    ) -> u64;
}

/// Time-ordered record of recent joins per guild, plus the raid-mode flag.
#[async_trait]
pub trait JoinTracker: Send + Sync {
    /// Record a join at the current instant
    async fn record_join(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<()>;

    /// Members whose recorded join is newer than now − `window_seconds`.
    /// Valid while `window_seconds` stays within the tracker's retention.
    async fn recent_joins(
        &self,
        guild_id: Snowflake,
        window_seconds: u32,
    ) -> RepoResult<Vec<Snowflake>>;

    /// Drop every recorded join for a guild
    async fn clear(&self, guild_id: Snowflake) -> RepoResult<()>;

    /// Whether raid mode is currently active
    async fn is_raid_mode(&self, guild_id: Snowflake) -> RepoResult<bool>;

    /// Activate raid mode with its own independent expiry
    async fn set_raid_mode(&self, guild_id: Snowflake, duration_seconds: u32) -> RepoResult<()>;
}

/// Shared (cross-process) settings cache tier, keyed by family + guild.
///
/// Values travel as JSON so the tier stays agnostic of the settings shape.
#[async_trait]
pub trait SettingsCacheTier: Send + Sync {
    async fn read(
        &self,
        family: ProtectionFamily,
        guild_id: Snowflake,
    ) -> RepoResult<Option<serde_json::Value>>;

    async fn write(
        &self,
        family: ProtectionFamily,
        guild_id: Snowflake,
        value: &serde_json::Value,
    ) -> RepoResult<()>;

    async fn remove(&self, family: ProtectionFamily, guild_id: Snowflake) -> RepoResult<()>;
}

/// Outbound half of the dashboard-sync channel: announces a settings write
/// so every other instance invalidates its cached copy.
#[async_trait]
pub trait SettingsSyncPublisher: Send + Sync {
    async fn publish(&self, guild_id: Snowflake, family: ProtectionFamily) -> RepoResult<()>;
}
