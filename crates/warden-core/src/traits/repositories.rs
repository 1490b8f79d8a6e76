//! Repository traits (ports) - define the interface for durable storage
//!
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::entities::{
    AntinukeSettings, AntiraidSettings, CaseAction, ModerationCase, NewCase, QuarantineRecord,
    WhitelistEntry,
};
use crate::error::DomainError;
use crate::value_objects::Snowflake;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Settings
// ============================================================================

/// Which protection settings document a value belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProtectionFamily {
    Antinuke,
    Antiraid,
}

impl ProtectionFamily {
    /// Stable identifier used in cache keys and sync notifications
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Antinuke => "antinuke",
            Self::Antiraid => "antiraid",
        }
    }

    /// Parse a sync-notification family string
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "antinuke" => Some(Self::Antinuke),
            "antiraid" => Some(Self::Antiraid),
            _ => None,
        }
    }
}

impl std::fmt::Display for ProtectionFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Implemented by both settings entities so the tiered resolver can be
/// written once for either family
pub trait SettingsFamily:
    Clone + Send + Sync + Serialize + DeserializeOwned + 'static
{
    const FAMILY: ProtectionFamily;

    fn guild_id(&self) -> Snowflake;
    fn enabled(&self) -> bool;
    /// The value a guild without a stored document resolves to
    fn default_disabled(guild_id: Snowflake) -> Self;
}

impl SettingsFamily for AntinukeSettings {
    const FAMILY: ProtectionFamily = ProtectionFamily::Antinuke;

    fn guild_id(&self) -> Snowflake {
        self.guild_id
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn default_disabled(guild_id: Snowflake) -> Self {
        AntinukeSettings::default_disabled(guild_id)
    }
}

impl SettingsFamily for AntiraidSettings {
    const FAMILY: ProtectionFamily = ProtectionFamily::Antiraid;

    fn guild_id(&self) -> Snowflake {
        self.guild_id
    }

    fn enabled(&self) -> bool {
        self.enabled
    }

    fn default_disabled(guild_id: Snowflake) -> Self {
        AntiraidSettings::default_disabled(guild_id)
    }
}

#[async_trait]
pub trait SettingsRepository<T: SettingsFamily>: Send + Sync {
    /// Find the settings document for a guild
    async fn find(&self, guild_id: Snowflake) -> RepoResult<Option<T>>;

    /// Create or replace the settings document
    async fn upsert(&self, settings: &T) -> RepoResult<()>;

    /// List every guild's settings with protection enabled (background
    /// refresh re-pulls these into the process-local tier)
    async fn find_enabled(&self) -> RepoResult<Vec<T>>;
}

// ============================================================================
// Whitelist
// ============================================================================

#[async_trait]
pub trait WhitelistRepository: Send + Sync {
    /// Check if a member is whitelisted
    async fn contains(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<bool>;

    /// List all whitelist entries for a guild
    async fn find_by_guild(&self, guild_id: Snowflake) -> RepoResult<Vec<WhitelistEntry>>;

    /// Add a whitelist entry
    async fn create(&self, entry: &WhitelistEntry) -> RepoResult<()>;

    /// Remove a whitelist entry
    async fn delete(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Quarantine
// ============================================================================

#[async_trait]
pub trait QuarantineRepository: Send + Sync {
    /// Find the active record for a member
    async fn find(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> RepoResult<Option<QuarantineRecord>>;

    /// Persist a new record; fails if one already exists
    async fn create(&self, record: &QuarantineRecord) -> RepoResult<()>;

    /// Destroy the record (release)
    async fn delete(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<()>;
}

// ============================================================================
// Case Ledger
// ============================================================================

#[async_trait]
pub trait CaseRepository: Send + Sync {
    /// Append a case, assigning the next id from the guild's atomic sequence
    async fn create(&self, new_case: &NewCase) -> RepoResult<ModerationCase>;

    /// Find a case by guild and id
    async fn find(&self, guild_id: Snowflake, case_id: i64) -> RepoResult<Option<ModerationCase>>;

    /// Most recent case for a (target, action) pair, for dedup
    async fn find_latest(
        &self,
        guild_id: Snowflake,
        target_id: Snowflake,
        action: CaseAction,
    ) -> RepoResult<Option<ModerationCase>>;

    /// List cases against one target, newest first
    async fn find_by_target(
        &self,
        guild_id: Snowflake,
        target_id: Snowflake,
        limit: i64,
    ) -> RepoResult<Vec<ModerationCase>>;

    /// Replace the reason, retaining who edited and when
    async fn update_reason(
        &self,
        guild_id: Snowflake,
        case_id: i64,
        reason: &str,
        edited_by: Snowflake,
        edited_at: chrono::DateTime<chrono::Utc>,
    ) -> RepoResult<()>;

    /// Delete a case (administrator-only command path)
    async fn delete(&self, guild_id: Snowflake, case_id: i64) -> RepoResult<()>;
}
