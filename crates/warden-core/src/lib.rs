//! # warden-core
//!
//! Domain layer containing entities, value objects, ports, and the
//! protection events. This crate has zero dependencies on infrastructure
//! (database, cache, platform transport).

pub mod entities;
pub mod error;
pub mod events;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    AccountAgePolicy, ActionPolicy, AntinukeSettings, AntiraidSettings, CaseAction,
    MassJoinPolicy, ModerationCase, MonitoredAction, NewCase, PunishmentKind, QuarantineRecord,
    QuarantineSource, WhitelistEntry,
};
pub use error::DomainError;
pub use events::ProtectionEvent;
pub use traits::{
    ActionCounter, AuditAction, AuditEntry, CaseRepository, JoinTracker, LogNotification,
    PlatformClient, PlatformError, PlatformResult, ProtectionFamily, QuarantineRepository,
    RepoResult, SettingsCacheTier, SettingsFamily, SettingsRepository, SettingsSyncPublisher,
    WhitelistRepository,
};
pub use value_objects::{Clock, Snowflake, SnowflakeParseError, SystemClock};
