//! Ports - interfaces the infrastructure and platform layers implement

mod platform;
mod repositories;
mod signals;

pub use platform::{
    AuditAction, AuditEntry, LogNotification, PlatformClient, PlatformError, PlatformResult,
};
pub use repositories::{
    CaseRepository, ProtectionFamily, QuarantineRepository, RepoResult, SettingsFamily,
    SettingsRepository, WhitelistRepository,
};
pub use signals::{ActionCounter, JoinTracker, SettingsCacheTier, SettingsSyncPublisher};
