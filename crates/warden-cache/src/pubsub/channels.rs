//! Settings-sync channel definitions.
//!
//! The dashboard-sync collaborator publishes a (guild, settings family)
//! notification after every settings write; each instance's resolver
//! invalidates its cached copy on receipt.

use serde::{Deserialize, Serialize};

use warden_core::traits::ProtectionFamily;
use warden_core::value_objects::Snowflake;

/// The single Redis channel carrying settings-sync notifications
pub const SYNC_CHANNEL: &str = "warden:settings-sync";

/// One settings-sync notification
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SettingsSyncEvent {
    pub guild_id: Snowflake,
    /// Settings family identifier ("antinuke" | "antiraid")
    pub family: String,
}

impl SettingsSyncEvent {
    /// Create a new sync event
    #[must_use]
    pub fn new(guild_id: Snowflake, family: ProtectionFamily) -> Self {
        Self {
            guild_id,
            family: family.as_str().to_string(),
        }
    }

    /// The parsed family, if recognised
    #[must_use]
    pub fn family(&self) -> Option<ProtectionFamily> {
        ProtectionFamily::parse(&self.family)
    }

    /// Serialize to JSON
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
