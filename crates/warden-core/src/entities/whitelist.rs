//! Whitelist entry entity

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// A (guild, member) pair exempt from automated punishment.
///
/// The guild owner is implicitly exempt and never stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WhitelistEntry {
    pub guild_id: Snowflake,
    pub user_id: Snowflake,
    pub added_by: Snowflake,
    pub created_at: DateTime<Utc>,
}

impl WhitelistEntry {
    /// Create a new whitelist entry
    #[must_use]
    pub fn new(guild_id: Snowflake, user_id: Snowflake, added_by: Snowflake) -> Self {
        Self {
            guild_id,
            user_id,
            added_by,
            created_at: Utc::now(),
        }
    }
}
