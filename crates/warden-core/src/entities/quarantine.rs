//! Quarantine record entity
//!
//! One record per active sanction. A member holds the quarantine role iff an
//! active record exists; the record is destroyed on release.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Which path created the sanction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QuarantineSource {
    Manual,
    Antinuke,
    Antiraid,
}

impl std::fmt::Display for QuarantineSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Manual => write!(f, "manual"),
            Self::Antinuke => write!(f, "antinuke"),
            Self::Antiraid => write!(f, "antiraid"),
        }
    }
}

impl std::str::FromStr for QuarantineSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "manual" => Ok(Self::Manual),
            "antinuke" => Ok(Self::Antinuke),
            "antiraid" => Ok(Self::Antiraid),
            _ => Err(format!("Invalid quarantine source: {s}")),
        }
    }
}

/// Role snapshot taken before isolating a member
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuarantineRecord {
    pub guild_id: Snowflake,
    pub user_id: Snowflake,
    /// Roles held before isolation, excluding default and quarantine roles
    pub role_ids: Vec<Snowflake>,
    /// `None` means the engine acted on its own
    pub moderator_id: Option<Snowflake>,
    pub reason: Option<String>,
    pub source: QuarantineSource,
    pub created_at: DateTime<Utc>,
}
