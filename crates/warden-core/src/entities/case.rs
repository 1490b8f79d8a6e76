//! Moderation case entity
//!
//! Append-only, per-guild sequentially-numbered record of every moderation
//! action, automated or manual. Immutable except for the reason; deletable
//! only through the administrator-only delete operation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// Kind of moderation action a case records
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CaseAction {
    Warn,
    Kick,
    Ban,
    Unban,
    Softban,
    Timeout,
    Untimeout,
    Quarantine,
    Unquarantine,
    Note,
}

impl CaseAction {
    /// Stable identifier used in storage and log notifications
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Kick => "kick",
            Self::Ban => "ban",
            Self::Unban => "unban",
            Self::Softban => "softban",
            Self::Timeout => "timeout",
            Self::Untimeout => "untimeout",
            Self::Quarantine => "quarantine",
            Self::Unquarantine => "unquarantine",
            Self::Note => "note",
        }
    }
}

impl std::fmt::Display for CaseAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CaseAction {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "warn" => Ok(Self::Warn),
            "kick" => Ok(Self::Kick),
            "ban" => Ok(Self::Ban),
            "unban" => Ok(Self::Unban),
            "softban" => Ok(Self::Softban),
            "timeout" => Ok(Self::Timeout),
            "untimeout" => Ok(Self::Untimeout),
            "quarantine" => Ok(Self::Quarantine),
            "unquarantine" => Ok(Self::Unquarantine),
            "note" => Ok(Self::Note),
            _ => Err(format!("Invalid case action: {s}")),
        }
    }
}

/// One entry in the case ledger
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModerationCase {
    pub guild_id: Snowflake,
    /// Per-guild monotonically increasing id, never reused
    pub case_id: i64,
    pub target_id: Snowflake,
    /// `None` means the engine acted on its own
    pub moderator_id: Option<Snowflake>,
    pub action: CaseAction,
    pub reason: Option<String>,
    pub edited_by: Option<Snowflake>,
    pub edited_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl ModerationCase {
    /// Whether the case was created by the protection engines
    #[must_use]
    pub fn is_automated(&self) -> bool {
        self.moderator_id.is_none()
    }

    /// Moderator label for log output
    #[must_use]
    pub fn moderator_label(&self) -> String {
        match self.moderator_id {
            Some(id) => id.to_string(),
            None => "automated".to_string(),
        }
    }
}

/// Input for creating a case; the ledger assigns `case_id` and `created_at`
#[derive(Debug, Clone)]
pub struct NewCase {
    pub guild_id: Snowflake,
    pub target_id: Snowflake,
    pub moderator_id: Option<Snowflake>,
    pub action: CaseAction,
    pub reason: Option<String>,
    pub duration_seconds: Option<i64>,
}

impl NewCase {
    /// A case written by the engines themselves
    #[must_use]
    pub fn automated(
        guild_id: Snowflake,
        target_id: Snowflake,
        action: CaseAction,
        reason: impl Into<String>,
    ) -> Self {
        Self {
            guild_id,
            target_id,
            moderator_id: None,
            action,
            reason: Some(reason.into()),
            duration_seconds: None,
        }
    }
}
