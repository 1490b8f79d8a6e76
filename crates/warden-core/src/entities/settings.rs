//! Protection settings entities
//!
//! One antinuke document and one antiraid document per guild. Settings are
//! disabled rather than deleted; a guild with no stored document resolves to
//! the default-disabled value.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// How a detected offender is sanctioned
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PunishmentKind {
    /// Permanent removal with a ban record
    Ban,
    /// Removal without a ban record
    Kick,
    /// Remove every role, member stays
    Strip,
    /// Reversible isolation via the quarantine role
    Quarantine,
}

impl PunishmentKind {
    /// The ledger action a punishment of this kind is recorded as.
    /// Stripping roles leaves the member in place, so it lands as a warn
    /// with the detail carried in the reason.
    #[must_use]
    pub fn case_action(&self) -> crate::entities::CaseAction {
        use crate::entities::CaseAction;
        match self {
            Self::Ban => CaseAction::Ban,
            Self::Kick => CaseAction::Kick,
            Self::Strip => CaseAction::Warn,
            Self::Quarantine => CaseAction::Quarantine,
        }
    }
}

impl std::fmt::Display for PunishmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Ban => write!(f, "ban"),
            Self::Kick => write!(f, "kick"),
            Self::Strip => write!(f, "strip"),
            Self::Quarantine => write!(f, "quarantine"),
        }
    }
}

impl std::str::FromStr for PunishmentKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "ban" => Ok(Self::Ban),
            "kick" => Ok(Self::Kick),
            "strip" => Ok(Self::Strip),
            "quarantine" => Ok(Self::Quarantine),
            _ => Err(format!("Invalid punishment kind: {s}")),
        }
    }
}

/// Administrative action kinds the antinuke engine watches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum MonitoredAction {
    BanMembers,
    KickMembers,
    CreateChannels,
    DeleteChannels,
    CreateRoles,
    DeleteRoles,
    CreateWebhooks,
    MassMention,
    AddBot,
}

impl MonitoredAction {
    /// All monitored action kinds
    pub const ALL: [MonitoredAction; 9] = [
        Self::BanMembers,
        Self::KickMembers,
        Self::CreateChannels,
        Self::DeleteChannels,
        Self::CreateRoles,
        Self::DeleteRoles,
        Self::CreateWebhooks,
        Self::MassMention,
        Self::AddBot,
    ];

    /// Stable identifier used in counter keys and stored policies
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::BanMembers => "ban-members",
            Self::KickMembers => "kick-members",
            Self::CreateChannels => "create-channels",
            Self::DeleteChannels => "delete-channels",
            Self::CreateRoles => "create-roles",
            Self::DeleteRoles => "delete-roles",
            Self::CreateWebhooks => "create-webhooks",
            Self::MassMention => "mass-mention",
            Self::AddBot => "add-bot",
        }
    }
}

impl std::fmt::Display for MonitoredAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Per-action detection policy: whether the action is watched, and how many
/// qualifying events inside one counter window trigger punishment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionPolicy {
    pub enabled: bool,
    pub limit: u32,
}

impl Default for ActionPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            limit: 3,
        }
    }
}

/// Antinuke settings document (one per guild)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AntinukeSettings {
    pub guild_id: Snowflake,
    pub enabled: bool,
    pub punishment: PunishmentKind,
    /// Policies keyed by action; absent actions fall back to the default
    #[serde(default)]
    pub policies: HashMap<MonitoredAction, ActionPolicy>,
    pub log_channel_id: Option<Snowflake>,
    pub alert_role_id: Option<Snowflake>,
    pub quarantine_role_id: Option<Snowflake>,
    pub mute_role_id: Option<Snowflake>,
    /// Undo the offending structural change after punishing
    pub revert_changes: bool,
    /// Non-owner members allowed to configure protection (owner-managed)
    #[serde(default)]
    pub trusted_operators: Vec<Snowflake>,
    pub updated_at: DateTime<Utc>,
}

impl AntinukeSettings {
    /// The value a guild without a stored document resolves to
    #[must_use]
    pub fn default_disabled(guild_id: Snowflake) -> Self {
        Self {
            guild_id,
            enabled: false,
            punishment: PunishmentKind::Quarantine,
            policies: HashMap::new(),
            log_channel_id: None,
            alert_role_id: None,
            quarantine_role_id: None,
            mute_role_id: None,
            revert_changes: false,
            trusted_operators: Vec::new(),
            updated_at: DateTime::<Utc>::MIN_UTC,
        }
    }

    /// Effective policy for an action. `AddBot` always carries a limit of 1:
    /// a single unauthorized bot addition is punished.
    #[must_use]
    pub fn policy(&self, action: MonitoredAction) -> ActionPolicy {
        let mut policy = self.policies.get(&action).copied().unwrap_or_default();
        if action == MonitoredAction::AddBot {
            policy.limit = 1;
        }
        policy
    }

    /// Replace the stored policy for one action
    pub fn set_policy(&mut self, action: MonitoredAction, policy: ActionPolicy) {
        self.policies.insert(action, policy);
    }

    /// Check if a member is a trusted operator
    #[must_use]
    pub fn is_trusted(&self, user_id: Snowflake) -> bool {
        self.trusted_operators.contains(&user_id)
    }

    /// Add a trusted operator (idempotent)
    pub fn add_trusted(&mut self, user_id: Snowflake) {
        if !self.is_trusted(user_id) {
            self.trusted_operators.push(user_id);
        }
    }

    /// Remove a trusted operator
    pub fn remove_trusted(&mut self, user_id: Snowflake) {
        self.trusted_operators.retain(|&id| id != user_id);
    }
}

/// Mass-join detection policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MassJoinPolicy {
    pub enabled: bool,
    /// Joins inside the window that trip raid mitigation
    pub threshold: u32,
    /// Sliding window length; must stay within the tracker's 60s retention
    pub window_seconds: u32,
}

impl Default for MassJoinPolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            threshold: 10,
            window_seconds: 10,
        }
    }
}

/// Minimum-account-age policy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountAgePolicy {
    pub enabled: bool,
    pub min_age_seconds: i64,
}

impl Default for AccountAgePolicy {
    fn default() -> Self {
        Self {
            enabled: false,
            min_age_seconds: 86_400,
        }
    }
}

/// Antiraid settings document (one per guild)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AntiraidSettings {
    pub guild_id: Snowflake,
    pub enabled: bool,
    pub punishment: PunishmentKind,
    #[serde(default)]
    pub mass_join: MassJoinPolicy,
    #[serde(default)]
    pub account_age: AccountAgePolicy,
    /// Punish joiners with neither a global nor a guild avatar
    pub no_avatar_enabled: bool,
    pub log_channel_id: Option<Snowflake>,
    pub alert_role_id: Option<Snowflake>,
    pub updated_at: DateTime<Utc>,
}

impl AntiraidSettings {
    /// The value a guild without a stored document resolves to
    #[must_use]
    pub fn default_disabled(guild_id: Snowflake) -> Self {
        Self {
            guild_id,
            enabled: false,
            punishment: PunishmentKind::Kick,
            mass_join: MassJoinPolicy::default(),
            account_age: AccountAgePolicy::default(),
            no_avatar_enabled: false,
            log_channel_id: None,
            alert_role_id: None,
            updated_at: DateTime::<Utc>::MIN_UTC,
        }
    }
}
