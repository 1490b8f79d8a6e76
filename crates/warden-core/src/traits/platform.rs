//! Platform client trait (port) - the chat platform collaborator
//!
//! Everything the engines ask of the platform goes through this port: member
//! sanctions, role mutation, structural deletes for revert, the on-demand
//! audit-log query, and log/DM delivery. The presentation layer owns the
//! concrete implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::entities::{CaseAction, ModerationCase};
use crate::value_objects::Snowflake;

/// Errors surfaced by the platform collaborator
#[derive(Debug, Error)]
pub enum PlatformError {
    /// The platform refused the mutation (missing permission, role
    /// hierarchy). Logged, never auto-retried.
    #[error("Platform rejected the request: {0}")]
    Rejected(String),

    /// The referenced object no longer exists
    #[error("Platform object not found: {0}")]
    NotFound(String),

    /// The platform or transport is unreachable
    #[error("Platform unavailable: {0}")]
    Unavailable(String),
}

impl PlatformError {
    /// True for permission/hierarchy refusals, the "logged failed action"
    /// branch of the error taxonomy
    #[must_use]
    pub fn is_rejection(&self) -> bool {
        matches!(self, Self::Rejected(_))
    }
}

/// Result type for platform operations
pub type PlatformResult<T> = Result<T, PlatformError>;

/// Audit-log action kinds the correlator queries by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    MemberBan,
    MemberKick,
    ChannelCreate,
    ChannelDelete,
    RoleCreate,
    RoleDelete,
    WebhookCreate,
    BotAdd,
}

impl AuditAction {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::MemberBan => "member_ban",
            Self::MemberKick => "member_kick",
            Self::ChannelCreate => "channel_create",
            Self::ChannelDelete => "channel_delete",
            Self::RoleCreate => "role_create",
            Self::RoleDelete => "role_delete",
            Self::WebhookCreate => "webhook_create",
            Self::BotAdd => "bot_add",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry from the platform's audit log
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditEntry {
    pub actor_id: Snowflake,
    pub target_id: Option<Snowflake>,
    pub action: AuditAction,
    pub created_at: DateTime<Utc>,
}

/// Structured log notification delivered to a guild's log channel
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogNotification {
    pub action: CaseAction,
    pub target_id: Snowflake,
    /// `None` renders as "automated"
    pub moderator_id: Option<Snowflake>,
    pub reason: String,
    pub duration_seconds: Option<i64>,
    pub case_id: Option<i64>,
}

impl LogNotification {
    /// Build the notification for a ledger entry
    #[must_use]
    pub fn from_case(case: &ModerationCase) -> Self {
        Self {
            action: case.action,
            target_id: case.target_id,
            moderator_id: case.moderator_id,
            reason: case
                .reason
                .clone()
                .unwrap_or_else(|| "No reason provided".to_string()),
            duration_seconds: case.duration_seconds,
            case_id: Some(case.case_id),
        }
    }
}

/// The chat platform collaborator
#[async_trait]
pub trait PlatformClient: Send + Sync {
    /// The engine's own account id (never counted, never punished)
    fn bot_user_id(&self) -> Snowflake;

    /// Owner of a guild (implicitly exempt everywhere)
    async fn guild_owner(&self, guild_id: Snowflake) -> PlatformResult<Snowflake>;

    /// Role ids a member currently holds, excluding the default role
    async fn member_role_ids(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
    ) -> PlatformResult<Vec<Snowflake>>;

    /// Replace a member's role set in one call
    async fn set_member_roles(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        role_ids: &[Snowflake],
    ) -> PlatformResult<()>;

    /// Roles that still exist and sit below the engine's own top role
    /// (eligible for snapshot restore)
    async fn manageable_role_ids(&self, guild_id: Snowflake) -> PlatformResult<Vec<Snowflake>>;

    async fn ban_member(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        reason: &str,
    ) -> PlatformResult<()>;

    async fn kick_member(
        &self,
        guild_id: Snowflake,
        user_id: Snowflake,
        reason: &str,
    ) -> PlatformResult<()>;

    async fn delete_channel(&self, guild_id: Snowflake, channel_id: Snowflake)
        -> PlatformResult<()>;

    async fn delete_role(&self, guild_id: Snowflake, role_id: Snowflake) -> PlatformResult<()>;

    async fn delete_webhook(&self, guild_id: Snowflake, webhook_id: Snowflake)
        -> PlatformResult<()>;

    /// Most recent audit entries for one action kind, newest first
    async fn recent_audit_entries(
        &self,
        guild_id: Snowflake,
        action: AuditAction,
        limit: u8,
    ) -> PlatformResult<Vec<AuditEntry>>;

    /// Best-effort direct message; failure never blocks a punishment
    async fn direct_message(&self, user_id: Snowflake, content: &str) -> PlatformResult<()>;

    /// Deliver a structured log notification to a guild's log channel,
    /// optionally mentioning the alert role
    async fn send_log(
        &self,
        guild_id: Snowflake,
        channel_id: Snowflake,
        notification: &LogNotification,
        alert_role_id: Option<Snowflake>,
    ) -> PlatformResult<()>;

    /// Deliver a plain alert line (raid detected, could-not-act) to a
    /// guild's log channel
    async fn send_alert(
        &self,
        guild_id: Snowflake,
        channel_id: Snowflake,
        content: &str,
        alert_role_id: Option<Snowflake>,
    ) -> PlatformResult<()>;

    /// Create a role for quarantine/mute provisioning
    async fn create_role(&self, guild_id: Snowflake, name: &str) -> PlatformResult<Snowflake>;

    /// Deny the given role's send/connect permissions in every channel
    /// (bulk setup during quarantine-role provisioning)
    async fn deny_role_in_all_channels(
        &self,
        guild_id: Snowflake,
        role_id: Snowflake,
    ) -> PlatformResult<()>;
}
