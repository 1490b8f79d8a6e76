//! Protection events - the platform notifications the engines consume
//!
//! These arrive from the platform collaborator as async notifications; each
//! is delivered at most once per occurrence. Structural events carry only
//! ids — attribution to the member who performed them goes through the
//! audit-trail correlator.

use serde::{Deserialize, Serialize};

use crate::value_objects::Snowflake;

/// A platform event relevant to the protection engines
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ProtectionEvent {
    /// A member (or bot) joined the guild
    MemberJoined {
        guild_id: Snowflake,
        user_id: Snowflake,
        is_bot: bool,
        /// True when the account has a global or guild-specific avatar
        has_avatar: bool,
    },
    /// The platform's generic "member banned" notification; fires for
    /// engine-issued and manual bans alike
    MemberBanned {
        guild_id: Snowflake,
        user_id: Snowflake,
    },
    MemberUnbanned {
        guild_id: Snowflake,
        user_id: Snowflake,
    },
    /// Member left or was kicked; the audit log tells which
    MemberRemoved {
        guild_id: Snowflake,
        user_id: Snowflake,
    },
    ChannelCreated {
        guild_id: Snowflake,
        channel_id: Snowflake,
    },
    ChannelDeleted {
        guild_id: Snowflake,
        channel_id: Snowflake,
    },
    RoleCreated {
        guild_id: Snowflake,
        role_id: Snowflake,
    },
    RoleDeleted {
        guild_id: Snowflake,
        role_id: Snowflake,
    },
    WebhookCreated {
        guild_id: Snowflake,
        channel_id: Snowflake,
        webhook_id: Snowflake,
    },
    /// A message was posted; only the structural mention count matters here
    MessageCreated {
        guild_id: Snowflake,
        channel_id: Snowflake,
        author_id: Snowflake,
        /// Distinct user mentions in the message
        mention_count: u32,
    },
}

impl ProtectionEvent {
    /// Guild the event belongs to
    #[must_use]
    pub fn guild_id(&self) -> Snowflake {
        match self {
            Self::MemberJoined { guild_id, .. }
            | Self::MemberBanned { guild_id, .. }
            | Self::MemberUnbanned { guild_id, .. }
            | Self::MemberRemoved { guild_id, .. }
            | Self::ChannelCreated { guild_id, .. }
            | Self::ChannelDeleted { guild_id, .. }
            | Self::RoleCreated { guild_id, .. }
            | Self::RoleDeleted { guild_id, .. }
            | Self::WebhookCreated { guild_id, .. }
            | Self::MessageCreated { guild_id, .. } => *guild_id,
        }
    }
}
