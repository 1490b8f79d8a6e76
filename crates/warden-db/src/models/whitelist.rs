//! Whitelist database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for protection_whitelist table
#[derive(Debug, Clone, FromRow)]
pub struct WhitelistModel {
    pub guild_id: i64,
    pub user_id: i64,
    pub added_by: i64,
    pub created_at: DateTime<Utc>,
}
