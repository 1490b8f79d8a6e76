//! Quarantine record database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for quarantine_records table
#[derive(Debug, Clone, FromRow)]
pub struct QuarantineModel {
    pub guild_id: i64,
    pub user_id: i64,
    /// Role snapshot taken before isolation
    pub role_ids: Vec<i64>,
    pub moderator_id: Option<i64>,
    pub reason: Option<String>,
    /// Sanction source stored as string (manual|antinuke|antiraid)
    pub source: String,
    pub created_at: DateTime<Utc>,
}
