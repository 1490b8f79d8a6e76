//! Moderation case database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;

/// Database model for moderation_cases table
#[derive(Debug, Clone, FromRow)]
pub struct CaseModel {
    pub guild_id: i64,
    pub case_id: i64,
    pub target_id: i64,
    /// NULL means the engine acted on its own
    pub moderator_id: Option<i64>,
    /// Case action stored as string
    pub action: String,
    pub reason: Option<String>,
    pub edited_by: Option<i64>,
    pub edited_at: Option<DateTime<Utc>>,
    pub duration_seconds: Option<i64>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}
