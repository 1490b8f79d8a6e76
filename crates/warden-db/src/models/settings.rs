//! Protection settings database models

use chrono::{DateTime, Utc};
use serde_json::Value as JsonValue;
use sqlx::FromRow;

/// Database model for antinuke_settings table
#[derive(Debug, Clone, FromRow)]
pub struct AntinukeSettingsModel {
    pub guild_id: i64,
    pub enabled: bool,
    /// Punishment kind stored as string
    pub punishment: String,
    /// JSON object mapping action kind to {enabled, limit}
    pub policies: JsonValue,
    pub log_channel_id: Option<i64>,
    pub alert_role_id: Option<i64>,
    pub quarantine_role_id: Option<i64>,
    pub mute_role_id: Option<i64>,
    pub revert_changes: bool,
    pub trusted_operators: Vec<i64>,
    pub updated_at: DateTime<Utc>,
}

/// Database model for antiraid_settings table
#[derive(Debug, Clone, FromRow)]
pub struct AntiraidSettingsModel {
    pub guild_id: i64,
    pub enabled: bool,
    pub punishment: String,
    pub mass_join_enabled: bool,
    pub mass_join_threshold: i32,
    pub mass_join_window_seconds: i32,
    pub account_age_enabled: bool,
    pub account_age_min_seconds: i64,
    pub no_avatar_enabled: bool,
    pub log_channel_id: Option<i64>,
    pub alert_role_id: Option<i64>,
    pub updated_at: DateTime<Utc>,
}
