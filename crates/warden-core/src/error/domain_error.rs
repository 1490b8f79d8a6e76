//! Domain errors - error types for the domain layer

use thiserror::Error;

use crate::value_objects::Snowflake;

/// Domain layer errors
#[derive(Debug, Error)]
pub enum DomainError {
    // =========================================================================
    // Not Found Errors
    // =========================================================================
    #[error("Case {case_id} not found in guild {guild_id}")]
    CaseNotFound {
        guild_id: Snowflake,
        case_id: i64,
    },

    #[error("No active quarantine for this member")]
    QuarantineNotFound,

    #[error("Whitelist entry not found")]
    WhitelistEntryNotFound,

    // =========================================================================
    // Validation Errors
    // =========================================================================
    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("No quarantine role configured")]
    QuarantineRoleMissing,

    // =========================================================================
    // Authorization Errors
    // =========================================================================
    #[error("Not guild owner")]
    NotGuildOwner,

    // =========================================================================
    // Conflict Errors
    // =========================================================================
    #[error("Member is already quarantined")]
    AlreadyQuarantined,

    #[error("Member is already whitelisted")]
    AlreadyWhitelisted,

    // =========================================================================
    // Infrastructure Errors (wrapped)
    // =========================================================================
    #[error("Database error: {0}")]
    DatabaseError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

impl DomainError {
    /// Get an error code string for the presentation layer
    pub fn code(&self) -> &'static str {
        match self {
            Self::CaseNotFound { .. } => "UNKNOWN_CASE",
            Self::QuarantineNotFound => "UNKNOWN_QUARANTINE",
            Self::WhitelistEntryNotFound => "UNKNOWN_WHITELIST_ENTRY",
            Self::ValidationError(_) => "VALIDATION_ERROR",
            Self::QuarantineRoleMissing => "QUARANTINE_ROLE_MISSING",
            Self::NotGuildOwner => "NOT_GUILD_OWNER",
            Self::AlreadyQuarantined => "ALREADY_QUARANTINED",
            Self::AlreadyWhitelisted => "ALREADY_WHITELISTED",
            Self::DatabaseError(_) => "DATABASE_ERROR",
            Self::CacheError(_) => "CACHE_ERROR",
            Self::InternalError(_) => "INTERNAL_ERROR",
        }
    }

    /// Check if this is a "not found" error
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::CaseNotFound { .. } | Self::QuarantineNotFound | Self::WhitelistEntryNotFound
        )
    }

    /// Check if this is a conflict error
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::AlreadyQuarantined | Self::AlreadyWhitelisted)
    }

    /// Check if this error means a storage tier is unreachable (degrade,
    /// don't stop)
    pub fn is_signal_unavailable(&self) -> bool {
        matches!(self, Self::DatabaseError(_) | Self::CacheError(_))
    }
}
