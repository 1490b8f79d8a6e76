//! Error handling utilities for repositories

use sqlx::Error as SqlxError;
use warden_core::error::DomainError;
use warden_core::value_objects::Snowflake;

/// Convert SQLx error to DomainError
pub fn map_db_error(e: SqlxError) -> DomainError {
    DomainError::DatabaseError(e.to_string())
}

/// Check for unique violation and return appropriate error or fallback
pub fn map_unique_violation<F>(e: SqlxError, on_unique: F) -> DomainError
where
    F: FnOnce() -> DomainError,
{
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() {
            return on_unique();
        }
    }
    DomainError::DatabaseError(e.to_string())
}

/// Create a "case not found" error
pub fn case_not_found(guild_id: Snowflake, case_id: i64) -> DomainError {
    DomainError::CaseNotFound { guild_id, case_id }
}

/// Create a "quarantine not found" error
pub fn quarantine_not_found() -> DomainError {
    DomainError::QuarantineNotFound
}

/// Create a "whitelist entry not found" error
pub fn whitelist_entry_not_found() -> DomainError {
    DomainError::WhitelistEntryNotFound
}

/// Map a stored enum string that no longer parses
pub fn corrupt_column(column: &str, value: &str) -> DomainError {
    DomainError::DatabaseError(format!("Unparseable {column} value: {value}"))
}
