//! # warden-db
//!
//! Database layer implementing the storage ports with PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! This crate provides PostgreSQL implementations for the repository traits
//! defined in `warden-core`. It handles:
//!
//! - Connection pool management
//! - Database models with SQLx `FromRow` derives
//! - Repository implementations, including the atomic per-guild case-id
//!   sequence
//!
//! ## Usage
//!
//! ```rust,ignore
//! use warden_db::pool::{create_pool, DatabaseConfig};
//! use warden_db::repositories::PgCaseRepository;
//! use warden_core::traits::CaseRepository;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = DatabaseConfig::from_env();
//!     let pool = create_pool(&config).await?;
//!     let case_repo = PgCaseRepository::new(pool);
//!
//!     // Use the repository...
//!     Ok(())
//! }
//! ```

pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, create_pool_from_env, DatabaseConfig, PgPool};
pub use repositories::{
    PgAntinukeSettingsRepository, PgAntiraidSettingsRepository, PgCaseRepository,
    PgQuarantineRepository, PgWhitelistRepository,
};
