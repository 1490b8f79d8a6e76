//! Shared settings cache tier.
//!
//! The middle tier of the settings resolver: JSON documents keyed by
//! protection family and guild, with a TTL so a missed invalidation can
//! only go stale for so long.

use async_trait::async_trait;

use warden_core::traits::{ProtectionFamily, RepoResult, SettingsCacheTier};
use warden_core::value_objects::Snowflake;
use warden_core::DomainError;

use crate::pool::{RedisPool, RedisPoolError};

/// Key prefix for cached settings documents
const SETTINGS_PREFIX: &str = "protection:";
/// Default TTL for cached settings
pub const SETTINGS_TTL_SECS: u64 = 300;

fn settings_key(family: ProtectionFamily, guild_id: Snowflake) -> String {
    format!("{SETTINGS_PREFIX}{family}:{guild_id}")
}

fn map_cache_error(e: RedisPoolError) -> DomainError {
    DomainError::CacheError(e.to_string())
}

/// Redis-backed shared settings tier
#[derive(Clone)]
pub struct RedisSettingsCache {
    pool: RedisPool,
    ttl_seconds: u64,
}

impl RedisSettingsCache {
    /// Create a cache with the default TTL
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self {
            pool,
            ttl_seconds: SETTINGS_TTL_SECS,
        }
    }

    /// Create a cache with a custom TTL
    #[must_use]
    pub fn with_ttl(pool: RedisPool, ttl_seconds: u64) -> Self {
        Self { pool, ttl_seconds }
    }
}

#[async_trait]
impl SettingsCacheTier for RedisSettingsCache {
    async fn read(
        &self,
        family: ProtectionFamily,
        guild_id: Snowflake,
    ) -> RepoResult<Option<serde_json::Value>> {
        self.pool
            .get_value(&settings_key(family, guild_id))
            .await
            .map_err(map_cache_error)
    }

    async fn write(
        &self,
        family: ProtectionFamily,
        guild_id: Snowflake,
        value: &serde_json::Value,
    ) -> RepoResult<()> {
        self.pool
            .set(&settings_key(family, guild_id), value, Some(self.ttl_seconds))
            .await
            .map_err(map_cache_error)
    }

    async fn remove(&self, family: ProtectionFamily, guild_id: Snowflake) -> RepoResult<()> {
        self.pool
            .delete(&settings_key(family, guild_id))
            .await
            .map_err(map_cache_error)?;
        Ok(())
    }
}
