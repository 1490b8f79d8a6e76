//! Settings-sync publisher.
//!
//! Announces a settings write on the sync channel so every other instance
//! invalidates its cached copy.

use async_trait::async_trait;
use redis::AsyncCommands;

use warden_core::traits::{ProtectionFamily, RepoResult, SettingsSyncPublisher};
use warden_core::value_objects::Snowflake;
use warden_core::DomainError;

use crate::pool::RedisPool;
use crate::pubsub::channels::{SettingsSyncEvent, SYNC_CHANNEL};

/// Redis-backed settings-sync publisher
#[derive(Clone)]
pub struct RedisSyncPublisher {
    pool: RedisPool,
}

impl RedisSyncPublisher {
    /// Create a new publisher
    #[must_use]
    pub fn new(pool: RedisPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl SettingsSyncPublisher for RedisSyncPublisher {
    async fn publish(&self, guild_id: Snowflake, family: ProtectionFamily) -> RepoResult<()> {
        let event = SettingsSyncEvent::new(guild_id, family);
        let payload = event
            .to_json()
            .map_err(|e| DomainError::InternalError(e.to_string()))?;

        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|e| DomainError::CacheError(e.to_string()))?;

        let receivers: u32 = conn
            .publish(SYNC_CHANNEL, &payload)
            .await
            .map_err(|e| DomainError::CacheError(e.to_string()))?;

        tracing::debug!(
            guild_id = %guild_id,
            family = %family,
            receivers,
            "Published settings-sync event"
        );

        Ok(())
    }
}
