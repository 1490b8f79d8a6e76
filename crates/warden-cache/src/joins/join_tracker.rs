//! Join-flood tracker.
//!
//! Per-guild sorted set of recent joins scored by join time, trimmed to a
//! rolling 60s retention on every write. `recent_joins` is a true sliding
//! window range query. Raid mode is a separate flag with its own
//! independent expiry.

use std::sync::Arc;

use async_trait::async_trait;
use redis::AsyncCommands;

use warden_core::traits::{JoinTracker, RepoResult};
use warden_core::value_objects::{Clock, Snowflake};
use warden_core::DomainError;

use crate::pool::{RedisPool, RedisPoolError};

/// Key prefix for per-guild join windows
const JOIN_PREFIX: &str = "joinflood:";
/// Key prefix for raid-mode flags
const RAID_PREFIX: &str = "raidmode:";
/// Rolling retention of the join window; `recent_joins` windows must stay
/// within it
pub const JOIN_RETENTION_SECS: i64 = 60;

fn join_key(guild_id: Snowflake) -> String {
    format!("{JOIN_PREFIX}{guild_id}")
}

fn raid_key(guild_id: Snowflake) -> String {
    format!("{RAID_PREFIX}{guild_id}")
}

fn map_cache_error(e: RedisPoolError) -> DomainError {
    DomainError::CacheError(e.to_string())
}

/// Redis-backed join tracker
#[derive(Clone)]
pub struct RedisJoinTracker {
    pool: RedisPool,
    clock: Arc<dyn Clock>,
}

impl RedisJoinTracker {
    /// Create a new tracker
    #[must_use]
    pub fn new(pool: RedisPool, clock: Arc<dyn Clock>) -> Self {
        Self { pool, clock }
    }

    fn now_millis(&self) -> i64 {
        self.clock.now().timestamp_millis()
    }
}

#[async_trait]
impl JoinTracker for RedisJoinTracker {
    async fn record_join(&self, guild_id: Snowflake, user_id: Snowflake) -> RepoResult<()> {
        let key = join_key(guild_id);
        let now_ms = self.now_millis();
        let horizon = now_ms - JOIN_RETENTION_SECS * 1000;

        let mut conn = self.pool.get().await.map_err(map_cache_error)?;

        // Add, trim expired entries, refresh the key's own expiry
        let _: () = conn
            .zadd(&key, user_id.to_string(), now_ms)
            .await
            .map_err(RedisPoolError::from)
            .map_err(map_cache_error)?;
        let _: () = conn
            .zrembyscore(&key, 0, horizon)
            .await
            .map_err(RedisPoolError::from)
            .map_err(map_cache_error)?;
        let _: () = conn
            .expire(&key, JOIN_RETENTION_SECS)
            .await
            .map_err(RedisPoolError::from)
            .map_err(map_cache_error)?;

        tracing::trace!(guild_id = %guild_id, user_id = %user_id, "Recorded join");

        Ok(())
    }

    async fn recent_joins(
        &self,
        guild_id: Snowflake,
        window_seconds: u32,
    ) -> RepoResult<Vec<Snowflake>> {
        let key = join_key(guild_id);
        let cutoff = self.now_millis() - i64::from(window_seconds) * 1000;

        let mut conn = self.pool.get().await.map_err(map_cache_error)?;
        let members: Vec<String> = conn
            .zrangebyscore(&key, cutoff, "+inf")
            .await
            .map_err(RedisPoolError::from)
            .map_err(map_cache_error)?;

        Ok(members
            .into_iter()
            .filter_map(|id| id.parse::<i64>().ok().map(Snowflake::new))
            .collect())
    }

    async fn clear(&self, guild_id: Snowflake) -> RepoResult<()> {
        self.pool
            .delete(&join_key(guild_id))
            .await
            .map_err(map_cache_error)?;
        Ok(())
    }

    async fn is_raid_mode(&self, guild_id: Snowflake) -> RepoResult<bool> {
        self.pool
            .exists(&raid_key(guild_id))
            .await
            .map_err(map_cache_error)
    }

    async fn set_raid_mode(&self, guild_id: Snowflake, duration_seconds: u32) -> RepoResult<()> {
        self.pool
            .set(&raid_key(guild_id), &1u8, Some(u64::from(duration_seconds)))
            .await
            .map_err(map_cache_error)?;

        tracing::info!(
            guild_id = %guild_id,
            duration_seconds,
            "Raid mode activated"
        );

        Ok(())
    }
}
