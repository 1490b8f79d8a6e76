//! Windowed action counter.
//!
//! One distributed counter per (guild, actor, action-kind). The first
//! increment attaches a fixed 30s expiry atomically with the INCR (one Lua
//! round trip); the window is not sliding. When Redis is unreachable the
//! counter degrades to a process-local map bulk-cleared on its own 30s
//! schedule — not shared across instances, lost on restart.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use warden_core::entities::MonitoredAction;
use warden_core::traits::ActionCounter;
use warden_core::value_objects::Snowflake;

use crate::pool::{RedisPool, RedisResult};

/// Key prefix for action counters
const COUNTER_PREFIX: &str = "nukecount:";
/// Fixed counter window (first touch opens it, expiry closes it)
pub const COUNTER_WINDOW_SECS: u64 = 30;

/// INCR with an expiry attached only on first touch, in one atomic step
const INCR_SCRIPT: &str = r"
local count = redis.call('INCR', KEYS[1])
if count == 1 then
  redis.call('EXPIRE', KEYS[1], ARGV[1])
end
return count
";

/// Generate the counter key for a (guild, actor, action) triple
fn counter_key(guild_id: Snowflake, actor_id: Snowflake, action: MonitoredAction) -> String {
    format!("{COUNTER_PREFIX}{guild_id}:{actor_id}:{}", action.as_str())
}

/// Process-local fallback counter.
///
/// No per-key expiry: the whole map is cleared in bulk by the sweeper task.
#[derive(Clone, Default)]
pub struct LocalActionCounter {
    counts: Arc<Mutex<HashMap<String, u64>>>,
}

impl LocalActionCounter {
    /// Create a new local counter
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Increment a key and return the new count
    pub fn increment(&self, key: &str) -> u64 {
        let mut counts = self.counts.lock();
        let count = counts.entry(key.to_string()).or_insert(0);
        *count += 1;
        *count
    }

    /// Drop every count (the sweeper's bulk clear)
    pub fn clear(&self) {
        self.counts.lock().clear();
    }

    /// Number of live keys (diagnostics)
    #[must_use]
    pub fn len(&self) -> usize {
        self.counts.lock().len()
    }

    /// Whether no counts are held
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counts.lock().is_empty()
    }

    /// Spawn the bulk-clear sweeper. Runs until the shutdown signal flips.
    pub fn spawn_sweeper(&self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        let counter = self.clone();
        tokio::spawn(async move {
            let mut interval =
                tokio::time::interval(Duration::from_secs(COUNTER_WINDOW_SECS));
            // The first tick fires immediately; skip it
            interval.tick().await;
            loop {
                tokio::select! {
                    _ = interval.tick() => {
                        counter.clear();
                    }
                    _ = shutdown.changed() => {
                        tracing::debug!("Local counter sweeper shutting down");
                        break;
                    }
                }
            }
        })
    }
}

/// Distributed action counter with process-local fallback
pub struct RedisActionCounter {
    pool: RedisPool,
    script: redis::Script,
    fallback: LocalActionCounter,
}

impl RedisActionCounter {
    /// Create a new counter. The caller is responsible for spawning the
    /// fallback sweeper via [`LocalActionCounter::spawn_sweeper`].
    #[must_use]
    pub fn new(pool: RedisPool, fallback: LocalActionCounter) -> Self {
        Self {
            pool,
            script: redis::Script::new(INCR_SCRIPT),
            fallback,
        }
    }

    /// The process-local fallback counter
    #[must_use]
    pub fn fallback(&self) -> &LocalActionCounter {
        &self.fallback
    }

    async fn try_increment(&self, key: &str) -> RedisResult<u64> {
        let mut conn = self.pool.get().await?;
        let count: i64 = self
            .script
            .key(key)
            .arg(COUNTER_WINDOW_SECS)
            .invoke_async(&mut conn)
            .await?;
        Ok(count.max(0) as u64)
    }
}

#[async_trait]
impl ActionCounter for RedisActionCounter {
    async fn increment(
        &self,
        guild_id: Snowflake,
        actor_id: Snowflake,
        action: MonitoredAction,
    ) -> u64 {
        let key = counter_key(guild_id, actor_id, action);
        match self.try_increment(&key).await {
            Ok(count) => count,
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    guild_id = %guild_id,
                    actor_id = %actor_id,
                    action = %action,
                    "Distributed counter unreachable, using process-local fallback"
                );
                self.fallback.increment(&key)
            }
        }
    }
}
