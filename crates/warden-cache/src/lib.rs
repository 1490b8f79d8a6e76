//! # warden-cache
//!
//! Redis caching layer for the protection core's shared, low-latency state.
//!
//! ## Features
//!
//! - **Connection Pool**: Managed Redis connection pool with deadpool
//! - **Action Counter**: fixed-window distributed counter with a
//!   process-local fallback
//! - **Join Tracker**: sliding-window join record plus the raid-mode flag
//! - **Settings Cache**: shared tier of the settings resolver
//! - **Settings Sync**: pub/sub channel invalidating cached settings across
//!   instances
//!
//! ## Example
//!
//! ```ignore
//! use std::sync::Arc;
//! use warden_cache::{LocalActionCounter, RedisActionCounter, RedisPool, RedisPoolConfig};
//! use warden_core::SystemClock;
//!
//! let pool = RedisPool::new(RedisPoolConfig::default())?;
//! let fallback = LocalActionCounter::new();
//! let counter = RedisActionCounter::new(pool.clone(), fallback);
//! let tracker = warden_cache::RedisJoinTracker::new(pool, Arc::new(SystemClock));
//! ```

pub mod counter;
pub mod joins;
pub mod pool;
pub mod pubsub;
pub mod settings;

// Re-export pool types
pub use pool::{
    create_shared_pool, RedisPool, RedisPoolConfig, RedisPoolError, RedisResult, SharedRedisPool,
};

// Re-export counter types
pub use counter::{LocalActionCounter, RedisActionCounter, COUNTER_WINDOW_SECS};

// Re-export join tracker types
pub use joins::{RedisJoinTracker, JOIN_RETENTION_SECS};

// Re-export settings cache types
pub use settings::{RedisSettingsCache, SETTINGS_TTL_SECS};

// Re-export pubsub types
pub use pubsub::{
    RedisSyncPublisher, SettingsSyncEvent, SyncListener, SyncListenerConfig, SyncListenerError,
    SYNC_CHANNEL,
};
