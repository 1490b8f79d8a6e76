//! Shared settings cache tier

mod settings_cache;

pub use settings_cache::{RedisSettingsCache, SETTINGS_TTL_SECS};
