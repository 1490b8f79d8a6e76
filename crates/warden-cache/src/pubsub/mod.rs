//! Settings-sync pub/sub (dashboard-sync channel)

mod channels;
mod listener;
mod publisher;

pub use channels::{SettingsSyncEvent, SYNC_CHANNEL};
pub use listener::{SyncListener, SyncListenerConfig, SyncListenerError};
pub use publisher::RedisSyncPublisher;
