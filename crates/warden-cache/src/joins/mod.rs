//! Join-flood tracker

mod join_tracker;

pub use join_tracker::{RedisJoinTracker, JOIN_RETENTION_SECS};
