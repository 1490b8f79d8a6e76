//! Windowed action counter

mod action_counter;

pub use action_counter::{
    LocalActionCounter, RedisActionCounter, COUNTER_WINDOW_SECS,
};
