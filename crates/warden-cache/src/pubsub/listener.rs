//! Settings-sync listener.
//!
//! Background task holding a dedicated Redis pub/sub connection. Received
//! sync events are forwarded over an mpsc channel to whoever wires them to
//! the resolvers. Reconnects with a delay on connection loss.

use std::time::Duration;

use futures_util::StreamExt;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;

use crate::pubsub::channels::{SettingsSyncEvent, SYNC_CHANNEL};

/// Listener configuration
#[derive(Debug, Clone)]
pub struct SyncListenerConfig {
    /// Redis connection URL
    pub redis_url: String,
    /// Reconnection delay in milliseconds
    pub reconnect_delay_ms: u64,
}

impl Default for SyncListenerConfig {
    fn default() -> Self {
        Self {
            redis_url: "redis://127.0.0.1:6379".to_string(),
            reconnect_delay_ms: 1000,
        }
    }
}

/// Error type for listener operations
#[derive(Debug, thiserror::Error)]
pub enum SyncListenerError {
    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("Forward channel closed")]
    ChannelClosed,
}

/// Background settings-sync listener
pub struct SyncListener {
    config: SyncListenerConfig,
}

impl SyncListener {
    /// Create a listener for the given Redis URL
    #[must_use]
    pub fn new(config: SyncListenerConfig) -> Self {
        Self { config }
    }

    /// Spawn the listener loop. Events arrive on `events_tx`; the task ends
    /// when the shutdown signal flips or the forward channel closes.
    pub fn spawn(
        self,
        events_tx: mpsc::Sender<SettingsSyncEvent>,
        mut shutdown: watch::Receiver<bool>,
    ) -> JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                match Self::run_listener(&self.config, &events_tx, &mut shutdown).await {
                    Ok(()) => {
                        tracing::info!("Settings-sync listener shutting down");
                        break;
                    }
                    Err(SyncListenerError::ChannelClosed) => {
                        tracing::info!("Settings-sync forward channel closed, stopping");
                        break;
                    }
                    Err(e) => {
                        tracing::error!(error = %e, "Settings-sync listener error, reconnecting...");
                        tokio::time::sleep(Duration::from_millis(
                            self.config.reconnect_delay_ms,
                        ))
                        .await;
                    }
                }
            }
        })
    }

    /// One connection's worth of listening; returns Ok on clean shutdown
    async fn run_listener(
        config: &SyncListenerConfig,
        events_tx: &mpsc::Sender<SettingsSyncEvent>,
        shutdown: &mut watch::Receiver<bool>,
    ) -> Result<(), SyncListenerError> {
        let client = redis::Client::open(config.redis_url.as_str())?;
        let mut pubsub = client.get_async_pubsub().await?;
        pubsub.subscribe(SYNC_CHANNEL).await?;

        tracing::info!(channel = SYNC_CHANNEL, "Settings-sync listener connected");

        let mut stream = pubsub.on_message();
        loop {
            tokio::select! {
                message = stream.next() => {
                    let Some(message) = message else {
                        return Err(SyncListenerError::Redis(redis::RedisError::from((
                            redis::ErrorKind::IoError,
                            "pub/sub stream ended",
                        ))));
                    };

                    let payload: String = message.get_payload()?;
                    match serde_json::from_str::<SettingsSyncEvent>(&payload) {
                        Ok(event) => {
                            if events_tx.send(event).await.is_err() {
                                return Err(SyncListenerError::ChannelClosed);
                            }
                        }
                        Err(e) => {
                            tracing::warn!(error = %e, "Discarding malformed sync payload");
                        }
                    }
                }
                _ = shutdown.changed() => {
                    return Ok(());
                }
            }
        }
    }
}
