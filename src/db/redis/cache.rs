use redis::aio::{ConnectionManager, ConnectionManagerConfig};
use redis::AsyncCommands;
use redis::Client;
use sha2::{Digest, Sha256};
use std::fmt::Display;
use std::time::Duration;
use tokio::sync::mpsc;

use crate::error::AppError;
use crate::error::AppResult;

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    /// Raw generative completion, keyed by model and prompt fingerprint
    Completion { model: String, fingerprint: String },
}

impl CacheKey {
    /// Key for a completion of `prompt` by `model`
    pub fn completion(model: &str, prompt: &str) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(prompt.as_bytes());
        let hash = hasher.finalize();
        CacheKey::Completion {
            model: model.to_string(),
            // First 16 bytes = 32 hex chars
            fingerprint: hex::encode(&hash[..16]),
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Completion { model, fingerprint } => {
                write!(f, "completion:{}:{}", model, fingerprint)
            }
        }
    }
}

/// Creates a Redis client for caching
///
/// The client connects lazily, so an unreachable server only surfaces on first use.
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// Upper bound on a single Redis round trip
const REDIS_TIMEOUT: Duration = Duration::from_secs(1);

/// A completion waiting to be written
struct PendingWrite {
    key: String,
    value: String,
    ttl: u64,
}

/// Redis-backed completion cache
///
/// Reads go straight to Redis; writes are queued to a background task so a
/// slow cache never delays a recommendation response.
#[derive(Clone)]
pub struct Cache {
    conn: ConnectionManager,
    write_tx: mpsc::UnboundedSender<PendingWrite>,
}

/// Stops the background writer after it drained the queue
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
}

impl CacheWriterHandle {
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        tracing::info!("Cache writer shutdown signal sent");
    }
}

impl Cache {
    /// Connects to Redis and spawns the writer task
    pub async fn connect(redis_client: Client) -> AppResult<(Self, CacheWriterHandle)> {
        let config = ConnectionManagerConfig::new()
            .set_connection_timeout(REDIS_TIMEOUT)
            .set_response_timeout(REDIS_TIMEOUT);
        let conn = ConnectionManager::new_with_config(redis_client, config).await?;
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        tokio::spawn(Self::writer_task(conn.clone(), write_rx, shutdown_rx));

        Ok((Self { conn, write_tx }, CacheWriterHandle { shutdown_tx }))
    }

    async fn writer_task(
        conn: ConnectionManager,
        mut write_rx: mpsc::UnboundedReceiver<PendingWrite>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Cache writer task started");

        loop {
            tokio::select! {
                Some(write) = write_rx.recv() => {
                    if let Err(e) = Self::write(conn.clone(), write).await {
                        tracing::error!(error = %e, "Failed to write to Redis cache");
                    }
                }
                _ = shutdown_rx.recv() => {
                    write_rx.close();
                    let mut flushed = 0usize;
                    while let Some(write) = write_rx.recv().await {
                        if let Err(e) = Self::write(conn.clone(), write).await {
                            tracing::error!(error = %e, "Failed to flush cache write during shutdown");
                        } else {
                            flushed += 1;
                        }
                    }
                    tracing::info!(flushed = flushed, "Cache writer task stopped");
                    break;
                }
            }
        }
    }

    async fn write(mut conn: ConnectionManager, write: PendingWrite) -> AppResult<()> {
        let _: () = conn.set_ex(write.key, write.value, write.ttl).await?;
        Ok(())
    }

    /// Reads and deserializes a cached value, `None` on a miss
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.conn.clone();
        let cached: Option<String> = conn.get(key.to_string()).await?;

        cached
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })
            })
            .transpose()
    }

    /// Queues a write and returns immediately; failures are only logged
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let value = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, "Cache serialization error");
                return;
            }
        };

        let write = PendingWrite {
            key: key.to_string(),
            value,
            ttl,
        };

        if let Err(e) = self.write_tx.send(write) {
            tracing::error!(error = %e, "Failed to queue cache write");
        }
    }
}
