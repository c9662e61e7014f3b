use redis::AsyncCommands;
use redis::Client;
use std::fmt::Display;
use tokio::{sync::mpsc, task::JoinHandle};

use crate::error::AppError;
use crate::error::AppResult;
use crate::models::MediaType;

const KEY_PREFIX: &str = "cinetrack";

/// Namespaced keys for cached catalog responses
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum CacheKey {
    Details(MediaType, i64),
    Search { query: String, page: u32 },
    Trending(MediaType, u32),
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CacheKey::Details(media_type, id) => {
                write!(f, "{}:details:{}:{}", KEY_PREFIX, media_type, id)
            }
            CacheKey::Search { query, page } => write!(
                f,
                "{}:search:{}:{}",
                KEY_PREFIX,
                query.trim().to_lowercase(),
                page
            ),
            CacheKey::Trending(media_type, page) => {
                write!(f, "{}:trending:{}:{}", KEY_PREFIX, media_type, page)
            }
        }
    }
}

/// Creates a Redis client for caching
pub fn create_redis_client(redis_url: &str) -> anyhow::Result<Client> {
    let client = Client::open(redis_url)?;
    Ok(client)
}

/// A serialized value queued for writing
struct PendingWrite {
    key: String,
    value: String,
    ttl: u64,
}

/// Read-through cache over Redis with fire-and-forget writes
#[derive(Clone)]
pub struct Cache {
    redis_client: Client,
    write_tx: mpsc::UnboundedSender<PendingWrite>,
}

/// Owns the background writer; call [`CacheWriterHandle::shutdown`] to flush it
pub struct CacheWriterHandle {
    shutdown_tx: mpsc::Sender<()>,
    task: JoinHandle<()>,
}

impl CacheWriterHandle {
    /// Stops accepting writes, flushes the queue and waits for the writer to exit
    pub async fn shutdown(self) {
        let _ = self.shutdown_tx.send(()).await;
        if let Err(e) = self.task.await {
            tracing::error!(error = %e, "Cache writer task panicked");
        }
    }
}

impl Cache {
    /// Creates the cache and spawns its writer task
    pub fn new(redis_client: Client) -> (Self, CacheWriterHandle) {
        let (write_tx, write_rx) = mpsc::unbounded_channel();
        let (shutdown_tx, shutdown_rx) = mpsc::channel(1);

        let task = tokio::spawn(Self::run_writer(
            redis_client.clone(),
            write_rx,
            shutdown_rx,
        ));

        (
            Self {
                redis_client,
                write_tx,
            },
            CacheWriterHandle { shutdown_tx, task },
        )
    }

    async fn run_writer(
        client: Client,
        mut write_rx: mpsc::UnboundedReceiver<PendingWrite>,
        mut shutdown_rx: mpsc::Receiver<()>,
    ) {
        tracing::info!("Cache writer started");

        loop {
            tokio::select! {
                Some(write) = write_rx.recv() => Self::write(&client, write).await,
                _ = shutdown_rx.recv() => break,
            }
        }

        // Senders live in every Cache clone, so close explicitly before draining.
        write_rx.close();
        let mut flushed = 0usize;
        while let Some(write) = write_rx.recv().await {
            Self::write(&client, write).await;
            flushed += 1;
        }

        tracing::info!(flushed, "Cache writer stopped");
    }

    async fn write(client: &Client, write: PendingWrite) {
        let result: AppResult<()> = async {
            let mut conn = client.get_multiplexed_async_connection().await?;
            let _: () = conn.set_ex(&write.key, write.value, write.ttl).await?;
            Ok(())
        }
        .await;

        if let Err(e) = result {
            tracing::warn!(error = %e, key = %write.key, "Cache write failed");
        }
    }

    /// Looks up and deserializes a cached value. `None` on a miss.
    pub async fn get_from_cache<T: serde::de::DeserializeOwned>(
        &self,
        key: &CacheKey,
    ) -> AppResult<Option<T>> {
        let mut conn = self.redis_client.get_multiplexed_async_connection().await?;
        let cached: Option<String> = conn.get(key.to_string()).await?;

        cached
            .map(|json| {
                serde_json::from_str(&json).map_err(|e| {
                    AppError::Internal(format!("Cache deserialization error: {}", e))
                })
            })
            .transpose()
    }

    /// Queues a value for writing and returns immediately.
    ///
    /// Failures are logged by the writer and never reach the caller.
    pub fn set_in_background<T: serde::Serialize>(&self, key: &CacheKey, value: &T, ttl: u64) {
        let value = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!(error = %e, key = %key, "Cache serialization error");
                return;
            }
        };

        let write = PendingWrite {
            key: key.to_string(),
            value,
            ttl,
        };

        if self.write_tx.send(write).is_err() {
            tracing::warn!(key = %key, "Cache writer is shut down, dropping write");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_details_key() {
        let key = CacheKey::Details(MediaType::Movie, 603);
        assert_eq!(key.to_string(), "cinetrack:details:movie:603");
    }

    #[test]
    fn test_search_key_normalizes_query() {
        let key = CacheKey::Search {
            query: "  The MATRIX ".to_string(),
            page: 2,
        };
        assert_eq!(key.to_string(), "cinetrack:search:the matrix:2");
    }

    #[test]
    fn test_trending_key() {
        let key = CacheKey::Trending(MediaType::Tv, 1);
        assert_eq!(key.to_string(), "cinetrack:trending:tv:1");
    }

    #[tokio::test]
    async fn test_set_after_shutdown_is_dropped_quietly() {
        // Client::open only parses the URL; no server is contacted here.
        let client = create_redis_client("redis://127.0.0.1:1").unwrap();
        let (cache, handle) = Cache::new(client);

        handle.shutdown().await;

        cache.set_in_background(&CacheKey::Trending(MediaType::Movie, 1), &vec![1, 2], 60);
    }
}
