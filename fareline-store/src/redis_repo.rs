use async_trait::async_trait;
use fareline_core::{CacheError, ResultCache, ResultSet};
use redis::AsyncCommands;
use std::time::Duration;
use tracing::info;

/// Result cache stored as a JSON array under a single Redis key.
/// Expiry is delegated to Redis (`SET ... EX`).
#[derive(Clone)]
pub struct RedisResultCache {
    client: redis::Client,
}

fn backend(err: redis::RedisError) -> CacheError {
    CacheError::Backend(err.to_string())
}

/// Whole seconds for `EX`, rounded up. `EX` rejects 0, so the floor is one second.
fn ttl_seconds(ttl: Duration) -> u64 {
    (ttl.as_secs() + u64::from(ttl.subsec_nanos() > 0)).max(1)
}

impl RedisResultCache {
    pub fn new(connection_string: &str) -> Result<Self, redis::RedisError> {
        let client = redis::Client::open(connection_string)?;
        Ok(Self { client })
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, CacheError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(backend)
    }
}

#[async_trait]
impl ResultCache for RedisResultCache {
    async fn get(&self, key: &str) -> Result<Option<ResultSet>, CacheError> {
        let mut conn = self.connection().await?;
        let payload: Option<String> = conn.get(key).await.map_err(backend)?;

        match payload {
            Some(json) => Ok(Some(serde_json::from_str(&json)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, set: ResultSet, ttl: Duration) -> Result<(), CacheError> {
        let payload = serde_json::to_string(&set)?;
        let ttl_seconds = ttl_seconds(ttl);

        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(key, payload, ttl_seconds)
            .await
            .map_err(backend)?;
        info!("Result set cached: {} ({} results, ttl {}s)", key, set.len(), ttl_seconds);
        Ok(())
    }
}
