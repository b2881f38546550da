//! Redis-backed redirect cache.

use super::service::{CacheError, CacheResult, CacheService};
use async_trait::async_trait;
use redis::{AsyncCommands, Client, aio::ConnectionManager};
use tracing::{debug, info, warn};

const KEY_PREFIX: &str = "shortlink:url:";

/// Redis cache of short code to target URL.
///
/// `ConnectionManager` multiplexes one connection and reconnects on its own.
/// Errors are returned to the caller, which treats them as misses.
pub struct RedisCache {
    conn: ConnectionManager,
    ttl_seconds: u64,
}

impl RedisCache {
    /// Connects and verifies the connection with a `PING`.
    ///
    /// # Errors
    ///
    /// Returns [`CacheError::Connection`] if the URL is invalid or Redis
    /// cannot be reached.
    pub async fn connect(redis_url: &str, ttl_seconds: u64) -> CacheResult<Self> {
        let client = Client::open(redis_url)
            .map_err(|e| CacheError::Connection(format!("Invalid Redis URL: {}", e)))?;

        let mut conn = ConnectionManager::new(client)
            .await
            .map_err(|e| CacheError::Connection(format!("Failed to connect to Redis: {}", e)))?;

        conn.ping::<()>()
            .await
            .map_err(|e| CacheError::Connection(format!("Redis PING failed: {}", e)))?;

        info!("Connected to Redis (TTL {}s)", ttl_seconds);

        Ok(Self { conn, ttl_seconds })
    }
}

fn cache_key(short_code: &str) -> String {
    format!("{KEY_PREFIX}{short_code}")
}

#[async_trait]
impl CacheService for RedisCache {
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>> {
        let mut conn = self.conn.clone();

        let cached = conn
            .get::<_, Option<String>>(cache_key(short_code))
            .await
            .map_err(|e| CacheError::Operation(e.to_string()))?;

        match &cached {
            Some(_) => debug!("Cache hit: {}", short_code),
            None => debug!("Cache miss: {}", short_code),
        }

        Ok(cached)
    }

    async fn set_url(&self, short_code: &str, target_url: &str) -> CacheResult<()> {
        let mut conn = self.conn.clone();

        conn.set_ex::<_, _, ()>(cache_key(short_code), target_url, self.ttl_seconds)
            .await
            .map_err(|e| {
                warn!("Redis SET failed for {}: {}", short_code, e);
                CacheError::Operation(e.to_string())
            })
    }

    async fn health_check(&self) -> bool {
        let mut conn = self.conn.clone();
        conn.ping::<()>().await.is_ok()
    }

    fn backend(&self) -> &'static str {
        "redis"
    }
}
