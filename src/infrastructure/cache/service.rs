//! Redirect cache contract.

use async_trait::async_trait;

/// Errors reported by a cache backend.
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    #[error("Cache connection error: {0}")]
    Connection(String),

    #[error("Cache operation error: {0}")]
    Operation(String),
}

pub type CacheResult<T> = Result<T, CacheError>;

/// Read-through cache of short code to target URL.
///
/// Entries never need invalidation: a mapping is immutable once created,
/// so a cached target is correct for as long as it lives. The cache is never
/// the source of truth and callers fall back to the store on any error.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait CacheService: Send + Sync {
    /// Cached target URL for `short_code`, or `Ok(None)` on a miss.
    async fn get_url(&self, short_code: &str) -> CacheResult<Option<String>>;

    /// Caches `target_url` under `short_code` with the backend's default TTL.
    async fn set_url(&self, short_code: &str, target_url: &str) -> CacheResult<()>;

    /// Returns `true` when the backend answers.
    async fn health_check(&self) -> bool;

    /// Short backend name reported by the health endpoint.
    fn backend(&self) -> &'static str;
}
