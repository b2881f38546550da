//! Repository trait for the short link mapping store.

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::error::AppError;
use async_trait::async_trait;

/// Result of an atomic insert-if-absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    /// The code was free and the mapping is now stored.
    Inserted(ShortLink),
    /// The code is already taken; the existing mapping was left untouched.
    Collision,
}

/// The mapping store: sole owner and arbiter of short link records.
///
/// Every operation on a single short code is linearizable with respect to
/// other operations on that code. Operations on different codes must not
/// serialize behind a store-wide lock.
///
/// # Implementations
///
/// - [`crate::infrastructure::persistence::MemoryLinkRepository`] - sharded in-process store
/// - [`crate::infrastructure::persistence::PgLinkRepository`] - PostgreSQL implementation
/// - Test mocks available with `cfg(test)`
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait LinkRepository: Send + Sync {
    /// Atomically stores `new_link` unless its short code already exists.
    ///
    /// Never overwrites an existing mapping.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::Internal`] on storage errors. Nothing is persisted
    /// unless [`InsertOutcome::Inserted`] is returned.
    async fn insert_if_absent(&self, new_link: NewShortLink) -> Result<InsertOutcome, AppError>;

    /// Finds a link by its short code.
    ///
    /// # Returns
    ///
    /// - `Ok(Some(ShortLink))` if found
    /// - `Ok(None)` if not found
    async fn lookup(&self, short_code: &str) -> Result<Option<ShortLink>, AppError>;

    /// Finds a link by its store-assigned id.
    async fn find_by_id(&self, id: i64) -> Result<Option<ShortLink>, AppError>;

    /// Atomically adds `delta` to the click counter of `short_code`.
    ///
    /// Returns the new counter value, or `Ok(None)` if the code does not exist.
    async fn add_clicks(&self, short_code: &str, delta: u64) -> Result<Option<u64>, AppError>;

    /// Atomically increments the click counter of `short_code` by one.
    async fn increment_clicks(&self, short_code: &str) -> Result<Option<u64>, AppError> {
        self.add_clicks(short_code, 1).await
    }

    /// Lists up to `limit` links, newest first.
    async fn list(&self, limit: usize) -> Result<Vec<ShortLink>, AppError>;

    /// Counts stored links.
    async fn count(&self) -> Result<u64, AppError>;

    /// Returns `true` when the backing storage is reachable.
    async fn health_check(&self) -> bool;

    /// Returns `true` if records outlive the process.
    ///
    /// A shared redirect cache may only front a durable store: a volatile
    /// store starts empty after a restart and can reissue codes the cache
    /// still maps to old targets.
    fn is_durable(&self) -> bool;
}
