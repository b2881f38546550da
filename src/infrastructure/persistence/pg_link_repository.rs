//! PostgreSQL implementation of link repository.

use async_trait::async_trait;
use sqlx::PgPool;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;
use tokio_retry::RetryIf;
use tokio_retry::strategy::{ExponentialBackoff, jitter};

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::{InsertOutcome, LinkRepository};
use crate::error::AppError;

const MAX_RETRY_DELAY: Duration = Duration::from_secs(1);

#[derive(Debug, sqlx::FromRow)]
struct ShortLinkRow {
    id: i64,
    short_code: String,
    target_url: String,
    clicks: i64,
}

impl From<ShortLinkRow> for ShortLink {
    fn from(row: ShortLinkRow) -> Self {
        ShortLink::new(
            row.id,
            row.target_url,
            row.short_code,
            row.clicks.max(0) as u64,
        )
    }
}

/// PostgreSQL repository for short link storage.
///
/// Uniqueness of short codes is enforced by the `UNIQUE` constraint and
/// `ON CONFLICT DO NOTHING`; click increments are single-row `UPDATE`s, so
/// Postgres row locks serialize work per code only.
///
/// Transient failures are retried with jittered exponential backoff. Reads
/// retry on connection-level errors. Writes retry only when no connection
/// could be acquired, since then the statement never reached the server and
/// repeating it cannot apply it twice.
pub struct PgLinkRepository {
    pool: Arc<PgPool>,
    retry_attempts: usize,
}

impl PgLinkRepository {
    /// Creates a new repository with a database connection pool.
    pub fn new(pool: Arc<PgPool>, retry_attempts: usize) -> Self {
        Self {
            pool,
            retry_attempts,
        }
    }

    fn backoff(&self) -> impl Iterator<Item = Duration> + use<> {
        ExponentialBackoff::from_millis(2)
            .factor(25)
            .max_delay(MAX_RETRY_DELAY)
            .map(jitter)
            .take(self.retry_attempts)
    }

    async fn read<T, A, Fut>(&self, operation: &'static str, action: A) -> Result<T, sqlx::Error>
    where
        A: FnMut() -> Fut,
        Fut: Future<Output = Result<T, sqlx::Error>>,
    {
        RetryIf::spawn(self.backoff(), action, |e: &sqlx::Error| {
            let retry = is_transient_read_error(e);
            if retry {
                tracing::warn!("Retrying {} after transient error: {}", operation, e);
            }
            retry
        })
        .await
    }

    async fn write<T, A, Fut>(&self, operation: &'static str, action: A) -> Result<T, sqlx::Error>
    where
        A: FnMut() -> Fut,
        Fut: Future<Output = Result<T, sqlx::Error>>,
    {
        RetryIf::spawn(self.backoff(), action, |e: &sqlx::Error| {
            let retry = is_unsent_write_error(e);
            if retry {
                tracing::warn!("Retrying {} after transient error: {}", operation, e);
            }
            retry
        })
        .await
    }
}

fn is_transient_read_error(e: &sqlx::Error) -> bool {
    matches!(
        e,
        sqlx::Error::PoolTimedOut | sqlx::Error::Io(_) | sqlx::Error::Tls(_)
    )
}

fn is_unsent_write_error(e: &sqlx::Error) -> bool {
    matches!(e, sqlx::Error::PoolTimedOut)
}

#[async_trait]
impl LinkRepository for PgLinkRepository {
    async fn insert_if_absent(&self, new_link: NewShortLink) -> Result<InsertOutcome, AppError> {
        let pool = self.pool.as_ref();
        let short_code = new_link.short_code.as_str();
        let target_url = new_link.target_url.as_str();

        let row = self
            .write("insert_if_absent", move || async move {
                sqlx::query_as::<_, ShortLinkRow>(
                    r#"
                    INSERT INTO short_links (short_code, target_url)
                    VALUES ($1, $2)
                    ON CONFLICT (short_code) DO NOTHING
                    RETURNING id, short_code, target_url, clicks
                    "#,
                )
                .bind(short_code)
                .bind(target_url)
                .fetch_optional(pool)
                .await
            })
            .await?;

        Ok(match row {
            Some(row) => InsertOutcome::Inserted(row.into()),
            None => InsertOutcome::Collision,
        })
    }

    async fn lookup(&self, short_code: &str) -> Result<Option<ShortLink>, AppError> {
        let pool = self.pool.as_ref();

        let row = self
            .read("lookup", move || async move {
                sqlx::query_as::<_, ShortLinkRow>(
                    r#"
                    SELECT id, short_code, target_url, clicks
                    FROM short_links
                    WHERE short_code = $1
                    "#,
                )
                .bind(short_code)
                .fetch_optional(pool)
                .await
            })
            .await?;

        Ok(row.map(ShortLink::from))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ShortLink>, AppError> {
        let pool = self.pool.as_ref();

        let row = self
            .read("find_by_id", move || async move {
                sqlx::query_as::<_, ShortLinkRow>(
                    "SELECT id, short_code, target_url, clicks FROM short_links WHERE id = $1",
                )
                .bind(id)
                .fetch_optional(pool)
                .await
            })
            .await?;

        Ok(row.map(ShortLink::from))
    }

    async fn add_clicks(&self, short_code: &str, delta: u64) -> Result<Option<u64>, AppError> {
        let delta = i64::try_from(delta).map_err(|_| {
            AppError::internal(
                "Click delta out of range",
                serde_json::json!({ "delta": delta }),
            )
        })?;
        let pool = self.pool.as_ref();

        let clicks = self
            .write("add_clicks", move || async move {
                sqlx::query_scalar::<_, i64>(
                    r#"
                    UPDATE short_links
                    SET clicks = clicks + $2
                    WHERE short_code = $1
                    RETURNING clicks
                    "#,
                )
                .bind(short_code)
                .bind(delta)
                .fetch_optional(pool)
                .await
            })
            .await?;

        Ok(clicks.map(|c| c.max(0) as u64))
    }

    async fn list(&self, limit: usize) -> Result<Vec<ShortLink>, AppError> {
        let pool = self.pool.as_ref();
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);

        let rows = self
            .read("list", move || async move {
                sqlx::query_as::<_, ShortLinkRow>(
                    r#"
                    SELECT id, short_code, target_url, clicks
                    FROM short_links
                    ORDER BY id DESC
                    LIMIT $1
                    "#,
                )
                .bind(limit)
                .fetch_all(pool)
                .await
            })
            .await?;

        Ok(rows.into_iter().map(ShortLink::from).collect())
    }

    async fn count(&self) -> Result<u64, AppError> {
        let pool = self.pool.as_ref();

        let count = self
            .read("count", move || async move {
                sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM short_links")
                    .fetch_one(pool)
                    .await
            })
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1")
            .execute(self.pool.as_ref())
            .await
            .is_ok()
    }

    fn is_durable(&self) -> bool {
        true
    }
}
