//! Read-only link queries backing the listing UI and the admin CLI.

use std::sync::Arc;

use crate::domain::entities::ShortLink;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use serde_json::json;

pub const DEFAULT_LIST_LIMIT: usize = 50;
pub const MAX_LIST_LIMIT: usize = 500;

/// Service for reading stored links and their click counts.
///
/// Never records clicks; only redirects do that.
pub struct LinkService<R: LinkRepository + ?Sized = dyn LinkRepository> {
    repository: Arc<R>,
}

impl<R: LinkRepository + ?Sized> LinkService<R> {
    pub fn new(repository: Arc<R>) -> Self {
        Self { repository }
    }

    /// Lists links newest first.
    ///
    /// `limit` defaults to [`DEFAULT_LIST_LIMIT`] and is clamped to
    /// `1..=MAX_LIST_LIMIT`.
    pub async fn list_links(&self, limit: Option<usize>) -> Result<Vec<ShortLink>, AppError> {
        let limit = limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT);

        self.repository.list(limit).await
    }

    /// Retrieves a link by its id.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if no link has this id.
    pub async fn get_link(&self, id: i64) -> Result<ShortLink, AppError> {
        self.repository
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::not_found("Short link not found", json!({ "id": id })))
    }

    /// Retrieves a link by its short code without counting a click.
    ///
    /// # Errors
    ///
    /// Returns [`AppError::NotFound`] if the code does not exist.
    pub async fn get_link_by_code(&self, short_code: &str) -> Result<ShortLink, AppError> {
        self.repository
            .lookup(short_code)
            .await?
            .ok_or_else(|| {
                AppError::not_found("Short link not found", json!({ "code": short_code }))
            })
    }

    /// Number of stored links.
    pub async fn count(&self) -> Result<u64, AppError> {
        self.repository.count().await
    }
}
