//! Redirect resolution.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::click_worker::ClickDispatcher;
use crate::domain::repositories::LinkRepository;
use crate::error::AppError;
use crate::infrastructure::cache::CacheService;
use crate::utils::code_generator::is_well_formed_code;

/// Resolves short codes to target URLs and records the click.
pub struct RedirectService<R: LinkRepository + ?Sized = dyn LinkRepository> {
    repository: Arc<R>,
    cache: Arc<dyn CacheService>,
    clicks: ClickDispatcher,
}

impl<R: LinkRepository + ?Sized> RedirectService<R> {
    pub fn new(repository: Arc<R>, cache: Arc<dyn CacheService>, clicks: ClickDispatcher) -> Self {
        Self {
            repository,
            cache,
            clicks,
        }
    }

    /// Returns the target URL for `short_code`.
    ///
    /// A click event is queued before returning, so every successful call is
    /// counted exactly once after the click worker catches up. Lookups of
    /// unknown codes touch no counter.
    ///
    /// # Errors
    ///
    /// - [`AppError::NotFound`] if the code is malformed or was never issued
    /// - [`AppError::Internal`] on storage failure
    pub async fn resolve(&self, short_code: &str) -> Result<String, AppError> {
        if !is_well_formed_code(short_code) {
            debug!("Rejected malformed short code");
            return Err(not_found(short_code));
        }

        let target_url = match self.cache.get_url(short_code).await {
            Ok(Some(url)) => url,
            Ok(None) => self.lookup(short_code).await?,
            Err(e) => {
                warn!("Cache unavailable, falling back to store: {}", e);
                self.lookup(short_code).await?
            }
        };

        self.clicks.dispatch(ClickEvent::new(short_code));
        metrics::counter!("shortlink_redirects_total").increment(1);

        Ok(target_url)
    }

    async fn lookup(&self, short_code: &str) -> Result<String, AppError> {
        let Some(link) = self.repository.lookup(short_code).await? else {
            debug!("Short code not found: {}", short_code);
            return Err(not_found(short_code));
        };

        let cache = self.cache.clone();
        let code = link.short_code;
        let url = link.target_url.clone();
        tokio::spawn(async move {
            if let Err(e) = cache.set_url(&code, &url).await {
                debug!("Failed to cache {}: {}", code, e);
            }
        });

        Ok(link.target_url)
    }
}

fn not_found(short_code: &str) -> AppError {
    AppError::not_found("Short link not found", json!({ "code": short_code }))
}
