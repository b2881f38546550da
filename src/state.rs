//! Shared application state injected into every handler.

use std::sync::Arc;

use crate::application::services::{LinkService, RedirectService, ShortenService};
use crate::domain::click_worker::ClickDispatcher;
use crate::domain::repositories::LinkRepository;
use crate::infrastructure::cache::{CacheService, NullCache};
use crate::utils::code_generator::CodeGenerator;

/// Services and handles shared by all requests.
///
/// Cloning is cheap: every field is reference counted.
#[derive(Clone)]
pub struct AppState {
    pub shorten_service: Arc<ShortenService>,
    pub redirect_service: Arc<RedirectService>,
    pub link_service: Arc<LinkService>,
    pub repository: Arc<dyn LinkRepository>,
    pub cache: Arc<dyn CacheService>,
    pub click_dispatcher: ClickDispatcher,
}

impl AppState {
    /// Wires the services around one store, cache, generator and click queue.
    ///
    /// The cache is replaced by [`NullCache`] unless the store is durable.
    pub fn new(
        repository: Arc<dyn LinkRepository>,
        cache: Arc<dyn CacheService>,
        generator: Arc<dyn CodeGenerator>,
        click_dispatcher: ClickDispatcher,
        max_shorten_attempts: usize,
    ) -> Self {
        let cache: Arc<dyn CacheService> = if repository.is_durable() {
            cache
        } else {
            if cache.backend() != "disabled" {
                tracing::warn!(
                    "Redirect cache ({}) disabled: the link store does not persist across restarts",
                    cache.backend()
                );
            }
            Arc::new(NullCache::new())
        };

        let shorten_service = Arc::new(ShortenService::new(
            repository.clone(),
            generator,
            max_shorten_attempts,
        ));
        let redirect_service = Arc::new(RedirectService::new(
            repository.clone(),
            cache.clone(),
            click_dispatcher.clone(),
        ));
        let link_service = Arc::new(LinkService::new(repository.clone()));

        Self {
            shorten_service,
            redirect_service,
            link_service,
            repository,
            cache,
            click_dispatcher,
        }
    }
}
