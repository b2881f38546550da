//! Short link creation.

use std::sync::Arc;

use serde_json::json;
use tracing::{debug, error, info};

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::{InsertOutcome, LinkRepository};
use crate::error::AppError;
use crate::utils::code_generator::{CodeGenerator, is_reserved_code};
use crate::utils::url_normalizer::normalize_url;

/// Default bound on generate-and-insert attempts per request.
pub const DEFAULT_MAX_SHORTEN_ATTEMPTS: usize = 10;

/// Outcome of the bounded allocation loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShortenAttempt {
    Inserted(ShortLink),
    /// No free code was found after `attempts` inserts.
    Exhausted { attempts: usize },
}

/// Creates short links: validates the target, then allocates a code.
///
/// Codes are proposed by the [`CodeGenerator`] and claimed with the store's
/// atomic `insert_if_absent`; a collision simply costs one more attempt.
pub struct ShortenService<R: LinkRepository + ?Sized = dyn LinkRepository> {
    repository: Arc<R>,
    generator: Arc<dyn CodeGenerator>,
    max_attempts: usize,
}

impl<R: LinkRepository + ?Sized> ShortenService<R> {
    pub fn new(repository: Arc<R>, generator: Arc<dyn CodeGenerator>, max_attempts: usize) -> Self {
        Self {
            repository,
            generator,
            max_attempts: max_attempts.max(1),
        }
    }

    /// Creates a short link for `target_url`.
    ///
    /// The URL is canonicalised before storage. Every call creates a new
    /// record, even for a target that was shortened before.
    ///
    /// # Errors
    ///
    /// - [`AppError::InvalidUrl`] if `target_url` is not an absolute http(s) URL; nothing is stored
    /// - [`AppError::CodeSpaceExhausted`] if no free code was found within the attempt bound
    /// - [`AppError::Internal`] on storage failure
    pub async fn shorten(&self, target_url: &str) -> Result<ShortLink, AppError> {
        let target_url = normalize_url(target_url).map_err(|e| {
            debug!("Rejected target URL: {}", e);
            AppError::invalid_url("Invalid URL format", json!({ "reason": e.to_string() }))
        })?;

        match self.allocate(&target_url).await? {
            ShortenAttempt::Inserted(link) => {
                info!("Created short link {} -> {}", link.short_code, link.target_url);
                metrics::counter!("shortlink_created_total").increment(1);
                Ok(link)
            }
            ShortenAttempt::Exhausted { attempts } => {
                error!(
                    "No free short code after {} attempt(s) (code length {})",
                    attempts,
                    self.generator.code_length()
                );
                metrics::counter!("shortlink_exhausted_total").increment(1);
                Err(AppError::code_space_exhausted(
                    "Short code space exhausted",
                    json!({
                        "attempts": attempts,
                        "code_length": self.generator.code_length(),
                    }),
                ))
            }
        }
    }

    /// Generates candidates and inserts until one sticks or the bound is hit.
    pub async fn allocate(&self, target_url: &str) -> Result<ShortenAttempt, AppError> {
        for attempt in 0..self.max_attempts {
            let short_code = match self.generator.generate() {
                Ok(code) => code,
                Err(e) => {
                    error!("{}", e);
                    return Ok(ShortenAttempt::Exhausted { attempts: attempt });
                }
            };

            if is_reserved_code(&short_code) {
                debug!("Skipping reserved short code {} (attempt {})", short_code, attempt + 1);
                metrics::counter!("shortlink_collisions_total").increment(1);
                continue;
            }

            match self
                .repository
                .insert_if_absent(NewShortLink::new(short_code.as_str(), target_url))
                .await?
            {
                InsertOutcome::Inserted(link) => return Ok(ShortenAttempt::Inserted(link)),
                InsertOutcome::Collision => {
                    debug!("Short code collision on {} (attempt {})", short_code, attempt + 1);
                    metrics::counter!("shortlink_collisions_total").increment(1);
                }
            }
        }

        Ok(ShortenAttempt::Exhausted {
            attempts: self.max_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::repositories::MockLinkRepository;
    use crate::utils::code_generator::{
        CodeSpaceExhausted, RandomCodeGenerator, SequentialCodeGenerator,
    };
    use std::sync::Mutex;

    /// Replays a fixed list of codes, repeating the last one.
    struct ScriptedGenerator {
        codes: Mutex<Vec<&'static str>>,
    }

    impl ScriptedGenerator {
        fn new(codes: &[&'static str]) -> Arc<Self> {
            let mut codes = codes.to_vec();
            codes.reverse();
            Arc::new(Self {
                codes: Mutex::new(codes),
            })
        }
    }

    impl CodeGenerator for ScriptedGenerator {
        fn generate(&self) -> Result<String, CodeSpaceExhausted> {
            let mut codes = self.codes.lock().unwrap();
            let code = if codes.len() > 1 {
                codes.pop().unwrap()
            } else {
                codes[0]
            };
            Ok(code.to_string())
        }

        fn code_length(&self) -> usize {
            7
        }
    }

    fn inserted(id: i64, new_link: &NewShortLink) -> InsertOutcome {
        InsertOutcome::Inserted(ShortLink::new(
            id,
            new_link.target_url.clone(),
            new_link.short_code.clone(),
            0,
        ))
    }

    #[tokio::test]
    async fn test_shorten_success() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_insert_if_absent()
            .withf(|new_link| new_link.target_url == "https://example.com/a/very/long/path")
            .times(1)
            .returning(|new_link| Ok(inserted(1, &new_link)));

        let service = ShortenService::new(
            Arc::new(mock_repo),
            Arc::new(RandomCodeGenerator::default()),
            DEFAULT_MAX_SHORTEN_ATTEMPTS,
        );

        let link = service
            .shorten("https://example.com/a/very/long/path")
            .await
            .unwrap();

        assert_eq!(link.target_url, "https://example.com/a/very/long/path");
        assert_eq!(link.short_code.len(), 7);
        assert_eq!(link.clicks, 0);
    }

    #[tokio::test]
    async fn test_shorten_stores_canonical_url() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_insert_if_absent()
            .withf(|new_link| new_link.target_url == "https://example.com/path")
            .times(1)
            .returning(|new_link| Ok(inserted(1, &new_link)));

        let service = ShortenService::new(
            Arc::new(mock_repo),
            Arc::new(RandomCodeGenerator::default()),
            DEFAULT_MAX_SHORTEN_ATTEMPTS,
        );

        assert!(service.shorten("https://EXAMPLE.COM:443/path").await.is_ok());
    }

    #[tokio::test]
    async fn test_shorten_invalid_url_persists_nothing() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo.expect_insert_if_absent().times(0);

        let service = ShortenService::new(
            Arc::new(mock_repo),
            Arc::new(RandomCodeGenerator::default()),
            DEFAULT_MAX_SHORTEN_ATTEMPTS,
        );

        for input in ["not-a-url", "ftp://example.com/file", "javascript:alert(1)", ""] {
            let err = service.shorten(input).await.unwrap_err();
            assert!(matches!(err, AppError::InvalidUrl { .. }), "{input}");
        }
    }

    #[tokio::test]
    async fn test_shorten_retries_after_collision() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_insert_if_absent()
            .withf(|new_link| new_link.short_code == "taken01")
            .times(1)
            .returning(|_| Ok(InsertOutcome::Collision));
        mock_repo
            .expect_insert_if_absent()
            .withf(|new_link| new_link.short_code == "fresh02")
            .times(1)
            .returning(|new_link| Ok(inserted(2, &new_link)));

        let service = ShortenService::new(
            Arc::new(mock_repo),
            ScriptedGenerator::new(&["taken01", "fresh02"]),
            DEFAULT_MAX_SHORTEN_ATTEMPTS,
        );

        let link = service.shorten("https://example.com/").await.unwrap();
        assert_eq!(link.short_code, "fresh02");
    }

    #[tokio::test]
    async fn test_reserved_code_is_skipped() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_insert_if_absent()
            .withf(|new_link| new_link.short_code == "health")
            .times(0);
        mock_repo
            .expect_insert_if_absent()
            .withf(|new_link| new_link.short_code == "fresh02")
            .times(1)
            .returning(|new_link| Ok(inserted(1, &new_link)));

        let service = ShortenService::new(
            Arc::new(mock_repo),
            ScriptedGenerator::new(&["health", "fresh02"]),
            DEFAULT_MAX_SHORTEN_ATTEMPTS,
        );

        let link = service.shorten("https://example.com/").await.unwrap();
        assert_eq!(link.short_code, "fresh02");
    }

    #[tokio::test]
    async fn test_constant_generator_exhausts_after_max_attempts() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_insert_if_absent()
            .times(4)
            .returning(|_| Ok(InsertOutcome::Collision));

        let service = ShortenService::new(
            Arc::new(mock_repo),
            ScriptedGenerator::new(&["same123"]),
            4,
        );

        let err = service.shorten("https://example.com/").await.unwrap_err();
        assert!(matches!(err, AppError::CodeSpaceExhausted { .. }));

        let info = err.to_error_info();
        assert_eq!(info.code, "code_space_exhausted");
        assert_eq!(info.details["attempts"], 4);
    }

    #[tokio::test]
    async fn test_generator_exhaustion_stops_early() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_insert_if_absent()
            .times(62)
            .returning(|new_link| Ok(inserted(1, &new_link)));

        let service = ShortenService::new(
            Arc::new(mock_repo),
            Arc::new(SequentialCodeGenerator::new(1)),
            DEFAULT_MAX_SHORTEN_ATTEMPTS,
        );

        for _ in 0..62 {
            service.shorten("https://example.com/").await.unwrap();
        }

        assert_eq!(
            service.allocate("https://example.com/").await.unwrap(),
            ShortenAttempt::Exhausted { attempts: 0 }
        );
    }

    #[tokio::test]
    async fn test_storage_error_propagates() {
        let mut mock_repo = MockLinkRepository::new();
        mock_repo
            .expect_insert_if_absent()
            .times(1)
            .returning(|_| Err(AppError::internal("Database error", json!({}))));

        let service = ShortenService::new(
            Arc::new(mock_repo),
            Arc::new(RandomCodeGenerator::default()),
            DEFAULT_MAX_SHORTEN_ATTEMPTS,
        );

        let err = service.shorten("https://example.com/").await.unwrap_err();
        assert!(matches!(err, AppError::Internal { .. }));
    }
}
