//! In-process implementation of the link repository.

use std::sync::Arc;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;

use crate::domain::entities::{NewShortLink, ShortLink};
use crate::domain::repositories::{InsertOutcome, LinkRepository};
use crate::error::AppError;

/// A stored record. Everything but the counter is immutable.
#[derive(Debug)]
struct StoredLink {
    id: i64,
    target_url: String,
    clicks: AtomicU64,
}

impl StoredLink {
    fn snapshot(&self, short_code: &str) -> ShortLink {
        ShortLink::new(
            self.id,
            self.target_url.clone(),
            short_code.to_string(),
            self.clicks.load(Ordering::Acquire),
        )
    }
}

/// Sharded in-memory store.
///
/// `DashMap` splits the key space over independently locked shards, so
/// operations on different codes proceed in parallel. Inserts hold a shard
/// write lock only for the vacant/occupied check and the insert itself.
/// Click increments take a shard read lock and bump an atomic counter.
///
/// Data lives only as long as the process; used when no database is
/// configured and throughout the tests.
#[derive(Debug)]
pub struct MemoryLinkRepository {
    links: DashMap<String, Arc<StoredLink>>,
    codes_by_id: DashMap<i64, String>,
    next_id: AtomicI64,
}

impl MemoryLinkRepository {
    pub fn new() -> Self {
        Self {
            links: DashMap::new(),
            codes_by_id: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }

    fn get(&self, short_code: &str) -> Option<Arc<StoredLink>> {
        self.links.get(short_code).map(|entry| entry.value().clone())
    }
}

impl Default for MemoryLinkRepository {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LinkRepository for MemoryLinkRepository {
    async fn insert_if_absent(&self, new_link: NewShortLink) -> Result<InsertOutcome, AppError> {
        match self.links.entry(new_link.short_code) {
            Entry::Occupied(_) => Ok(InsertOutcome::Collision),
            Entry::Vacant(vacant) => {
                let id = self.next_id.fetch_add(1, Ordering::Relaxed);
                let short_code = vacant.key().clone();
                let stored = Arc::new(StoredLink {
                    id,
                    target_url: new_link.target_url,
                    clicks: AtomicU64::new(0),
                });
                let link = stored.snapshot(&short_code);

                // Indexed before the code becomes visible, so a link found by
                // `lookup` is always found by `find_by_id` as well.
                self.codes_by_id.insert(id, short_code);
                vacant.insert(stored);

                Ok(InsertOutcome::Inserted(link))
            }
        }
    }

    async fn lookup(&self, short_code: &str) -> Result<Option<ShortLink>, AppError> {
        Ok(self.get(short_code).map(|stored| stored.snapshot(short_code)))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<ShortLink>, AppError> {
        let Some(short_code) = self.codes_by_id.get(&id).map(|code| code.value().clone()) else {
            return Ok(None);
        };

        self.lookup(&short_code).await
    }

    async fn add_clicks(&self, short_code: &str, delta: u64) -> Result<Option<u64>, AppError> {
        Ok(self.links.get(short_code).map(|entry| {
            entry.value().clicks.fetch_add(delta, Ordering::AcqRel) + delta
        }))
    }

    async fn list(&self, limit: usize) -> Result<Vec<ShortLink>, AppError> {
        let mut links: Vec<ShortLink> = self
            .links
            .iter()
            .map(|entry| entry.value().snapshot(entry.key()))
            .collect();

        links.sort_unstable_by(|a, b| b.id.cmp(&a.id));
        links.truncate(limit);

        Ok(links)
    }

    async fn count(&self) -> Result<u64, AppError> {
        Ok(self.links.len() as u64)
    }

    async fn health_check(&self) -> bool {
        true
    }

    fn is_durable(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_insert_then_lookup() {
        let repo = MemoryLinkRepository::new();

        let outcome = repo
            .insert_if_absent(NewShortLink::new("abc1234", "https://example.com/"))
            .await
            .unwrap();

        let InsertOutcome::Inserted(link) = outcome else {
            panic!("expected insert");
        };
        assert_eq!(link.id, 1);
        assert_eq!(link.clicks, 0);

        let found = repo.lookup("abc1234").await.unwrap().unwrap();
        assert_eq!(found, link);
    }

    #[tokio::test]
    async fn test_collision_keeps_original_target() {
        let repo = MemoryLinkRepository::new();
        repo.insert_if_absent(NewShortLink::new("dup", "https://first.com/"))
            .await
            .unwrap();

        let outcome = repo
            .insert_if_absent(NewShortLink::new("dup", "https://second.com/"))
            .await
            .unwrap();

        assert_eq!(outcome, InsertOutcome::Collision);
        let link = repo.lookup("dup").await.unwrap().unwrap();
        assert_eq!(link.target_url, "https://first.com/");
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_ids_are_unique_and_increasing() {
        let repo = MemoryLinkRepository::new();
        let mut ids = Vec::new();
        for code in ["a", "b", "c"] {
            if let InsertOutcome::Inserted(link) = repo
                .insert_if_absent(NewShortLink::new(code, "https://example.com/"))
                .await
                .unwrap()
            {
                ids.push(link.id);
            }
        }

        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_find_by_id() {
        let repo = MemoryLinkRepository::new();
        repo.insert_if_absent(NewShortLink::new("code1", "https://example.com/"))
            .await
            .unwrap();

        let link = repo.find_by_id(1).await.unwrap().unwrap();
        assert_eq!(link.short_code, "code1");
        assert!(repo.find_by_id(42).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_increment_unknown_code() {
        let repo = MemoryLinkRepository::new();
        assert_eq!(repo.increment_clicks("missing").await.unwrap(), None);
        assert_eq!(repo.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_add_clicks_returns_running_total() {
        let repo = MemoryLinkRepository::new();
        repo.insert_if_absent(NewShortLink::new("c", "https://example.com/"))
            .await
            .unwrap();

        assert_eq!(repo.increment_clicks("c").await.unwrap(), Some(1));
        assert_eq!(repo.add_clicks("c", 5).await.unwrap(), Some(6));
        assert_eq!(repo.lookup("c").await.unwrap().unwrap().clicks, 6);
    }

    #[tokio::test]
    async fn test_list_is_newest_first_and_limited() {
        let repo = MemoryLinkRepository::new();
        for code in ["one", "two", "three"] {
            repo.insert_if_absent(NewShortLink::new(code, "https://example.com/"))
                .await
                .unwrap();
        }

        let links = repo.list(2).await.unwrap();
        let codes: Vec<_> = links.iter().map(|l| l.short_code.as_str()).collect();
        assert_eq!(codes, vec!["three", "two"]);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_increments_are_not_lost() {
        let repo = Arc::new(MemoryLinkRepository::new());
        repo.insert_if_absent(NewShortLink::new("hot", "https://example.com/"))
            .await
            .unwrap();

        let mut handles = Vec::new();
        for _ in 0..64 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                for _ in 0..100 {
                    repo.increment_clicks("hot").await.unwrap();
                }
            }));
        }
        for handle in handles {
            handle.await.unwrap();
        }

        assert_eq!(repo.lookup("hot").await.unwrap().unwrap().clicks, 6400);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_inserts_of_same_code_admit_one() {
        let repo = Arc::new(MemoryLinkRepository::new());

        let mut handles = Vec::new();
        for i in 0..32 {
            let repo = repo.clone();
            handles.push(tokio::spawn(async move {
                repo.insert_if_absent(NewShortLink::new(
                    "race",
                    format!("https://example.com/{i}"),
                ))
                .await
                .unwrap()
            }));
        }

        let mut inserted = 0;
        for handle in handles {
            if let InsertOutcome::Inserted(_) = handle.await.unwrap() {
                inserted += 1;
            }
        }

        assert_eq!(inserted, 1);
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_visible_link_is_always_found_by_id() {
        let repo = Arc::new(MemoryLinkRepository::new());
        let codes: Vec<String> = (0..500).map(|i| format!("code{i}")).collect();

        let writer = {
            let repo = repo.clone();
            let codes = codes.clone();
            tokio::spawn(async move {
                for code in codes {
                    repo.insert_if_absent(NewShortLink::new(code, "https://example.com/"))
                        .await
                        .unwrap();
                }
            })
        };

        while !writer.is_finished() {
            for code in &codes {
                if let Some(link) = repo.lookup(code).await.unwrap() {
                    let by_id = repo.find_by_id(link.id).await.unwrap();
                    assert_eq!(by_id.map(|l| l.short_code), Some(code.clone()));
                }
            }
            tokio::task::yield_now().await;
        }

        writer.await.unwrap();
        assert_eq!(repo.count().await.unwrap(), 500);
    }
}
