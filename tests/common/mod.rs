#![allow(dead_code)]

use std::sync::Arc;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;

use shortlink::domain::click_event::ClickEvent;
use shortlink::domain::click_worker::{ClickWorkerSettings, click_queue, run_click_worker};
use shortlink::domain::entities::{NewShortLink, ShortLink};
use shortlink::domain::repositories::{InsertOutcome, LinkRepository};
use shortlink::infrastructure::cache::NullCache;
use shortlink::infrastructure::persistence::MemoryLinkRepository;
use shortlink::state::AppState;
use shortlink::utils::code_generator::{CodeGenerator, RandomCodeGenerator};

pub const ALLOW_ANY_ORIGIN: &[&str] = &["*"];

pub fn cors_any() -> Vec<String> {
    ALLOW_ANY_ORIGIN.iter().map(|s| s.to_string()).collect()
}

/// App state over a fresh in-memory store. The click queue receiver is
/// returned so tests decide whether and when clicks are applied.
pub fn create_test_state() -> (
    AppState,
    mpsc::Receiver<ClickEvent>,
    Arc<MemoryLinkRepository>,
) {
    create_test_state_with_generator(Arc::new(RandomCodeGenerator::default()), 10)
}

pub fn create_test_state_with_generator(
    generator: Arc<dyn CodeGenerator>,
    max_shorten_attempts: usize,
) -> (
    AppState,
    mpsc::Receiver<ClickEvent>,
    Arc<MemoryLinkRepository>,
) {
    let repository = Arc::new(MemoryLinkRepository::new());
    let (dispatcher, rx) = click_queue(100);

    let state = AppState::new(
        repository.clone(),
        Arc::new(NullCache),
        generator,
        dispatcher,
        max_shorten_attempts,
    );

    (state, rx, repository)
}

/// Starts the click worker; it finishes once every sender is dropped.
pub fn spawn_click_worker(
    rx: mpsc::Receiver<ClickEvent>,
    repository: Arc<MemoryLinkRepository>,
) -> JoinHandle<()> {
    tokio::spawn(run_click_worker(
        rx,
        repository,
        ClickWorkerSettings::default(),
    ))
}

pub async fn create_test_link(
    repository: &MemoryLinkRepository,
    code: &str,
    url: &str,
) -> ShortLink {
    match repository
        .insert_if_absent(NewShortLink::new(code, url))
        .await
        .unwrap()
    {
        InsertOutcome::Inserted(link) => link,
        InsertOutcome::Collision => panic!("code {code} already used"),
    }
}

/// Always proposes the same code.
pub struct ConstantCodeGenerator(pub &'static str);

impl CodeGenerator for ConstantCodeGenerator {
    fn generate(&self) -> Result<String, shortlink::utils::code_generator::CodeSpaceExhausted> {
        Ok(self.0.to_string())
    }

    fn code_length(&self) -> usize {
        self.0.len()
    }
}
