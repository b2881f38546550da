//! Click queue: the dispatching side used by redirects and the background
//! worker that applies counter increments to the store.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, error::TrySendError};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{debug, error, info, warn};

use crate::domain::click_event::ClickEvent;
use crate::domain::repositories::LinkRepository;

/// Tuning knobs for [`run_click_worker`].
#[derive(Debug, Clone, Copy)]
pub struct ClickWorkerSettings {
    /// Maximum number of events drained from the queue per batch.
    pub batch_size: usize,
    /// Maximum number of store updates in flight at once.
    pub concurrency: usize,
}

impl Default for ClickWorkerSettings {
    fn default() -> Self {
        Self {
            batch_size: 256,
            concurrency: 4,
        }
    }
}

/// Creates the bounded click queue.
pub fn click_queue(capacity: usize) -> (ClickDispatcher, mpsc::Receiver<ClickEvent>) {
    let (tx, rx) = mpsc::channel(capacity);
    (ClickDispatcher::new(tx), rx)
}

/// Sending half of the click queue.
///
/// Dispatch never waits for the store. Once [`ClickDispatcher::dispatch`]
/// returns, the event is either in the queue or owned by a detached task
/// that will enqueue it, so dropping the calling request cannot lose it.
#[derive(Debug, Clone)]
pub struct ClickDispatcher {
    tx: mpsc::Sender<ClickEvent>,
}

impl ClickDispatcher {
    pub fn new(tx: mpsc::Sender<ClickEvent>) -> Self {
        Self { tx }
    }

    /// Hands a click event to the worker.
    pub fn dispatch(&self, event: ClickEvent) {
        match self.tx.try_send(event) {
            Ok(()) => {}
            Err(TrySendError::Full(event)) => {
                debug!("Click queue full, deferring click for {}", event.short_code);
                let tx = self.tx.clone();
                tokio::spawn(async move {
                    if let Err(e) = tx.send(event).await {
                        error!("Click queue closed, click for {} lost", e.0.short_code);
                        metrics::counter!("shortlink_click_failures_total").increment(1);
                    }
                });
            }
            Err(TrySendError::Closed(event)) => {
                error!("Click queue closed, click for {} lost", event.short_code);
                metrics::counter!("shortlink_click_failures_total").increment(1);
            }
        }
    }

    /// Returns `true` once the worker has stopped receiving.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    /// Free slots currently available in the queue.
    pub fn available(&self) -> usize {
        self.tx.capacity()
    }

    /// Total queue capacity.
    pub fn max_capacity(&self) -> usize {
        self.tx.max_capacity()
    }
}

/// Applies queued clicks to the store until every sender is dropped.
///
/// Events are drained in batches of up to `settings.batch_size` and
/// coalesced per short code, so a burst of N clicks on one code costs a
/// single `add_clicks(code, N)`. The queue is fully drained before the
/// function returns. Store failures are logged and counted, never retried
/// here: the store already retries failures that are safe to repeat, and
/// repeating an ambiguous increment could count a click twice.
pub async fn run_click_worker<R>(
    mut rx: mpsc::Receiver<ClickEvent>,
    repository: Arc<R>,
    settings: ClickWorkerSettings,
) where
    R: LinkRepository + ?Sized + 'static,
{
    let batch_size = settings.batch_size.max(1);
    let semaphore = Arc::new(Semaphore::new(settings.concurrency.max(1)));
    let mut buffer = Vec::with_capacity(batch_size);

    info!("Click worker started");

    loop {
        let received = rx.recv_many(&mut buffer, batch_size).await;
        if received == 0 {
            break;
        }

        if let Some(oldest) = buffer.iter().map(|e| e.received_at).min() {
            debug!(
                events = received,
                queue_delay_ms = oldest.elapsed().as_millis() as u64,
                "Applying click batch"
            );
        }

        let batch = coalesce(buffer.drain(..));
        let mut tasks = JoinSet::new();

        for (short_code, delta) in batch {
            let Ok(permit) = semaphore.clone().acquire_owned().await else {
                break;
            };
            let repository = repository.clone();

            tasks.spawn(async move {
                let _permit = permit;
                apply_clicks(repository.as_ref(), &short_code, delta).await;
            });
        }

        while let Some(joined) = tasks.join_next().await {
            if let Err(e) = joined {
                error!("Click task failed: {}", e);
            }
        }
    }

    info!("Click worker stopped, queue drained");
}

/// Sums events per short code.
fn coalesce(events: impl Iterator<Item = ClickEvent>) -> HashMap<String, u64> {
    let mut counts = HashMap::new();
    for event in events {
        *counts.entry(event.short_code).or_insert(0) += 1;
    }
    counts
}

async fn apply_clicks<R>(repository: &R, short_code: &str, delta: u64)
where
    R: LinkRepository + ?Sized,
{
    match repository.add_clicks(short_code, delta).await {
        Ok(Some(total)) => {
            debug!("Recorded {} click(s) for {} (total {})", delta, short_code, total);
            metrics::counter!("shortlink_clicks_applied_total").increment(delta);
        }
        Ok(None) => {
            warn!("Dropping {} click(s) for unknown code {}", delta, short_code);
        }
        Err(e) => {
            error!(
                "Failed to record {} click(s) for {}: {}",
                delta, short_code, e
            );
            metrics::counter!("shortlink_click_failures_total").increment(delta);
        }
    }
}

/// Grace period helper used by the server when draining on shutdown.
pub async fn drain_with_timeout(worker: tokio::task::JoinHandle<()>, timeout: Duration) {
    match tokio::time::timeout(timeout, worker).await {
        Ok(Ok(())) => info!("Click queue drained"),
        Ok(Err(e)) => error!("Click worker terminated abnormally: {}", e),
        Err(_) => warn!(
            "Click queue not drained within {}s, pending clicks may be lost",
            timeout.as_secs()
        ),
    }
}
