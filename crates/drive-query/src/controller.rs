//! Selection-driven query execution.
//!
//! The controller owns the selected index and the active execution. Each
//! selection takes a new generation, clears the adapter and submits the
//! selected query; the outcome is applied by a delivery task only if its
//! generation is still the newest when it takes the adapter lock.


use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tokio::task::JoinHandle;

use crate::adapter::PagedResultAdapter;
use crate::cancel::{CancellationToken, GenerationTracker};
use crate::config::QueryCatalog;
use crate::error::Result;
use crate::executor::{ExecutionHandle, ExecutionWatcher, Outcome, QueryExecutor};

/// Message shown to the user when a query fails.
pub const ERROR_RETRIEVAL_MESSAGE: &str = "Error while retrieving files";

/// Sink for user-visible notifications.
pub trait MessageSink: Send + Sync {
    fn show_message(&self, text: &str);
}

impl<F> MessageSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn show_message(&self, text: &str) {
        self(text)
    }
}

/// Drives query selection and result population.
///
/// Calls must be serialized by the caller (methods take `&mut self`).
pub struct SelectionController {
    catalog: QueryCatalog,
    executor: QueryExecutor,
    adapter: Arc<Mutex<PagedResultAdapter>>,
    sink: Arc<dyn MessageSink>,
    generations: GenerationTracker,
    selected_index: usize,
    active: Option<ExecutionWatcher>,
    delivery: Option<JoinHandle<()>>,
}

impl std::fmt::Debug for SelectionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SelectionController")
            .field("catalog", &self.catalog)
            .field("selected_index", &self.selected_index)
            .field("active", &self.active)
            .field("sink", &"<sink>")
            .finish()
    }
}

impl SelectionController {
    pub fn new(catalog: QueryCatalog, executor: QueryExecutor, sink: Arc<dyn MessageSink>) -> Self {
        Self {
            catalog,
            executor,
            adapter: Arc::new(Mutex::new(PagedResultAdapter::new())),
            sink,
            generations: GenerationTracker::new(),
            selected_index: 0,
            active: None,
            delivery: None,
        }
    }

    pub fn catalog(&self) -> &QueryCatalog {
        &self.catalog
    }

    pub fn selected_index(&self) -> usize {
        self.selected_index
    }

    pub fn active(&self) -> Option<&ExecutionWatcher> {
        self.active.as_ref()
    }

    /// Read access to the result view.
    pub fn adapter(&self) -> MutexGuard<'_, PagedResultAdapter> {
        self.adapter.lock()
    }

    /// Selects the query at `index` and starts executing it.
    ///
    /// A still-pending previous execution is cancelled first. Must be called
    /// from within a Tokio runtime.
    pub fn select(&mut self, index: usize) -> Result<ExecutionWatcher> {
        let named = self.catalog.get(index)?.clone();

        if let Some(previous) = self.active.take() {
            if previous.cancel() {
                log::debug!(
                    "selection superseded execution id={} index={}",
                    previous.id(),
                    self.selected_index
                );
            }
        }
        self.selected_index = index;

        let token = {
            let mut adapter = self.adapter.lock();
            let generation = self.generations.next_generation();
            adapter.clear();
            self.generations.token_for(generation)
        };

        let handle = self.executor.execute(named.query);
        let watcher = handle.watcher();
        log::info!(
            "selection index={} title={:?} execution id={}",
            index,
            named.title,
            watcher.id()
        );

        self.delivery = Some(tokio::spawn(deliver(
            handle,
            token,
            self.adapter.clone(),
            self.sink.clone(),
        )));
        self.active = Some(watcher.clone());
        Ok(watcher)
    }

    /// Re-runs the current selection.
    pub fn refresh(&mut self) -> Result<ExecutionWatcher> {
        self.select(self.selected_index)
    }

    /// Waits until the active execution's outcome has been applied.
    pub async fn settled(&mut self) {
        if let Some(delivery) = self.delivery.take() {
            if let Err(error) = delivery.await {
                log::warn!("result delivery task failed: {error}");
            }
        }
    }
}

async fn deliver(
    handle: ExecutionHandle,
    token: CancellationToken,
    adapter: Arc<Mutex<PagedResultAdapter>>,
    sink: Arc<dyn MessageSink>,
) {
    let id = handle.id();
    match handle.outcome().await {
        Outcome::Succeeded(batch) => {
            let mut adapter = adapter.lock();
            if token.is_cancelled() {
                log::debug!("dropping stale results id={} count={}", id, batch.len());
                return;
            }
            log::debug!("retrieved file count id={} count={}", id, batch.len());
            adapter.append(batch);
        }
        Outcome::Failed(error) => {
            // Held so a newer selection cannot start between check and report.
            let _adapter = adapter.lock();
            if token.is_cancelled() {
                log::debug!("dropping stale failure id={id}: {error}");
                return;
            }
            log::error!("error while retrieving files id={id}: {error}");
            sink.show_message(ERROR_RETRIEVAL_MESSAGE);
        }
        Outcome::Cancelled => {}
    }
}
