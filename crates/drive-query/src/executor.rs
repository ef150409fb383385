//! Asynchronous query execution with cancellable handles.
//!
//! Every call to [`QueryExecutor::execute`] spawns one Tokio task that issues
//! exactly one request to the remote store. The handle leaves `Pending`
//! exactly once: either the task settles it with the store's result, or
//! [`ExecutionHandle::cancel`] settles it as `Cancelled` first, in which case
//! the store's eventual result is dropped.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::{oneshot, watch};
use tokio::task::AbortHandle;

use crate::error::DriveQueryError;
use crate::query::Query;
use crate::store::RemoteStore;
use crate::types::ResultBatch;

/// Observable state of an execution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionStatus {
    Pending,
    Succeeded { records: usize },
    Failed,
    Cancelled,
}

impl ExecutionStatus {
    pub fn is_settled(self) -> bool {
        !matches!(self, Self::Pending)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Succeeded { .. } => "succeeded",
            Self::Failed => "failed",
            Self::Cancelled => "cancelled",
        }
    }
}

/// Terminal result of an execution.
#[derive(Debug)]
pub enum Outcome {
    Succeeded(ResultBatch),
    Failed(DriveQueryError),
    Cancelled,
}

impl Outcome {
    pub fn status(&self) -> ExecutionStatus {
        match self {
            Self::Succeeded(batch) => ExecutionStatus::Succeeded {
                records: batch.len(),
            },
            Self::Failed(_) => ExecutionStatus::Failed,
            Self::Cancelled => ExecutionStatus::Cancelled,
        }
    }

    /// Converts to a `Result`, mapping cancellation to `Ok(None)`.
    pub fn into_result(self) -> crate::Result<Option<ResultBatch>> {
        match self {
            Self::Succeeded(batch) => Ok(Some(batch)),
            Self::Failed(error) => Err(error),
            Self::Cancelled => Ok(None),
        }
    }
}

#[derive(Debug)]
struct ExecutionState {
    status: watch::Sender<ExecutionStatus>,
    abort: Mutex<Option<AbortHandle>>,
}

impl ExecutionState {
    /// Moves the execution out of `Pending`. Returns false if it already left.
    fn settle(&self, status: ExecutionStatus) -> bool {
        self.status.send_if_modified(|current| {
            if current.is_settled() {
                return false;
            }
            *current = status;
            true
        })
    }

    fn status(&self) -> ExecutionStatus {
        *self.status.borrow()
    }

    fn cancel(&self) -> bool {
        if !self.settle(ExecutionStatus::Cancelled) {
            return false;
        }
        // Best effort: dropping the store future is the transport's cue to abort.
        if let Some(abort) = self.abort.lock().take() {
            abort.abort();
        }
        true
    }
}

/// One submitted query execution. Owns the eventual [`Outcome`].
#[derive(Debug)]
pub struct ExecutionHandle {
    id: u64,
    state: Arc<ExecutionState>,
    outcome: oneshot::Receiver<Outcome>,
}

impl ExecutionHandle {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn status(&self) -> ExecutionStatus {
        self.state.status()
    }

    pub fn is_settled(&self) -> bool {
        self.status().is_settled()
    }

    /// Cancels the execution if it is still pending.
    ///
    /// Returns true if this call performed the cancellation.
    pub fn cancel(&self) -> bool {
        self.state.cancel()
    }

    /// Returns a cloneable view that can observe and cancel this execution.
    pub fn watcher(&self) -> ExecutionWatcher {
        ExecutionWatcher {
            id: self.id,
            state: self.state.clone(),
        }
    }

    /// Waits for the terminal outcome.
    pub async fn outcome(self) -> Outcome {
        match self.outcome.await {
            Ok(outcome) => outcome,
            Err(_) => {
                // The task ended without reporting: either it was cancelled, or
                // it died before settling.
                if self.state.settle(ExecutionStatus::Failed) {
                    Outcome::Failed(DriveQueryError::Internal(format!(
                        "execution {} ended without an outcome",
                        self.id
                    )))
                } else {
                    Outcome::Cancelled
                }
            }
        }
    }
}

/// Cloneable observer of an execution's status.
#[derive(Debug, Clone)]
pub struct ExecutionWatcher {
    id: u64,
    state: Arc<ExecutionState>,
}

impl ExecutionWatcher {
    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn status(&self) -> ExecutionStatus {
        self.state.status()
    }

    pub fn is_settled(&self) -> bool {
        self.status().is_settled()
    }

    pub fn cancel(&self) -> bool {
        self.state.cancel()
    }

    /// Waits until the execution leaves `Pending` and returns the final status.
    pub async fn settled(&self) -> ExecutionStatus {
        let mut status = self.state.status.subscribe();
        let settled = match status.wait_for(|current| current.is_settled()).await {
            Ok(current) => *current,
            Err(_) => self.status(),
        };
        settled
    }
}

/// Issues queries against a remote store.
pub struct QueryExecutor {
    store: Arc<dyn RemoteStore>,
    next_id: AtomicU64,
}

impl std::fmt::Debug for QueryExecutor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QueryExecutor")
            .field("store", &"<remote store>")
            .field("next_id", &self.next_id)
            .finish()
    }
}

impl QueryExecutor {
    pub fn new(store: Arc<dyn RemoteStore>) -> Self {
        Self {
            store,
            next_id: AtomicU64::new(0),
        }
    }

    /// Submits `query` and returns immediately.
    ///
    /// Must be called from within a Tokio runtime.
    pub fn execute(&self, query: Query) -> ExecutionHandle {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed) + 1;
        let (status_tx, _) = watch::channel(ExecutionStatus::Pending);
        let state = Arc::new(ExecutionState {
            status: status_tx,
            abort: Mutex::new(None),
        });
        let (outcome_tx, outcome_rx) = oneshot::channel();

        log::debug!(
            "query execute id={} nodes={} query={}",
            id,
            query.root().map_or(0, |root| root.node_count()),
            query
        );

        let store = self.store.clone();
        let task_state = state.clone();
        let task = tokio::spawn(async move {
            let outcome = match store.query(&query).await {
                Ok(batch) => Outcome::Succeeded(batch),
                Err(error) => {
                    log::warn!("query execute id={id} failed: {error}");
                    Outcome::Failed(DriveQueryError::Remote(error))
                }
            };

            if task_state.settle(outcome.status()) {
                let _ = outcome_tx.send(outcome);
            } else {
                log::debug!(
                    "query execute id={} discarded status={}",
                    id,
                    outcome.status().as_str()
                );
            }
        });
        *state.abort.lock() = Some(task.abort_handle());

        ExecutionHandle {
            id,
            state,
            outcome: outcome_rx,
        }
    }

    /// Cancels `handle`; see [`ExecutionHandle::cancel`].
    pub fn cancel(&self, handle: &ExecutionHandle) -> bool {
        handle.cancel()
    }
}
