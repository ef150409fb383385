//! Remote store collaborator trait and in-memory implementation.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::query::Query;
use crate::types::{Record, ResultBatch};

/// The remote file store queries are delegated to.
///
/// Implementations evaluate the predicate themselves and must keep an empty
/// result distinct from a failure. Dropping the returned future is the only
/// cancellation signal they receive.
#[async_trait]
pub trait RemoteStore: Send + Sync {
    async fn query(&self, query: &Query) -> Result<ResultBatch, StoreError>;
}

// --- Memory Implementation ---

/// In-process store that evaluates queries over a fixed record list.
///
/// Results keep insertion order. A configured failure makes every query fail
/// until [`MemoryStore::recover`] is called.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: RwLock<Vec<Record>>,
    failure: RwLock<Option<StoreError>>,
    queries: AtomicUsize,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_records(records: impl IntoIterator<Item = Record>) -> Self {
        Self {
            records: RwLock::new(records.into_iter().collect()),
            ..Self::default()
        }
    }

    pub fn insert(&self, record: Record) {
        self.records.write().push(record);
    }

    pub fn len(&self) -> usize {
        self.records.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.read().is_empty()
    }

    pub fn fail_with(&self, error: StoreError) {
        *self.failure.write() = Some(error);
    }

    pub fn recover(&self) {
        *self.failure.write() = None;
    }

    /// Number of queries received so far.
    pub fn query_count(&self) -> usize {
        self.queries.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl RemoteStore for MemoryStore {
    async fn query(&self, query: &Query) -> Result<ResultBatch, StoreError> {
        self.queries.fetch_add(1, Ordering::Relaxed);
        if let Some(error) = self.failure.read().clone() {
            return Err(error);
        }
        Ok(self
            .records
            .read()
            .iter()
            .filter(|record| query.matches(record))
            .cloned()
            .collect())
    }
}
