//! Typed filter predicates and a cancellable query pipeline for a remote
//! file store.
//!
//! This crate provides:
//! - A field registry and validated predicate constructors
//! - Query values assembled from ANDed filters
//! - Asynchronous execution with explicit outcomes and cancellation
//! - A passive ordered result adapter with pluggable row rendering
//! - A selection controller that discards results of superseded queries

pub mod adapter;
pub mod cancel;
pub mod config;
pub mod controller;
pub mod error;
pub mod executor;
pub mod field;
pub mod predicate;
pub mod query;
pub mod store;
pub mod types;

// Re-export main types
pub use adapter::{PagedResultAdapter, RenderedRow, RowRenderer, TitleDateRenderer};
pub use cancel::{CancellationToken, GenerationTracker};
pub use config::{CatalogConfig, FilterSpec, NamedQuery, QueryCatalog};
pub use controller::{MessageSink, SelectionController, ERROR_RETRIEVAL_MESSAGE};
pub use error::{DriveQueryError, Result, StoreError};
pub use executor::{ExecutionHandle, ExecutionStatus, ExecutionWatcher, Outcome, QueryExecutor};
pub use field::{Field, FieldRegistry, ValueType};
pub use predicate::{Filters, PredicateNode, SpecialKind};
pub use query::{Query, QueryBuilder};
pub use store::{MemoryStore, RemoteStore};
pub use types::{Literal, Record, RecordId, ResultBatch};
