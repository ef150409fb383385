//! Generation tracking for superseding in-flight work.
//!
//! Each selection takes a new generation from a [`GenerationTracker`]. Work
//! started under an older generation holds a [`CancellationToken`] that
//! reports itself stale as soon as a newer generation is taken.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Tracks the active generation.
///
/// When new work starts, call `next_generation()`. Tokens for older
/// generations become stale.
#[derive(Debug, Clone, Default)]
pub struct GenerationTracker {
    active: Arc<AtomicU64>,
}

impl GenerationTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Increments the active generation and returns it.
    ///
    /// This effectively cancels every token issued for older generations.
    pub fn next_generation(&self) -> u64 {
        self.active.fetch_add(1, Ordering::SeqCst) + 1
    }

    /// Returns the current active generation without incrementing.
    pub fn current_generation(&self) -> u64 {
        self.active.load(Ordering::SeqCst)
    }

    /// Creates a token bound to `generation`.
    pub fn token_for(&self, generation: u64) -> CancellationToken {
        CancellationToken {
            active: self.active.clone(),
            generation,
        }
    }
}

/// Reports whether the work it was issued for is still wanted.
#[derive(Debug, Clone)]
pub struct CancellationToken {
    active: Arc<AtomicU64>,
    generation: u64,
}

impl CancellationToken {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// True once a newer generation has been taken.
    pub fn is_cancelled(&self) -> bool {
        self.active.load(Ordering::SeqCst) != self.generation
    }
}
