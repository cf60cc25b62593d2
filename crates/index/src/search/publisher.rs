//! Atomic publication of snapshots.
//!
//! Readers take an `Arc<Snapshot>` and keep it for the duration of a query,
//! so a concurrent publish never changes what an in-flight query sees.

use std::sync::Arc;

use arc_swap::ArcSwap;

use super::snapshot::Snapshot;

/// Holds the current snapshot and swaps in replacements atomically.
pub struct SnapshotPublisher {
    current: ArcSwap<Snapshot>,
}

impl SnapshotPublisher {
    /// Creates a publisher holding `initial`.
    pub fn new(initial: Snapshot) -> Self {
        Self {
            current: ArcSwap::from_pointee(initial),
        }
    }

    /// Returns the current snapshot.
    pub fn current(&self) -> Arc<Snapshot> {
        self.current.load_full()
    }

    /// Replaces the current snapshot, returning the previous one.
    pub fn publish(&self, snapshot: Snapshot) -> Arc<Snapshot> {
        let generation = snapshot.generation();
        let previous = self.current.swap(Arc::new(snapshot));
        tracing::debug!(
            generation,
            previous_generation = previous.generation(),
            "Published snapshot"
        );
        previous
    }

    /// Generation of the current snapshot.
    pub fn generation(&self) -> u64 {
        self.current.load().generation()
    }
}

impl Default for SnapshotPublisher {
    fn default() -> Self {
        Self::new(Snapshot::empty())
    }
}

impl std::fmt::Debug for SnapshotPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SnapshotPublisher")
            .field("generation", &self.generation())
            .finish()
    }
}
