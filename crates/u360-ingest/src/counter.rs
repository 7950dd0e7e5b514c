//! Shared accumulators
//!
//! The only mutable state shared between workers. Both types are lock-free
//! and meant to be held behind an `Arc`.

use std::sync::atomic::{AtomicU64, Ordering};

/// Monotonic accumulating total (bytes read, records loaded, ...).
#[derive(Debug, Default)]
pub struct Counter {
    value: AtomicU64,
}

impl Counter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, n: u64) {
        self.value.fetch_add(n, Ordering::Relaxed);
    }

    pub fn get(&self) -> u64 {
        self.value.load(Ordering::Relaxed)
    }
}

/// Hands out column identifiers.
///
/// Every call to [`next`](Self::next) returns a value never returned before
/// by this sequencer, strictly greater than all earlier ones. Ids lost by a
/// worker that fails before using them are simply skipped; contiguity is not
/// promised.
#[derive(Debug, Default)]
pub struct IdentitySequencer {
    next: AtomicU64,
}

impl IdentitySequencer {
    /// Sequencer whose first id is 0.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    pub fn next(&self) -> u64 {
        self.next.fetch_add(1, Ordering::Relaxed)
    }

    /// Number of ids handed out so far (for a sequencer started at 0).
    pub fn issued(&self) -> u64 {
        self.next.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_counter_accumulates() {
        let counter = Counter::new();
        counter.add(3);
        counter.add(0);
        counter.add(39);
        assert_eq!(counter.get(), 42);
    }

    #[test]
    fn test_sequencer_starts_at_zero() {
        let seq = IdentitySequencer::new();
        assert_eq!(seq.next(), 0);
        assert_eq!(seq.next(), 1);
        assert_eq!(seq.issued(), 2);
    }

    #[test]
    fn test_sequencer_starting_at() {
        let seq = IdentitySequencer::starting_at(1_000);
        assert_eq!(seq.next(), 1_000);
    }

    #[test]
    fn test_sequencer_unique_under_threads() {
        let seq = Arc::new(IdentitySequencer::new());
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let seq = seq.clone();
                std::thread::spawn(move || (0..5_000).map(|_| seq.next()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "id {id} issued twice");
            }
        }
        assert_eq!(seen.len(), 40_000);
        assert_eq!(seq.issued(), 40_000);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_sequencer_unique_across_tasks() {
        let seq = Arc::new(IdentitySequencer::new());
        let mut tasks = tokio::task::JoinSet::new();
        for _ in 0..16 {
            let seq = seq.clone();
            tasks.spawn(async move {
                let mut ids = Vec::with_capacity(500);
                for _ in 0..500 {
                    ids.push(seq.next());
                    tokio::task::yield_now().await;
                }
                ids
            });
        }

        let mut all = Vec::new();
        while let Some(ids) = tasks.join_next().await {
            let ids = ids.unwrap();
            assert!(ids.windows(2).all(|w| w[0] < w[1]), "per-caller ids must increase");
            all.extend(ids);
        }
        all.sort_unstable();
        all.dedup();
        assert_eq!(all.len(), 8_000);
    }
}
