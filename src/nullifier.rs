// Nullifier store: the durable record of which burn proofs have been claimed
//
// A nullifier moves from unseen to consumed exactly once and never back.
// The set only grows.

use std::collections::BTreeSet;

use alloy_primitives::B256;
use serde::{Deserialize, Serialize};

/// Result of [`NullifierStore::check_and_mark`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkOutcome {
    /// The nullifier was consumed before this call; nothing changed
    AlreadyUsed,
    /// The nullifier was unseen and is now consumed
    NewlyMarked,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NullifierStore {
    consumed: BTreeSet<B256>,
}

impl NullifierStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up and consume `nullifier` in one step.
    /// Requires `&mut self`, so callers sharing a store must hold its lock
    /// across the call; there is no window between the lookup and the insert.
    pub fn check_and_mark(&mut self, nullifier: B256) -> MarkOutcome {
        if self.consumed.insert(nullifier) {
            MarkOutcome::NewlyMarked
        } else {
            MarkOutcome::AlreadyUsed
        }
    }

    pub fn is_used(&self, nullifier: &B256) -> bool {
        self.consumed.contains(nullifier)
    }

    pub fn len(&self) -> usize {
        self.consumed.len()
    }

    pub fn is_empty(&self) -> bool {
        self.consumed.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_first_mark_then_already_used() {
        let mut store = NullifierStore::new();
        let nullifier = B256::repeat_byte(0x42);

        assert!(!store.is_used(&nullifier));
        assert_eq!(store.check_and_mark(nullifier), MarkOutcome::NewlyMarked);
        assert!(store.is_used(&nullifier));
        assert_eq!(store.check_and_mark(nullifier), MarkOutcome::AlreadyUsed);
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_distinct_nullifiers_are_independent() {
        let mut store = NullifierStore::new();
        for i in 0..=255u8 {
            assert_eq!(store.check_and_mark(B256::repeat_byte(i)), MarkOutcome::NewlyMarked);
        }
        assert_eq!(store.len(), 256);
    }

    #[test]
    fn test_concurrent_racers_see_exactly_one_new_mark() {
        let store = Arc::new(Mutex::new(NullifierStore::new()));
        let nullifier = B256::repeat_byte(0x99);

        let handles: Vec<_> = (0..16)
            .map(|_| {
                let store = Arc::clone(&store);
                thread::spawn(move || store.lock().check_and_mark(nullifier))
            })
            .collect();

        let newly_marked = handles
            .into_iter()
            .map(|h| h.join().unwrap())
            .filter(|outcome| *outcome == MarkOutcome::NewlyMarked)
            .count();

        assert_eq!(newly_marked, 1);
    }

    #[test]
    fn test_snapshot_roundtrip_keeps_consumed_set() {
        let mut store = NullifierStore::new();
        store.check_and_mark(B256::repeat_byte(1));
        store.check_and_mark(B256::repeat_byte(2));

        let json = serde_json::to_string(&store).unwrap();
        let mut restored: NullifierStore = serde_json::from_str(&json).unwrap();

        assert_eq!(restored, store);
        assert_eq!(restored.check_and_mark(B256::repeat_byte(1)), MarkOutcome::AlreadyUsed);
    }
}
