//! Entity identity.
//!
//! Identities are handed out by an [`IdGenerator`] owned by the registry.
//! They increase monotonically and are never reused, so a stale id held
//! after a removal reliably misses on lookup.

use serde::{Deserialize, Serialize};
use std::{
    fmt,
    sync::atomic::{AtomicU64, Ordering},
};

/// Process-unique identity of an entity.
#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
pub struct EntityId(pub u64);

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Monotonic identity source.
///
/// Shared by reference: factories building nested objects (a deck and
/// its cards) draw from the same generator as the registry itself.
#[derive(Debug, Default)]
pub struct IdGenerator {
    next: AtomicU64,
}

impl IdGenerator {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Generator whose first id is `first`.
    #[must_use]
    pub fn starting_at(first: u64) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    pub fn next_id(&self) -> EntityId {
        EntityId(self.next.fetch_add(1, Ordering::Relaxed))
    }

    /// The id the next call to [`IdGenerator::next_id`] will return.
    #[must_use]
    pub fn peek(&self) -> EntityId {
        EntityId(self.next.load(Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::{collections::HashSet, sync::Arc, thread};

    #[test]
    fn test_ids_are_monotonic() {
        let ids = IdGenerator::new();
        assert_eq!(ids.next_id(), EntityId(0));
        assert_eq!(ids.next_id(), EntityId(1));
        assert_eq!(ids.peek(), EntityId(2));
        assert_eq!(ids.next_id(), EntityId(2));
    }

    #[test]
    fn test_isolated_generators_are_reproducible() {
        let a = IdGenerator::starting_at(10);
        let b = IdGenerator::starting_at(10);
        assert_eq!(a.next_id(), b.next_id());
    }

    #[test]
    fn test_concurrent_ids_are_unique() {
        let ids = Arc::new(IdGenerator::new());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let ids = Arc::clone(&ids);
                thread::spawn(move || (0..250).map(|_| ids.next_id()).collect::<Vec<_>>())
            })
            .collect();

        let mut seen = HashSet::new();
        for handle in handles {
            for id in handle.join().unwrap() {
                assert!(seen.insert(id), "duplicate id {id}");
            }
        }
        assert_eq!(seen.len(), 1000);
    }
}
