//! Monotonic identifier allocation.

use serde::{Deserialize, Serialize};

/// Hands out strictly increasing integer ids for one keyed collection.
///
/// The next id is `max(largest id seen, high-water mark) + 1`, never below
/// `first`. The high-water mark only moves forward, so deleting the newest
/// entity does not make its id available again.
///
/// ```
/// use quince::common::IdAllocator;
///
/// // Footnote ids 0 and -1 are reserved separators.
/// let mut notes = IdAllocator::new(1);
/// assert_eq!(notes.next_id(), 1);
/// assert_eq!(notes.next_id(), 2);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdAllocator {
    first: i64,
    high_water: Option<i64>,
}

impl IdAllocator {
    pub const fn new(first: i64) -> Self {
        Self {
            first,
            high_water: None,
        }
    }

    /// The id the next call to [`next_id`](Self::next_id) would return.
    pub fn peek(&self) -> i64 {
        match self.high_water {
            Some(hw) => (hw + 1).max(self.first),
            None => self.first,
        }
    }

    pub fn next_id(&mut self) -> i64 {
        let id = self.peek();
        self.high_water = Some(id);
        id
    }

    /// Record an id that entered the collection from outside the allocator.
    pub fn observe(&mut self, id: i64) {
        if self.high_water.is_none_or(|hw| id > hw) {
            self.high_water = Some(id);
        }
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_first_note_id_is_one() {
        let mut notes = IdAllocator::new(1);
        assert_eq!(notes.peek(), 1);
        assert_eq!(notes.next_id(), 1);
    }

    #[test]
    fn test_observe_moves_forward_only() {
        let mut ids = IdAllocator::default();
        ids.observe(10);
        ids.observe(3);
        assert_eq!(ids.next_id(), 11);
    }

    #[test]
    fn test_observed_reserved_ids_do_not_lower_floor() {
        let mut notes = IdAllocator::new(1);
        notes.observe(-1);
        notes.observe(0);
        assert_eq!(notes.next_id(), 1);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_ids_strictly_increase(
            first in -5i64..5,
            observed in proptest::collection::vec(-10i64..1000, 0..20),
            n in 1usize..200,
        ) {
            let mut ids = IdAllocator::new(first);
            for id in observed {
                ids.observe(id);
            }
            let mut last: Option<i64> = None;
            for _ in 0..n {
                let id = ids.next_id();
                prop_assert!(id >= first);
                if let Some(prev) = last {
                    prop_assert!(id > prev);
                }
                last = Some(id);
            }
        }
    }
}
