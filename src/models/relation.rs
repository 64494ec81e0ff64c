//! Symmetric event relations (incompatibility, pairing).

use std::collections::{BTreeMap, BTreeSet};

use super::EventId;

/// An undirected relation over events.
///
/// Insertion stores both directions at once, so `contains(a, b)` and
/// `contains(b, a)` always agree. Self-pairs are ignored.
#[derive(Debug, Clone, Default)]
pub struct SymmetricRelation {
    neighbors: BTreeMap<EventId, BTreeSet<EventId>>,
    len: usize,
}

impl SymmetricRelation {
    pub fn new() -> Self {
        Self::default()
    }

    /// Relates `a` and `b`. Returns `false` when already related or `a == b`.
    pub fn insert(&mut self, a: EventId, b: EventId) -> bool {
        if a == b || self.contains(a, b) {
            return false;
        }
        self.neighbors.entry(a).or_default().insert(b);
        self.neighbors.entry(b).or_default().insert(a);
        self.len += 1;
        true
    }

    pub fn contains(&self, a: EventId, b: EventId) -> bool {
        self.neighbors.get(&a).is_some_and(|set| set.contains(&b))
    }

    /// Events related to `a`.
    pub fn neighbors(&self, a: EventId) -> impl Iterator<Item = EventId> + '_ {
        self.neighbors.get(&a).into_iter().flatten().copied()
    }

    /// Each unordered pair once, as `(low, high)`.
    pub fn pairs(&self) -> impl Iterator<Item = (EventId, EventId)> + '_ {
        self.neighbors
            .iter()
            .flat_map(|(&a, set)| set.range(a..).map(move |&b| (a, b)))
    }

    /// Number of unordered pairs.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_is_symmetric_and_idempotent() {
        let mut rel = SymmetricRelation::new();
        assert!(rel.insert(EventId(0), EventId(1)));
        assert!(!rel.insert(EventId(1), EventId(0)));
        assert!(!rel.insert(EventId(2), EventId(2)));

        assert!(rel.contains(EventId(1), EventId(0)));
        assert!(rel.contains(EventId(0), EventId(1)));
        assert!(!rel.contains(EventId(2), EventId(2)));
        assert_eq!(rel.len(), 1);
    }

    #[test]
    fn test_pairs_listed_once() {
        let mut rel = SymmetricRelation::new();
        rel.insert(EventId(2), EventId(0));
        rel.insert(EventId(1), EventId(2));

        let pairs: Vec<_> = rel.pairs().collect();
        assert_eq!(
            pairs,
            vec![(EventId(0), EventId(2)), (EventId(1), EventId(2))]
        );

        let mut around_two: Vec<_> = rel.neighbors(EventId(2)).collect();
        around_two.sort();
        assert_eq!(around_two, vec![EventId(0), EventId(1)]);
        assert_eq!(rel.neighbors(EventId(9)).count(), 0);
    }
}
