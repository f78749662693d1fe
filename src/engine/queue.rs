//! The ranked index over waiting orders.
//!
//! The queue stores only rank keys (score, arrival, id). Orders themselves
//! stay in the order store and are looked up by id, so a rescoring pass can
//! rebuild the whole index without touching any order reference.

use crate::model::OrderId;
use chrono::{DateTime, Utc};
use std::cmp::Ordering;
use std::collections::{BTreeSet, HashMap};

/// Sort key: higher score first, then earlier arrival, then lower id.
#[derive(Debug, Clone, Copy)]
pub struct RankKey {
    pub score: f64,
    pub arrival: DateTime<Utc>,
    pub id: OrderId,
}

impl PartialEq for RankKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for RankKey {}

impl PartialOrd for RankKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankKey {
    fn cmp(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| self.arrival.cmp(&other.arrival))
            .then_with(|| self.id.cmp(&other.id))
    }
}

#[derive(Debug, Default)]
pub struct OrderQueue {
    ranked: BTreeSet<RankKey>,
    keys: HashMap<OrderId, RankKey>,
}

impl OrderQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Inserts or re-ranks an order.
    pub fn insert(&mut self, key: RankKey) {
        if let Some(old) = self.keys.insert(key.id, key) {
            self.ranked.remove(&old);
        }
        self.ranked.insert(key);
    }

    /// Removes an order. Removing an absent id is a no-op.
    pub fn remove(&mut self, id: OrderId) -> bool {
        match self.keys.remove(&id) {
            Some(key) => {
                self.ranked.remove(&key);
                true
            }
            None => false,
        }
    }

    /// Rebuilds the index from freshly computed keys after a rescoring pass.
    ///
    /// Keys are sorted once and bulk-loaded, so a full rebuild costs one sort
    /// over the waiting orders.
    pub fn reorder(&mut self, keys: impl IntoIterator<Item = RankKey>) {
        let mut fresh: Vec<RankKey> = keys.into_iter().collect();
        fresh.sort_unstable();
        self.keys = fresh.iter().map(|k| (k.id, *k)).collect();
        self.ranked = fresh.into_iter().collect();
    }

    /// Highest-ranked order accepted by `compatible`.
    pub fn peek_highest(&self, mut compatible: impl FnMut(OrderId) -> bool) -> Option<OrderId> {
        self.ranked.iter().map(|k| k.id).find(|id| compatible(*id))
    }

    /// The `k` highest-ranked orders, best first.
    pub fn top(&self, k: usize) -> Vec<OrderId> {
        self.ranked.iter().take(k).map(|key| key.id).collect()
    }

    /// 1-based rank of an order.
    pub fn position(&self, id: OrderId) -> Option<usize> {
        let key = self.keys.get(&id)?;
        Some(self.ranked.range(..key).count() + 1)
    }

    /// Ids ranked strictly above `id`, best first.
    pub fn ranked_above(&self, id: OrderId) -> Vec<OrderId> {
        match self.keys.get(&id) {
            Some(key) => self.ranked.range(..key).map(|k| k.id).collect(),
            None => Vec::new(),
        }
    }

    /// All ids in rank order.
    pub fn iter(&self) -> impl Iterator<Item = OrderId> + '_ {
        self.ranked.iter().map(|k| k.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(id: u64, score: f64, arrival_min: i64, base: DateTime<Utc>) -> RankKey {
        RankKey {
            score,
            arrival: base + chrono::Duration::minutes(arrival_min),
            id: OrderId(id),
        }
    }

    #[test]
    fn test_orders_rank_by_score_then_arrival() {
        let t0 = Utc::now();
        let mut q = OrderQueue::new();
        q.insert(key(1, 10.0, 0, t0));
        q.insert(key(2, 50.0, 1, t0));
        q.insert(key(3, 50.0, 0, t0));
        q.insert(key(4, 20.0, 0, t0));

        let ranked: Vec<u64> = q.iter().map(|id| id.0).collect();
        assert_eq!(ranked, vec![3, 2, 4, 1]);
        assert_eq!(q.position(OrderId(4)), Some(3));
        assert_eq!(q.ranked_above(OrderId(4)), vec![OrderId(3), OrderId(2)]);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let t0 = Utc::now();
        let mut q = OrderQueue::new();
        q.insert(key(1, 10.0, 0, t0));
        assert!(q.remove(OrderId(1)));
        assert!(!q.remove(OrderId(1)));
        assert!(!q.remove(OrderId(99)));
        assert!(q.is_empty());
    }

    #[test]
    fn test_insert_existing_id_reranks() {
        let t0 = Utc::now();
        let mut q = OrderQueue::new();
        q.insert(key(1, 10.0, 0, t0));
        q.insert(key(2, 20.0, 0, t0));
        q.insert(key(1, 30.0, 0, t0));
        assert_eq!(q.len(), 2);
        assert_eq!(q.top(1), vec![OrderId(1)]);
    }

    #[test]
    fn test_reorder_replaces_ranking() {
        let t0 = Utc::now();
        let mut q = OrderQueue::new();
        q.insert(key(1, 90.0, 0, t0));
        q.insert(key(2, 10.0, 1, t0));
        q.reorder(vec![key(1, 10.0, 0, t0), key(2, 90.0, 1, t0)]);
        assert_eq!(q.top(2), vec![OrderId(2), OrderId(1)]);
        assert_eq!(q.len(), 2);
    }

    #[test]
    fn test_peek_highest_respects_predicate() {
        let t0 = Utc::now();
        let mut q = OrderQueue::new();
        q.insert(key(1, 90.0, 0, t0));
        q.insert(key(2, 80.0, 0, t0));
        assert_eq!(q.peek_highest(|_| true), Some(OrderId(1)));
        assert_eq!(q.peek_highest(|id| id != OrderId(1)), Some(OrderId(2)));
        assert_eq!(q.peek_highest(|_| false), None);
    }
}
