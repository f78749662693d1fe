//! Assignment engine: matching idle baristas to waiting orders.
//!
//! A cycle walks the idle baristas in [`BaristaPool::available_workers`]
//! order. A barista at normal load takes the top-ranked order. An overloaded
//! barista takes the top order only if it is short; otherwise it takes the
//! shortest order in the top-K window, and every order ranked above the one
//! it took is charged a skip.
//!
//! [`BaristaPool::available_workers`]: crate::engine::pool::BaristaPool::available_workers

use crate::engine::error::{EngineError, EngineResult};
use crate::engine::Engine;
use crate::model::{Assignment, BaristaId, OrderId, OrderStatus, WorkloadClass};
use chrono::{DateTime, Utc};
use tracing::{debug, info, warn};

/// Index of the order an overloaded barista should take from `window`
/// (prep times, best-ranked first). Shortest wins; ties go to the higher rank.
pub fn pick_short(window: &[u32], short_order_minutes: u32) -> Option<usize> {
    let first = *window.first()?;
    if first <= short_order_minutes {
        return Some(0);
    }
    window
        .iter()
        .enumerate()
        .min_by_key(|(_, prep)| **prep)
        .map(|(index, _)| index)
}

impl Engine {
    /// Runs one assignment cycle. Finding nothing to do is not an error.
    pub fn assign_next(&mut self, now: DateTime<Utc>) -> Vec<Assignment> {
        let mut made = Vec::new();
        for worker in self.pool.available_workers() {
            if self.queue.is_empty() {
                break;
            }
            let Some((order, skipped)) = self.choose_for(worker) else {
                break;
            };
            match self.assign_pair(worker, order, now) {
                Ok(()) => {
                    self.record_skips(worker, order, &skipped);
                    info!(
                        barista_id = %worker,
                        order_id = %order,
                        skipped = skipped.len(),
                        "Order assigned"
                    );
                    made.push(Assignment {
                        barista_id: worker,
                        order_id: order,
                        skipped,
                    });
                }
                Err(EngineError::Conflict(conflict)) => {
                    debug!(barista_id = %worker, order_id = %order, %conflict, "Assignment skipped");
                }
                Err(e) => {
                    warn!(barista_id = %worker, order_id = %order, error = %e, "Assignment failed");
                }
            }
        }
        made
    }

    /// Assigns a specific order to a specific barista. Every waiting order
    /// ranked above the chosen one is charged a skip.
    pub fn assign_manual(
        &mut self,
        worker: BaristaId,
        order: OrderId,
        now: DateTime<Utc>,
    ) -> EngineResult<Assignment> {
        self.pool.get(worker)?;
        let skipped = self.queue.ranked_above(order);
        self.assign_pair(worker, order, now)?;
        self.record_skips(worker, order, &skipped);
        info!(
            barista_id = %worker,
            order_id = %order,
            skipped = skipped.len(),
            "Order assigned manually"
        );
        Ok(Assignment {
            barista_id: worker,
            order_id: order,
            skipped,
        })
    }

    /// The order `worker` should take and the orders it passes over.
    fn choose_for(&self, worker: BaristaId) -> Option<(OrderId, Vec<OrderId>)> {
        let waiting = |id: OrderId| self.store.get(id).is_some_and(|o| o.is_waiting());

        if self.pool.classify(worker) != WorkloadClass::Overloaded {
            return self.queue.peek_highest(waiting).map(|id| (id, Vec::new()));
        }

        let window: Vec<OrderId> = self
            .queue
            .top(self.config.skip_window.max(1))
            .into_iter()
            .filter(|id| waiting(*id))
            .collect();
        let preps: Vec<u32> = window
            .iter()
            .filter_map(|id| self.store.get(*id).map(|o| o.total_prep_time))
            .collect();
        let index = pick_short(&preps, self.config.short_order_minutes)?;
        Some((window[index], window[..index].to_vec()))
    }

    /// Claims both sides of an assignment, or neither.
    pub(crate) fn assign_pair(
        &mut self,
        worker: BaristaId,
        order: OrderId,
        now: DateTime<Utc>,
    ) -> EngineResult<()> {
        let record = self.store.live_mut(order)?;
        self.pool.assign(worker, record, now)?;
        self.store.transition(order, OrderStatus::Assigned)?;
        self.queue.remove(order);
        Ok(())
    }

    /// Charges a skip to each passed-over order, attributed to `worker`.
    fn record_skips(&mut self, worker: BaristaId, chosen: OrderId, skipped: &[OrderId]) {
        if skipped.is_empty() {
            return;
        }
        let chosen_prep = self
            .store
            .get(chosen)
            .map(|o| o.total_prep_time)
            .unwrap_or_default();
        let mut charged = 0;
        for id in skipped {
            let Ok(order) = self.store.live_mut(*id) else {
                continue;
            };
            let justified = chosen_prep < order.total_prep_time;
            self.monitor.record_skip(order, worker, justified);
            charged += 1;
        }
        self.pool.record_skips(worker, charged);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::engine::ConflictError;
    use crate::model::{OrderCreate, OrderItem};

    fn submit(engine: &mut Engine, drink: &str, qty: u32, at: DateTime<Utc>) -> OrderId {
        engine
            .submit(
                OrderCreate {
                    items: vec![OrderItem::new(drink, qty)],
                    regular: false,
                },
                at,
            )
            .unwrap()
            .order
            .id
    }

    #[test]
    fn test_pick_short_prefers_top_when_short() {
        assert_eq!(pick_short(&[2, 1, 1], 2), Some(0));
        assert_eq!(pick_short(&[6, 4, 1], 2), Some(2));
        assert_eq!(pick_short(&[6, 4, 4], 2), Some(1));
        assert_eq!(pick_short(&[], 2), None);
    }

    #[test]
    fn test_overloaded_worker_takes_short_order() {
        let t0 = Utc::now();
        let mut engine = Engine::new(EngineConfig::default(), t0);
        engine.pool.set_workload(BaristaId(1), 13);
        engine.pool.set_workload(BaristaId(2), 10);
        engine.pool.set_workload(BaristaId(3), 7);

        // Keep barista-3 busy so exactly two workers are idle.
        let filler = submit(&mut engine, "espresso", 1, t0);
        engine.assign_pair(BaristaId(3), filler, t0).unwrap();

        // Long order arrives first and has waited longer, so it ranks #1.
        let long = submit(&mut engine, "latte", 1, t0);
        let short = submit(&mut engine, "espresso", 1, t0 + chrono::Duration::minutes(4));
        let now = t0 + chrono::Duration::minutes(5);
        engine.rescore(now);
        let ranked: Vec<OrderId> = engine.queue.iter().collect();
        assert_eq!(ranked, vec![long, short]);

        let made = engine.assign_next(now);
        assert_eq!(made.len(), 2);
        assert_eq!(made[0].barista_id, BaristaId(1));
        assert_eq!(made[0].order_id, short);
        assert_eq!(made[0].skipped, vec![long]);
        assert_eq!(made[1].barista_id, BaristaId(2));
        assert_eq!(made[1].order_id, long);

        let long_order = engine.order(long).unwrap();
        assert_eq!(long_order.skip_count, 1);
        assert_eq!(long_order.assigned_barista, Some(BaristaId(2)));
        assert_eq!(engine.barista(BaristaId(1)).unwrap().skips_caused, 1);
    }

    #[test]
    fn test_balanced_worker_takes_top_order() {
        let t0 = Utc::now();
        let mut engine = Engine::new(EngineConfig::default().with_baristas(1), t0);
        let long = submit(&mut engine, "mocha", 1, t0);
        engine.rescore(t0 + chrono::Duration::minutes(9));
        submit(&mut engine, "cold-brew", 1, t0 + chrono::Duration::minutes(9));

        let made = engine.assign_next(t0 + chrono::Duration::minutes(9));
        assert_eq!(made.len(), 1);
        assert_eq!(made[0].order_id, long);
        assert!(made[0].skipped.is_empty());
    }

    #[test]
    fn test_no_worker_or_no_order_is_a_noop() {
        let t0 = Utc::now();
        let mut engine = Engine::new(EngineConfig::default().with_baristas(1), t0);
        assert!(engine.assign_next(t0).is_empty());

        submit(&mut engine, "latte", 1, t0);
        submit(&mut engine, "latte", 1, t0);
        assert_eq!(engine.assign_next(t0).len(), 1);
        assert!(engine.assign_next(t0).is_empty());
        assert_eq!(engine.queue_snapshot().waiting_orders.len(), 1);
    }

    #[test]
    fn test_no_double_assignment() {
        let t0 = Utc::now();
        let mut engine = Engine::new(EngineConfig::default(), t0);
        let a = submit(&mut engine, "latte", 1, t0);
        let b = submit(&mut engine, "latte", 1, t0);

        engine.assign_manual(BaristaId(1), a, t0).unwrap();
        assert!(matches!(
            engine.assign_manual(BaristaId(2), a, t0),
            Err(EngineError::Conflict(ConflictError::OrderAlreadyAssigned { .. }))
        ));
        assert!(matches!(
            engine.assign_manual(BaristaId(1), b, t0),
            Err(EngineError::Conflict(ConflictError::AlreadyBusy { .. }))
        ));
        assert!(matches!(
            engine.assign_manual(BaristaId(7), b, t0),
            Err(EngineError::BaristaNotFound(_))
        ));
        assert_eq!(engine.order(b).unwrap().status, OrderStatus::Waiting);
    }

    #[test]
    fn test_manual_override_charges_skips() {
        let t0 = Utc::now();
        let mut engine = Engine::new(EngineConfig::default(), t0);
        // cold-brew ranks first on complexity, mocha last.
        let quick = submit(&mut engine, "cold-brew", 1, t0);
        let mid = submit(&mut engine, "latte", 1, t0);
        let slow = submit(&mut engine, "mocha", 1, t0);

        let made = engine.assign_manual(BaristaId(1), slow, t0).unwrap();
        assert_eq!(made.skipped, vec![quick, mid]);
        assert_eq!(engine.order(quick).unwrap().skip_count, 1);
        assert_eq!(engine.order(mid).unwrap().skip_count, 1);
    }

    #[test]
    fn test_repeated_skips_flag_violation() {
        let t0 = Utc::now();
        let mut engine = Engine::new(EngineConfig::default().with_baristas(1), t0);
        let victim = submit(&mut engine, "cold-brew", 1, t0);

        for _ in 0..4 {
            let other = submit(&mut engine, "mocha", 1, t0);
            engine.assign_manual(BaristaId(1), other, t0).unwrap();
            engine.complete(BaristaId(1), other, t0).unwrap();
        }

        let order = engine.order(victim).unwrap();
        assert_eq!(order.skip_count, 4);
        assert!(order.fairness_violation);

        let report = engine.fairness();
        assert_eq!(report.violations, 1);
        // The skips went to longer orders.
        assert_eq!(report.justified_ratio, 0.0);
        assert_eq!(report.violations_by_barista.get(&BaristaId(1)), Some(&1));
    }
}
